use std::borrow::{Borrow, Cow};

use crate::entities::User;
use crate::utils::text::remove_accents;

fn normalise(value: &str) -> String {
    remove_accents(value).to_lowercase()
}

/// Strings a search term is matched against for one user.
///
/// The display name, the display name with its first two words swapped,
/// `"first last"` and `"last first"`. The full-name variants only exist when
/// both parts are known.
fn candidates(user: &User) -> Vec<String> {
    let mut candidates = Vec::with_capacity(4);

    if let Some(display_name) = user.display_name.as_deref().filter(|name| !name.is_empty()) {
        candidates.push(normalise(display_name));

        let mut words = display_name.split(' ');
        let first = words.next().unwrap_or_default();
        let second = words.next().unwrap_or_default();
        candidates.push(normalise(&format!("{second} {first}")));
    }

    if let (Some(first), Some(last)) = (user.first_name.as_deref(), user.last_name.as_deref()) {
        if !first.is_empty() && !last.is_empty() {
            candidates.push(normalise(&format!("{first} {last}")));
            candidates.push(normalise(&format!("{last} {first}")));
        }
    }

    candidates
}

/// Whether `user` matches an already normalised search term.
pub fn matches_search(user: &User, term: &str) -> bool {
    candidates(user)
        .iter()
        .any(|candidate| candidate.contains(term))
}

/// Keep the users whose name contains `search`, ignoring accents and case.
///
/// An empty search hands back the input slice itself.
pub fn find_users<'a, U>(search: &str, users: &'a [U]) -> Cow<'a, [U]>
where
    U: Borrow<User> + Clone,
{
    let term = normalise(search);
    if term.is_empty() {
        return Cow::Borrowed(users);
    }

    Cow::Owned(
        users
            .iter()
            .filter(|user| matches_search(<U as Borrow<User>>::borrow(*user), &term))
            .cloned()
            .collect(),
    )
}
