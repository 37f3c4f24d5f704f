use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::account_state::display_code;
use super::search::find_users;
use crate::context::Translator;
use crate::entities::{ClassRoom, User, UserType};
use crate::utils::text::locale_compare;

/// Sortable user list column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortColumn {
    #[default]
    Name,
    Birthdate,
    Login,
    Activation,
}

impl SortColumn {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "name" => Some(SortColumn::Name),
            "birthdate" => Some(SortColumn::Birthdate),
            "login" => Some(SortColumn::Login),
            "activation" => Some(SortColumn::Activation),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Current column and direction of the user list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSort {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl UserSort {
    pub fn asc(column: SortColumn) -> Self {
        Self {
            column,
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(column: SortColumn) -> Self {
        Self {
            column,
            direction: SortDirection::Desc,
        }
    }

    /// Text the given column sorts on for `user`.
    pub fn key(&self, user: &User, translator: &dyn Translator) -> String {
        match self.column {
            SortColumn::Name => user.safe_display_name(),
            SortColumn::Login => user.login.clone().unwrap_or_default(),
            SortColumn::Activation => display_code(user, translator),
            SortColumn::Birthdate => user.inverse_birth_date(),
        }
    }

    /// Order two column keys in this sort's direction.
    pub fn compare_keys(&self, left: &str, right: &str) -> Ordering {
        let ordering = locale_compare(left, right);
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Sort borrowed users in place with `sort`. Equal keys keep their order.
pub fn sort_users(users: &mut [&User], sort: UserSort, translator: &dyn Translator) {
    let mut keyed: Vec<(String, &User)> = users
        .iter()
        .map(|user| (sort.key(user, translator), *user))
        .collect();

    keyed.sort_by(|(left, _), (right, _)| sort.compare_keys(left, right));

    for (slot, (_, user)) in users.iter_mut().zip(keyed) {
        *slot = user;
    }
}

/// Users of `classroom` with the given type, matching `search`, in `sort` order.
pub fn users_for_type<'a>(
    classroom: &'a ClassRoom,
    user_type: UserType,
    search: &str,
    sort: UserSort,
    translator: &dyn Translator,
) -> Vec<&'a User> {
    let of_type: Vec<&User> = classroom
        .users
        .iter()
        .filter(|user| user.user_type == Some(user_type))
        .collect();

    let mut visible = find_users(search, &of_type).into_owned();
    sort_users(&mut visible, sort, translator);
    visible
}
