use tracing::debug;

use crate::context::Translator;
use crate::entities::{ClassRoom, User, UserType};
use crate::listing::{self, SortColumn, UserSort};

/// State of the user list: current type tab, search, sort and select-all box.
#[derive(Debug, Clone)]
pub struct UserListDelegate {
    selected_tab: UserType,
    select_all: bool,
    search: String,
    sort: UserSort,
}

impl Default for UserListDelegate {
    fn default() -> Self {
        Self {
            selected_tab: UserType::Student,
            select_all: false,
            search: String::new(),
            sort: UserSort::default(),
        }
    }
}

impl UserListDelegate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_tab(&self) -> UserType {
        self.selected_tab
    }

    pub fn is_selected_tab(&self, kind: UserType) -> bool {
        self.selected_tab == kind
    }

    pub fn selected_tab_css(&self, kind: UserType) -> &'static str {
        if self.is_selected_tab(kind) {
            "selected"
        } else {
            ""
        }
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    pub fn select_all(&self) -> bool {
        self.select_all
    }

    pub fn sort(&self) -> UserSort {
        self.sort
    }

    pub fn sort_asc(&mut self, column: SortColumn) {
        self.sort = UserSort::asc(column);
    }

    pub fn sort_desc(&mut self, column: SortColumn) {
        self.sort = UserSort::desc(column);
    }

    /// Switch to another type tab: the current tab is unselected and the search cleared.
    pub fn select_tab(&mut self, kind: UserType, classroom: Option<&mut ClassRoom>) {
        if let Some(classroom) = classroom {
            self.switch_all(Some(false), classroom);
        } else {
            self.select_all = false;
        }
        self.search.clear();
        self.selected_tab = kind;
        debug!(tab = %kind, "user tab selected");
    }

    /// Apply the select-all box to every user of the current tab.
    ///
    /// `Some(value)` sets the box first; `None` re-applies its current state.
    pub fn switch_all(&mut self, value: Option<bool>, classroom: &mut ClassRoom) {
        if let Some(value) = value {
            self.select_all = value;
        }
        for user in classroom
            .users
            .iter_mut()
            .filter(|user| user.user_type == Some(self.selected_tab))
        {
            user.selected = self.select_all;
        }
    }

    /// Flip the selection of one user; returns the new state if the user exists.
    pub fn toggle_user(&self, user_id: &str, classroom: &mut ClassRoom) -> Option<bool> {
        let user = classroom.user_mut(user_id)?;
        user.selected = !user.selected;
        Some(user.selected)
    }

    /// Users of the current tab matching the search, in display order.
    pub fn visible_users<'a>(
        &self,
        classroom: &'a ClassRoom,
        translator: &dyn Translator,
    ) -> Vec<&'a User> {
        self.users_for_type(classroom, self.selected_tab, translator)
    }

    pub fn users_for_type<'a>(
        &self,
        classroom: &'a ClassRoom,
        kind: UserType,
        translator: &dyn Translator,
    ) -> Vec<&'a User> {
        listing::users_for_type(classroom, kind, &self.search, self.sort, translator)
    }

    pub fn display_code(&self, user: &User, translator: &dyn Translator) -> String {
        listing::display_code(user, translator)
    }

    pub fn display_code_css(&self, user: &User) -> &'static str {
        listing::display_code_css(user)
    }
}

/// Users of `classroom` currently ticked in the list.
pub fn selected_users(classroom: &ClassRoom) -> Vec<User> {
    classroom
        .users
        .iter()
        .filter(|user| user.selected)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::KeyTranslator;
    use crate::listing::SortDirection;

    fn classroom() -> ClassRoom {
        let mut classroom = ClassRoom::new("c1", "CE1");
        for (id, kind, last) in [
            ("s1", UserType::Student, "Martin"),
            ("s2", UserType::Student, "Bernard"),
            ("t1", UserType::Teacher, "Petit"),
        ] {
            classroom.users.push(User {
                id: id.to_string(),
                user_type: Some(kind),
                last_name: Some(last.to_string()),
                first_name: Some("A".to_string()),
                ..User::default()
            });
        }
        classroom
    }

    #[test]
    fn switch_all_only_touches_current_tab() {
        let mut classroom = classroom();
        let mut list = UserListDelegate::new();

        list.switch_all(Some(true), &mut classroom);
        let selected: Vec<String> = selected_users(&classroom).into_iter().map(|u| u.id).collect();
        assert_eq!(selected, vec!["s1", "s2"]);
        assert!(list.select_all());
    }

    #[test]
    fn select_tab_clears_selection_and_search() {
        let mut classroom = classroom();
        let mut list = UserListDelegate::new();
        list.switch_all(Some(true), &mut classroom);
        list.set_search("mart");

        list.select_tab(UserType::Teacher, Some(&mut classroom));
        assert!(selected_users(&classroom).is_empty());
        assert_eq!(list.search(), "");
        assert!(list.is_selected_tab(UserType::Teacher));
        assert_eq!(list.selected_tab_css(UserType::Teacher), "selected");
        assert_eq!(list.selected_tab_css(UserType::Student), "");
    }

    #[test]
    fn visible_users_follow_tab_search_and_sort() {
        let classroom = classroom();
        let mut list = UserListDelegate::new();

        let ids: Vec<&str> = list
            .visible_users(&classroom, &KeyTranslator)
            .iter()
            .map(|u| u.id.as_str())
            .collect();
        assert_eq!(ids, vec!["s2", "s1"]);

        list.sort_desc(SortColumn::Name);
        let ids: Vec<&str> = list
            .visible_users(&classroom, &KeyTranslator)
            .iter()
            .map(|u| u.id.as_str())
            .collect();
        assert_eq!(ids, vec!["s1", "s2"]);

        list.set_search("bern");
        assert_eq!(list.visible_users(&classroom, &KeyTranslator).len(), 1);
    }

    #[test]
    fn sort_direction_persists_until_changed() {
        let mut list = UserListDelegate::new();
        assert_eq!(list.sort(), UserSort::default());
        list.sort_desc(SortColumn::Login);
        assert_eq!(list.sort().direction, SortDirection::Desc);
        list.sort_asc(SortColumn::Activation);
        assert_eq!(list.sort(), UserSort::asc(SortColumn::Activation));
    }

    #[test]
    fn toggle_user_flips_selection() {
        let mut classroom = classroom();
        let list = UserListDelegate::new();
        assert_eq!(list.toggle_user("t1", &mut classroom), Some(true));
        assert_eq!(list.toggle_user("t1", &mut classroom), Some(false));
        assert_eq!(list.toggle_user("nobody", &mut classroom), None);
    }
}
