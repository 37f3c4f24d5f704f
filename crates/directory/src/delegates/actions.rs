use crate::entities::User;

/// Predicates over the current user selection, refreshed on every selection change.
#[derive(Debug, Clone, Default)]
pub struct ActionsDelegate {
    selection: Vec<User>,
}

impl ActionsDelegate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_selection_changed(&mut self, selection: Vec<User>) {
        self.selection = selection;
    }

    pub fn selection(&self) -> &[User] {
        &self.selection
    }

    pub fn selected_ids(&self) -> Vec<String> {
        self.selection.iter().map(|user| user.id.clone()).collect()
    }

    pub fn has_selected_users(&self) -> bool {
        !self.selection.is_empty()
    }

    /// No selected user is still waiting for activation.
    pub fn selected_users_are_not_activated(&self) -> bool {
        !self.selection.iter().any(User::has_activation_code)
    }

    /// Every selected user is blocked (true for an empty selection).
    pub fn selected_users_are_blocked(&self) -> bool {
        self.selection.iter().all(|user| user.blocked)
    }

    /// No selected user is blocked (true for an empty selection).
    pub fn selected_users_are_not_blocked(&self) -> bool {
        !self.selection.iter().any(|user| user.blocked)
    }

    /// False as soon as one selected account comes from a protected source.
    pub fn can_remove_selection(&self) -> bool {
        !self.selection.iter().any(|user| {
            user.source
                .as_ref()
                .is_some_and(|source| source.is_protected())
        })
    }
}
