use serde::Serialize;

use crate::context::Translator;
use crate::entities::User;

/// Account lifecycle state shown in the activation column.
///
/// Resolved in priority order: a blocked account is always `Blocked`, even if
/// it still carries an activation or reset code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AccountState {
    Blocked,
    NotActivated,
    Resetted,
    Activated,
}

impl AccountState {
    pub fn of(user: &User) -> Self {
        if user.blocked {
            AccountState::Blocked
        } else if user.has_activation_code() {
            AccountState::NotActivated
        } else if user.has_reset_code() {
            AccountState::Resetted
        } else {
            AccountState::Activated
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            AccountState::Blocked => "blocked",
            AccountState::NotActivated => "notactivated",
            AccountState::Resetted => "resetted",
            AccountState::Activated => "activated",
        }
    }
}

/// Label of the account state as displayed (and sorted on) in the user list.
pub fn display_code(user: &User, translator: &dyn Translator) -> String {
    match AccountState::of(user) {
        AccountState::Blocked => translator.translate("directory.blocked.label"),
        AccountState::NotActivated => user.activation_code.clone().unwrap_or_default(),
        AccountState::Resetted => translator
            .translate("directory.resetted.label")
            .replace("[[resetCode]]", user.reset_code.as_deref().unwrap_or_default())
            .replace(
                "[[resetCodeDate]]",
                user.reset_code_date.as_deref().unwrap_or_default(),
            ),
        AccountState::Activated => translator.translate("directory.activated"),
    }
}

pub fn display_code_css(user: &User) -> &'static str {
    AccountState::of(user).css_class()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{CatalogTranslator, KeyTranslator};

    #[test]
    fn blocked_wins_over_activation_code() {
        let user = User {
            blocked: true,
            activation_code: Some("ABC123".to_string()),
            reset_code: Some("R1".to_string()),
            ..User::default()
        };
        assert_eq!(AccountState::of(&user), AccountState::Blocked);
        assert_eq!(display_code(&user, &KeyTranslator), "directory.blocked.label");
        assert_eq!(display_code_css(&user), "blocked");
    }

    #[test]
    fn state_priority_order() {
        let mut user = User {
            activation_code: Some("ABC123".to_string()),
            reset_code: Some("R1".to_string()),
            ..User::default()
        };
        assert_eq!(display_code(&user, &KeyTranslator), "ABC123");
        assert_eq!(display_code_css(&user), "notactivated");

        user.activation_code = Some(String::new());
        assert_eq!(AccountState::of(&user), AccountState::Resetted);

        user.reset_code = None;
        assert_eq!(AccountState::of(&user), AccountState::Activated);
        assert_eq!(display_code(&user, &KeyTranslator), "directory.activated");
    }

    #[test]
    fn resetted_label_substitutes_code_and_date() {
        let translator = CatalogTranslator::new([(
            "directory.resetted.label",
            "Code [[resetCode]] sent on [[resetCodeDate]]",
        )]);
        let user = User {
            reset_code: Some("XY42".to_string()),
            reset_code_date: Some("2024-09-02".to_string()),
            ..User::default()
        };
        assert_eq!(
            display_code(&user, &translator),
            "Code XY42 sent on 2024-09-02"
        );
        assert_eq!(display_code_css(&user), "resetted");
    }
}
