//! Events broadcast by the admin session.

use serde::Serialize;

/// Session-level notifications observers can subscribe to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    /// The school network was (re)loaded
    NetworkLoaded { schools: usize },

    /// A classroom and its roster became the current class
    ClassLoaded { class_id: String },

    /// The user multi-selection changed; carries the selected ids
    SelectionChanged { selected: Vec<String> },

    /// Accounts were blocked or unblocked
    UsersBlocked { ids: Vec<String>, blocked: bool },

    /// Accounts were deleted
    UsersRemoved { ids: Vec<String> },
}

impl SessionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::NetworkLoaded { .. } => "network_loaded",
            SessionEvent::ClassLoaded { .. } => "class_loaded",
            SessionEvent::SelectionChanged { .. } => "selection_changed",
            SessionEvent::UsersBlocked { .. } => "users_blocked",
            SessionEvent::UsersRemoved { .. } => "users_removed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_type_tag() {
        let event = SessionEvent::UsersBlocked {
            ids: vec!["u1".to_string()],
            blocked: true,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "UsersBlocked");
        assert_eq!(value["blocked"], true);
        assert_eq!(event.name(), "users_blocked");
    }
}
