use serde::{Deserialize, Serialize};

use super::null_default;
use super::user::User;

/// Kinds of access group managed from the admin console.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum GroupType {
    #[serde(rename = "manual", alias = "ManualGroup")]
    Manual,
    #[serde(rename = "profile", alias = "ProfileGroup")]
    Profile,
    #[serde(rename = "functional", alias = "FunctionalGroup")]
    Functional,
}

impl GroupType {
    /// Resolve the group type named in a view route. Anything else is rejected.
    pub fn from_route_param(value: &str) -> Option<Self> {
        match value {
            "manual" => Some(GroupType::Manual),
            "profile" => Some(GroupType::Profile),
            "functional" => Some(GroupType::Functional),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GroupType::Manual => "manual",
            GroupType::Profile => "profile",
            GroupType::Functional => "functional",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub group_type: GroupType,
    #[serde(default)]
    pub sub_type: Option<String>,
    /// Members, when the listing embeds them.
    #[serde(default, deserialize_with = "null_default")]
    pub users: Vec<User>,
}

/// Groups of `group_type` whose name contains `input` (case-insensitive), sorted by name.
pub fn filter_groups<'a>(groups: &'a [Group], group_type: GroupType, input: &str) -> Vec<&'a Group> {
    let needle = input.to_lowercase();
    let mut matching: Vec<&Group> = groups
        .iter()
        .filter(|group| group.group_type == group_type)
        .filter(|group| needle.is_empty() || group.name.to_lowercase().contains(&needle))
        .collect();
    matching.sort_by(|left, right| left.name.cmp(&right.name));
    matching
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(id: &str, name: &str, group_type: GroupType) -> Group {
        Group {
            id: id.to_string(),
            name: name.to_string(),
            group_type,
            sub_type: None,
            users: Vec::new(),
        }
    }

    #[test]
    fn route_param_accepts_only_known_types() {
        assert_eq!(GroupType::from_route_param("manual"), Some(GroupType::Manual));
        assert_eq!(GroupType::from_route_param("functional"), Some(GroupType::Functional));
        assert_eq!(GroupType::from_route_param("Manual"), None);
        assert_eq!(GroupType::from_route_param("broadcast"), None);
    }

    #[test]
    fn filter_groups_by_type_and_name() {
        let groups = vec![
            group("1", "Teachers CM2", GroupType::Functional),
            group("2", "Chess club", GroupType::Manual),
            group("3", "Choir", GroupType::Manual),
            group("4", "chemistry lab", GroupType::Manual),
        ];

        let manual: Vec<&str> = filter_groups(&groups, GroupType::Manual, "")
            .into_iter()
            .map(|g| g.id.as_str())
            .collect();
        assert_eq!(manual, vec!["2", "3", "4"]);

        let filtered: Vec<&str> = filter_groups(&groups, GroupType::Manual, "CHE")
            .into_iter()
            .map(|g| g.id.as_str())
            .collect();
        assert_eq!(filtered, vec!["2", "4"]);
    }

    #[test]
    fn deserializes_backend_type_names() {
        let parsed: Group = serde_json::from_value(serde_json::json!({
            "id": "g1",
            "name": "Parents",
            "type": "FunctionalGroup",
            "subType": "BroadcastGroup",
            "users": [{ "id": "u1", "type": "Relative" }, { "id": "u2", "type": "Relative" }]
        }))
        .unwrap();
        assert_eq!(parsed.group_type, GroupType::Functional);
        assert_eq!(parsed.sub_type.as_deref(), Some("BroadcastGroup"));
        let members: Vec<&str> = parsed.users.iter().map(|user| user.id.as_str()).collect();
        assert_eq!(members, vec!["u1", "u2"]);

        let without_members: Group = serde_json::from_value(serde_json::json!({
            "id": "g2",
            "type": "ManualGroup",
            "users": null
        }))
        .unwrap();
        assert!(without_members.users.is_empty());
    }
}
