use serde::{Deserialize, Serialize};

use super::null_default;
use super::user::User;

/// A class and its ordered roster.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassRoom {
    #[serde(default, deserialize_with = "null_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default)]
    pub level: Option<String>,
    /// Identifier of the class in the upstream feed, sent along with CSV imports.
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub users: Vec<User>,
}

/// Partial update for a [`ClassRoom`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClassRoomPatch {
    pub id: Option<String>,
    pub name: Option<String>,
    pub level: Option<String>,
    pub external_id: Option<String>,
    pub users: Option<Vec<User>>,
}

impl ClassRoom {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn update_data(&mut self, patch: ClassRoomPatch) {
        if let Some(id) = patch.id {
            self.id = id;
        }
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(level) = patch.level {
            self.level = Some(level);
        }
        if let Some(external_id) = patch.external_id {
            self.external_id = Some(external_id);
        }
        if let Some(users) = patch.users {
            self.users = users;
        }
    }

    pub fn user(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|user| user.id == id)
    }

    pub fn user_mut(&mut self, id: &str) -> Option<&mut User> {
        self.users.iter_mut().find(|user| user.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_data_keeps_roster_when_patch_has_no_users() {
        let mut classroom = ClassRoom::new("c1", "CM2 A");
        classroom.users.push(User::with_id("u1"));

        classroom.update_data(ClassRoomPatch {
            name: Some("CM2 B".to_string()),
            level: Some("CM2".to_string()),
            ..ClassRoomPatch::default()
        });

        assert_eq!(classroom.id, "c1");
        assert_eq!(classroom.name, "CM2 B");
        assert_eq!(classroom.level.as_deref(), Some("CM2"));
        assert_eq!(classroom.users.len(), 1);
        assert!(classroom.user("u1").is_some());
    }
}
