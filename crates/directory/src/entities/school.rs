use serde::{Deserialize, Serialize};

use super::classroom::ClassRoom;
use super::null_default;
use super::user::User;

/// Lightweight link to another school in the structure graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SchoolRef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl SchoolRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }
}

/// A school (structure). Schools form a DAG through `parents`/`children`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct School {
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub users: Vec<User>,
    /// `None` means the school has no known parent; this is distinct from an empty list,
    /// which only exists before hierarchy assembly has run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parents: Option<Vec<SchoolRef>>,
    #[serde(default, deserialize_with = "null_default")]
    pub children: Vec<SchoolRef>,
    #[serde(default, alias = "classes", deserialize_with = "null_default")]
    pub classrooms: Vec<ClassRoom>,
}

/// Partial update for a [`School`], also the shape of `GET /userbook/structure/:id`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SchoolPatch {
    pub id: Option<String>,
    pub name: Option<String>,
    pub users: Option<Vec<User>>,
    #[serde(alias = "classrooms")]
    pub classes: Option<Vec<ClassRoom>>,
}

impl School {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn to_ref(&self) -> SchoolRef {
        SchoolRef {
            id: self.id.clone(),
            name: Some(self.name.clone()),
        }
    }

    /// Merge `patch` in place. `users` and `classrooms` are replaced only when the patch carries them.
    pub fn update_data(&mut self, patch: SchoolPatch) {
        if let Some(id) = patch.id {
            self.id = id;
        }
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(users) = patch.users {
            self.users = users;
        }
        if let Some(classes) = patch.classes {
            self.classrooms = classes;
        }
    }

    pub fn has_parent(&self, id: &str) -> bool {
        self.parents
            .as_ref()
            .is_some_and(|parents| parents.iter().any(|parent| parent.id == id))
    }

    pub fn classroom(&self, id: &str) -> Option<&ClassRoom> {
        self.classrooms.iter().find(|classroom| classroom.id == id)
    }
}
