//! Response payloads returned by the directory endpoints.

use serde::Deserialize;

use crate::entities::{Structure, User, UserFunction, UserPatch, UserType};

/// One row of `GET /userbook/api/person`.
///
/// The first row describes the person; every row may also carry one relative.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonApiResult {
    #[serde(flatten)]
    pub person: UserPatch,
    #[serde(default)]
    pub related_name: Option<String>,
    #[serde(default)]
    pub related_id: Option<String>,
    #[serde(default)]
    pub related_type: Option<UserType>,
    #[serde(default)]
    pub schools: Vec<Structure>,
}

impl PersonApiResult {
    /// Relative described by this row, if any.
    pub fn relative(&self) -> Option<User> {
        let id = self.related_id.as_deref().filter(|id| !id.is_empty())?;
        Some(User {
            id: id.to_string(),
            display_name: self.related_name.clone(),
            user_type: self.related_type,
            ..User::default()
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PersonApiResults {
    #[serde(default)]
    pub result: Vec<PersonApiResult>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeKeyResponse {
    pub merge_key: String,
}

/// One entry of `GET /directory/user/:id/functions`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserFunctionsEntry {
    #[serde(default)]
    pub functions: Vec<UserFunction>,
}

/// Error body of a failed import.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}
