//! Request payloads and call options for the directory service.

use serde::Serialize;

use crate::entities::{User, UserType};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchNetworkOptions {
    /// Also load classes and users of every school before returning.
    pub with_schools: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchClassOptions {
    /// Attach the class roster through a second request.
    pub with_users: bool,
}

/// Where password reset instructions are delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetDestination {
    Email(String),
    Mobile(String),
}

/// Body of `POST /auth/sendResetPassword`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ResetPasswordRequest {
    pub login: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
}

impl ResetPasswordRequest {
    pub fn new(login: impl Into<String>, destination: &ResetDestination) -> Self {
        let (email, mobile) = match destination {
            ResetDestination::Email(value) => (Some(value.clone()), None),
            ResetDestination::Mobile(value) => (None, Some(value.clone())),
        };
        Self {
            login: login.into(),
            email,
            mobile,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BlockRequest {
    pub block: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ClassInfoUpdate {
    pub name: String,
    pub level: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RemoveUsersRequest {
    pub users: Vec<String>,
}

/// Body of `POST /directory/class/:id/user`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    #[serde(rename = "type")]
    pub user_type: Option<UserType>,
    pub birth_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children_ids: Option<Vec<String>>,
}

impl CreateAccountRequest {
    /// Build the creation payload from a draft user.
    ///
    /// The birth date is normalised to `YYYY-MM-DD`; relatives also send the
    /// ids of the children they are attached to.
    pub fn from_user(user: &User) -> Self {
        let birth_date = user
            .parsed_birth_date()
            .map(|date| date.format("%Y-%m-%d").to_string())
            .or_else(|| user.birth_date.clone().filter(|raw| !raw.is_empty()));

        let children_ids = (user.user_type == Some(UserType::Relative)).then(|| {
            user.relatives
                .iter()
                .map(|relative| relative.id.clone())
                .collect()
        });

        Self {
            last_name: user.last_name.clone(),
            first_name: user.first_name.clone(),
            user_type: user.user_type,
            birth_date,
            children_ids,
        }
    }
}

/// Body of `POST /directory/user/function/:id`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FunctionGrantRequest {
    pub function_code: String,
    pub inherit: String,
    pub scope: Vec<String>,
}

/// A CSV file to push into a class.
#[derive(Debug, Clone)]
pub struct ImportRequest {
    pub file_name: String,
    pub contents: Vec<u8>,
    pub user_type: UserType,
    pub class_external_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_account_request_normalises_birth_date_and_children() {
        let mut relative = User {
            first_name: Some("Marc".to_string()),
            last_name: Some("Petit".to_string()),
            user_type: Some(UserType::Relative),
            birth_date: Some("1980-02-01T10:00:00Z".to_string()),
            ..User::default()
        };
        relative.relatives = vec![User::with_id("child-1"), User::with_id("child-2")];

        let body = serde_json::to_value(CreateAccountRequest::from_user(&relative)).unwrap();
        assert_eq!(body["birthDate"], "1980-02-01");
        assert_eq!(body["type"], "Relative");
        assert_eq!(body["childrenIds"], serde_json::json!(["child-1", "child-2"]));

        let student = User {
            user_type: Some(UserType::Student),
            relatives: vec![User::with_id("ignored")],
            ..User::default()
        };
        let body = serde_json::to_value(CreateAccountRequest::from_user(&student)).unwrap();
        assert!(body.get("childrenIds").is_none());
    }

    #[test]
    fn reset_request_targets_one_channel() {
        let email = ResetPasswordRequest::new("jdoe", &ResetDestination::Email("a@b.c".into()));
        let body = serde_json::to_value(&email).unwrap();
        assert_eq!(body, serde_json::json!({ "login": "jdoe", "email": "a@b.c" }));

        let mobile = ResetPasswordRequest::new("jdoe", &ResetDestination::Mobile("0600".into()));
        let body = serde_json::to_value(&mobile).unwrap();
        assert_eq!(body, serde_json::json!({ "login": "jdoe", "mobile": "0600" }));
    }
}
