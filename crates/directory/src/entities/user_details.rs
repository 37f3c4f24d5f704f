use serde::{Deserialize, Serialize};

use super::group::Group;
use super::null_default;
use super::user::{UserSource, UserType};

/// Function code granting delegated administration over structures.
pub const ADMIN_LOCAL: &str = "ADMIN_LOCAL";

/// A function held by an account, e.g. `ADMIN_LOCAL` scoped to a list of structures.
///
/// The backend encodes these as `[code, scope]` pairs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "(String, Option<Vec<String>>)", into = "(String, Option<Vec<String>>)")]
pub struct UserFunction {
    pub code: String,
    pub scope: Option<Vec<String>>,
}

impl From<(String, Option<Vec<String>>)> for UserFunction {
    fn from((code, scope): (String, Option<Vec<String>>)) -> Self {
        Self { code, scope }
    }
}

impl From<UserFunction> for (String, Option<Vec<String>>) {
    fn from(function: UserFunction) -> Self {
        (function.code, function.scope)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RelativeSummary {
    pub id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub display_name: Option<String>,
    pub external_id: Option<String>,
}

/// Full profile of one account as edited from the admin console.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserDetails {
    #[serde(deserialize_with = "null_default")]
    pub id: String,
    pub activation_code: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub display_name: Option<String>,
    pub external_id: Option<String>,
    pub source: Option<UserSource>,
    pub email: Option<String>,
    pub birth_date: Option<String>,
    pub oldemail: Option<String>,
    pub login: Option<String>,
    #[serde(deserialize_with = "null_default")]
    pub blocked: bool,
    pub zip_code: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub home_phone: Option<String>,
    pub mobile: Option<String>,
    #[serde(rename = "type", deserialize_with = "null_default")]
    pub user_type: Vec<UserType>,
    #[serde(deserialize_with = "null_default")]
    pub functions: Vec<UserFunction>,
    #[serde(deserialize_with = "null_default")]
    pub children: Vec<RelativeSummary>,
    #[serde(deserialize_with = "null_default")]
    pub parents: Vec<RelativeSummary>,
    #[serde(deserialize_with = "null_default")]
    pub functional_groups: Vec<Group>,
    #[serde(deserialize_with = "null_default")]
    pub manual_groups: Vec<Group>,
    #[serde(deserialize_with = "null_default")]
    pub administrative_structures: Vec<String>,
    pub merge_key: Option<String>,
}

/// Body of `PUT /directory/user/:id`: the editable profile fields only.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserDetailsUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub display_name: Option<String>,
    pub birth_date: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub zip_code: Option<String>,
    pub email: Option<String>,
    pub home_phone: Option<String>,
    pub mobile: Option<String>,
}

impl UserDetails {
    /// Whether the account is a local administrator of `structure_id`.
    ///
    /// Only the first listed function is considered.
    pub fn is_adml(&self, structure_id: &str) -> bool {
        self.functions.first().is_some_and(|function| {
            function.code == ADMIN_LOCAL
                && function
                    .scope
                    .as_ref()
                    .is_some_and(|scope| scope.iter().any(|id| id == structure_id))
        })
    }

    /// Scope of the first function extended with `structure_id`.
    pub fn adml_scope_with(&self, structure_id: &str) -> Vec<String> {
        let mut scope = self
            .functions
            .first()
            .and_then(|function| function.scope.clone())
            .unwrap_or_default();
        scope.push(structure_id.to_string());
        scope
    }

    pub fn editable_fields(&self) -> UserDetailsUpdate {
        UserDetailsUpdate {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            display_name: self.display_name.clone(),
            birth_date: self.birth_date.clone(),
            address: self.address.clone(),
            city: self.city.clone(),
            zip_code: self.zip_code.clone(),
            email: self.email.clone(),
            home_phone: self.home_phone.clone(),
            mobile: self.mobile.clone(),
        }
    }

    /// All groups the account belongs to, functional first.
    pub fn groups(&self) -> Vec<Group> {
        self.functional_groups
            .iter()
            .chain(self.manual_groups.iter())
            .cloned()
            .collect()
    }
}
