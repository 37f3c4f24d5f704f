use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use super::null_default;
use crate::context::Operator;

/// Account classification. The directory only knows these four kinds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum UserType {
    Student,
    Relative,
    Teacher,
    Personnel,
}

impl UserType {
    pub const ALL: [UserType; 4] = [
        UserType::Student,
        UserType::Relative,
        UserType::Teacher,
        UserType::Personnel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Student => "Student",
            UserType::Relative => "Relative",
            UserType::Teacher => "Teacher",
            UserType::Personnel => "Personnel",
        }
    }

    /// Parse a type name regardless of case (`"student"`, `"Student"`).
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(value))
    }
}

impl std::fmt::Display for UserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an account was provisioned from.
///
/// Accounts fed by manual entry, class parameters, the BE1D connector or a
/// CSV import are managed locally; the other feeds are owned upstream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UserSource {
    Manual,
    ClassParam,
    Be1d,
    Csv,
    Aaf,
    Aaf1d,
    Other(String),
}

impl UserSource {
    /// True for the closed set of sources the selection rules treat as protected.
    pub fn is_protected(&self) -> bool {
        matches!(
            self,
            UserSource::Manual | UserSource::ClassParam | UserSource::Be1d | UserSource::Csv
        )
    }
}

impl From<String> for UserSource {
    fn from(value: String) -> Self {
        match value.as_str() {
            "MANUAL" => UserSource::Manual,
            "CLASS_PARAM" => UserSource::ClassParam,
            "BE1D" => UserSource::Be1d,
            "CSV" => UserSource::Csv,
            "AAF" => UserSource::Aaf,
            "AAF1D" => UserSource::Aaf1d,
            _ => UserSource::Other(value),
        }
    }
}

impl From<&str> for UserSource {
    fn from(value: &str) -> Self {
        UserSource::from(value.to_string())
    }
}

impl From<UserSource> for String {
    fn from(source: UserSource) -> Self {
        match source {
            UserSource::Manual => "MANUAL".to_string(),
            UserSource::ClassParam => "CLASS_PARAM".to_string(),
            UserSource::Be1d => "BE1D".to_string(),
            UserSource::Csv => "CSV".to_string(),
            UserSource::Aaf => "AAF".to_string(),
            UserSource::Aaf1d => "AAF1D".to_string(),
            UserSource::Other(value) => value,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Hobby {
    pub visibility: String,
    pub values: String,
    pub category: String,
}

/// A structure (school) an account is attached to, as returned inline by the person API.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Structure {
    pub id: String,
    pub name: String,
    pub classes: Vec<String>,
}

/// Default value of the `mood` field.
pub const DEFAULT_MOOD: &str = "default";

fn default_mood() -> String {
    DEFAULT_MOOD.to_string()
}

fn null_mood<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_mood))
}

/// A directory account as listed in class rosters and school listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Directory identifier. Empty when the account has not been created yet.
    #[serde(default, deserialize_with = "null_default")]
    pub id: String,
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub blocked: bool,
    #[serde(default, rename = "type")]
    pub user_type: Option<UserType>,
    #[serde(default)]
    pub profile: Option<UserType>,
    #[serde(default)]
    pub source: Option<UserSource>,
    #[serde(default)]
    pub reset_code: Option<String>,
    #[serde(default)]
    pub reset_code_date: Option<String>,
    #[serde(default)]
    pub activation_code: Option<String>,
    #[serde(default = "default_mood", deserialize_with = "null_mood")]
    pub mood: String,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub hobbies: Vec<Hobby>,
    #[serde(default, deserialize_with = "null_default")]
    pub relatives: Vec<User>,
    #[serde(default, deserialize_with = "null_default")]
    pub profiles: Vec<UserType>,
    #[serde(default, deserialize_with = "null_default")]
    pub attached_structures: Vec<Structure>,
    #[serde(default, deserialize_with = "null_default")]
    pub children_structure: Vec<Structure>,
    /// Row selection state; never sent to or read from the backend.
    #[serde(skip)]
    pub selected: bool,
}

impl Default for User {
    fn default() -> Self {
        Self {
            id: String::new(),
            login: None,
            blocked: false,
            user_type: None,
            profile: None,
            source: None,
            reset_code: None,
            reset_code_date: None,
            activation_code: None,
            mood: default_mood(),
            birth_date: None,
            first_name: None,
            last_name: None,
            display_name: None,
            hobbies: Vec::new(),
            relatives: Vec::new(),
            profiles: Vec::new(),
            attached_structures: Vec::new(),
            children_structure: Vec::new(),
            selected: false,
        }
    }
}

/// Partial update for a [`User`]. Only the fields that are `Some` are applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPatch {
    pub id: Option<String>,
    pub login: Option<String>,
    pub blocked: Option<bool>,
    #[serde(rename = "type")]
    pub user_type: Option<UserType>,
    pub profile: Option<UserType>,
    pub source: Option<UserSource>,
    pub reset_code: Option<String>,
    pub reset_code_date: Option<String>,
    pub activation_code: Option<String>,
    pub mood: Option<String>,
    pub birth_date: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub display_name: Option<String>,
    pub hobbies: Option<Vec<Hobby>>,
    pub relatives: Option<Vec<User>>,
    pub profiles: Option<Vec<UserType>>,
    pub attached_structures: Option<Vec<Structure>>,
    pub children_structure: Option<Vec<Structure>>,
}

impl User {
    /// Create a user shell carrying only an identifier
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn has_id(&self) -> bool {
        !self.id.is_empty()
    }

    /// Merge `patch` into this user in place.
    ///
    /// Fields absent from the patch keep their current value, except `mood`
    /// which falls back to `"default"` whenever the patch does not carry it.
    pub fn update_data(&mut self, patch: UserPatch) {
        self.mood = patch.mood.unwrap_or_else(default_mood);

        if let Some(id) = patch.id {
            self.id = id;
        }
        if let Some(login) = patch.login {
            self.login = Some(login);
        }
        if let Some(blocked) = patch.blocked {
            self.blocked = blocked;
        }
        if let Some(user_type) = patch.user_type {
            self.user_type = Some(user_type);
        }
        if let Some(profile) = patch.profile {
            self.profile = Some(profile);
        }
        if let Some(source) = patch.source {
            self.source = Some(source);
        }
        if let Some(reset_code) = patch.reset_code {
            self.reset_code = Some(reset_code);
        }
        if let Some(reset_code_date) = patch.reset_code_date {
            self.reset_code_date = Some(reset_code_date);
        }
        if let Some(activation_code) = patch.activation_code {
            self.activation_code = Some(activation_code);
        }
        if let Some(birth_date) = patch.birth_date {
            self.birth_date = Some(birth_date);
        }
        if let Some(first_name) = patch.first_name {
            self.first_name = Some(first_name);
        }
        if let Some(last_name) = patch.last_name {
            self.last_name = Some(last_name);
        }
        if let Some(display_name) = patch.display_name {
            self.display_name = Some(display_name);
        }
        if let Some(hobbies) = patch.hobbies {
            self.hobbies = hobbies;
        }
        if let Some(relatives) = patch.relatives {
            self.relatives = relatives;
        }
        if let Some(profiles) = patch.profiles {
            self.profiles = profiles;
        }
        if let Some(attached_structures) = patch.attached_structures {
            self.attached_structures = attached_structures;
        }
        if let Some(children_structure) = patch.children_structure {
            self.children_structure = children_structure;
        }
    }

    /// Display name, or `"lastName firstName"` when the account has none.
    pub fn safe_display_name(&self) -> String {
        match self.display_name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!(
                "{} {}",
                self.last_name.as_deref().unwrap_or_default(),
                self.first_name.as_deref().unwrap_or_default()
            ),
        }
    }

    pub fn has_activation_code(&self) -> bool {
        self.activation_code
            .as_deref()
            .is_some_and(|code| !code.is_empty())
    }

    pub fn has_reset_code(&self) -> bool {
        self.reset_code.as_deref().is_some_and(|code| !code.is_empty())
    }

    pub fn has_birth_date(&self) -> bool {
        self.birth_date.as_deref().is_some_and(|date| !date.is_empty())
    }

    /// Birth date parsed from its ISO prefix (`YYYY-MM-DD`, time part ignored).
    pub fn parsed_birth_date(&self) -> Option<NaiveDate> {
        let raw = self.birth_date.as_deref()?;
        let day = raw.get(..10).unwrap_or(raw);
        NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
    }

    /// Birth date as `D/MM/YYYY`, empty when unknown.
    pub fn short_birth_date(&self) -> String {
        self.parsed_birth_date()
            .map(|date| date.format("%-d/%m/%Y").to_string())
            .unwrap_or_default()
    }

    /// Birth date as `YYYYMMDD`, which sorts chronologically as text.
    pub fn inverse_birth_date(&self) -> String {
        self.parsed_birth_date()
            .map(|date| date.format("%Y%m%d").to_string())
            .unwrap_or_default()
    }

    pub fn is_me(&self, operator: &Operator) -> bool {
        operator
            .user_id
            .as_deref()
            .is_some_and(|me| me == self.id)
    }

    /// Blocked accounts and the operator's own account cannot be acted upon.
    pub fn is_disabled(&self, operator: &Operator) -> bool {
        self.blocked || self.is_me(operator)
    }

    pub fn avatar_48_uri(&self) -> String {
        format!("/userbook/avatar/{}?thumbnail=48x48", self.id)
    }

    pub fn edit_user_uri(&self) -> String {
        format!("/userbook/mon-compte#edit-user/{}", self.id)
    }

    pub fn edit_user_infos_uri(&self) -> String {
        format!("/userbook/mon-compte#edit-user-infos/{}", self.id)
    }

    /// Profile used for labelling: explicit profile, then type, then first listed profile.
    pub fn profile_type(&self) -> Option<UserType> {
        self.profile
            .or(self.user_type)
            .or_else(|| self.profiles.first().copied())
    }
}
