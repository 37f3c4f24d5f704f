//! Collaborators the directory code calls into but does not own: the
//! operator identity, the user preference store, the notification surface,
//! and message translation.

use std::collections::HashMap;

use async_trait::async_trait;
use classadmin_config::OperatorConfig;
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::types::DirectoryResult;

/// Preference key holding the last selected classroom.
pub const SELECTED_CLASS_PREFERENCE: &str = "selectedClass";

/// The account the admin session runs as.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Operator {
    pub user_id: Option<String>,
    pub email: Option<String>,
    pub mobile: Option<String>,
    /// Classrooms the operator is associated with, in preference order.
    pub classes: Vec<String>,
}

impl From<OperatorConfig> for Operator {
    fn from(config: OperatorConfig) -> Self {
        Self {
            user_id: config.user_id,
            email: config.email,
            mobile: config.mobile,
            classes: config.classes,
        }
    }
}

/// Persistent per-user preferences.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn get(&self, key: &str) -> DirectoryResult<Option<String>>;
    async fn save(&self, key: &str, value: &str) -> DirectoryResult<()>;
}

/// User-facing notification surface (toasts).
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    fn error(&self, message: &str);
    fn info(&self, message: &str);
}

/// Message catalogue lookup.
pub trait Translator: Send + Sync {
    fn translate(&self, key: &str) -> String;
}

/// Preference store kept in memory for the lifetime of the process.
#[derive(Debug, Default)]
pub struct InMemoryPreferences {
    values: RwLock<HashMap<String, String>>,
}

impl InMemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: &str, value: &str) -> Self {
        let mut values = HashMap::new();
        values.insert(key.to_string(), value.to_string());
        Self {
            values: RwLock::new(values),
        }
    }
}

#[async_trait]
impl PreferenceStore for InMemoryPreferences {
    async fn get(&self, key: &str) -> DirectoryResult<Option<String>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn save(&self, key: &str, value: &str) -> DirectoryResult<()> {
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Notifier that reports through the tracing subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn error(&self, message: &str) {
        error!(target: "classadmin::notify", %message, "notification");
    }

    fn info(&self, message: &str) {
        info!(target: "classadmin::notify", %message, "notification");
    }
}

/// Translator that returns the key itself.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyTranslator;

impl Translator for KeyTranslator {
    fn translate(&self, key: &str) -> String {
        key.to_string()
    }
}

/// Translator backed by a fixed catalogue, falling back to the key.
#[derive(Debug, Default, Clone)]
pub struct CatalogTranslator {
    entries: HashMap<String, String>,
}

impl CatalogTranslator {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

impl Translator for CatalogTranslator {
    fn translate(&self, key: &str) -> String {
        self.entries
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}
