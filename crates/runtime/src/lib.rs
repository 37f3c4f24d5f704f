use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use classadmin_config::AppConfig;
use classadmin_directory::{
    ClassAdminSession, DirectoryError, DirectoryResult, DirectoryService, KeyTranslator,
    Operator, PreferenceStore, TracingNotifier,
};
use tokio::sync::Mutex;
use tracing::{debug, info};

pub mod telemetry {
    use anyhow::Result;
    use tracing::Level;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    pub fn init_tracing() -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = SubscriberBuilder::default()
            .with_max_level(Level::TRACE)
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

/// Preference store persisted as a flat JSON object on disk.
///
/// A missing file reads as empty; the file and its parent directories are
/// created on first save.
#[derive(Debug)]
pub struct FilePreferenceStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> DirectoryResult<BTreeMap<String, String>> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Ok(BTreeMap::new())
            }
            Err(error) => {
                return Err(DirectoryError::preferences(format!(
                    "unable to read {}: {error}",
                    self.path.display()
                )))
            }
        };

        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(BTreeMap::new());
        }
        serde_json::from_slice(&raw).map_err(|error| {
            DirectoryError::preferences(format!("invalid {}: {error}", self.path.display()))
        })
    }
}

#[async_trait]
impl PreferenceStore for FilePreferenceStore {
    async fn get(&self, key: &str) -> DirectoryResult<Option<String>> {
        Ok(self.read_all().await?.remove(key))
    }

    async fn save(&self, key: &str, value: &str) -> DirectoryResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut values = self.read_all().await?;
        values.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|error| {
                DirectoryError::preferences(format!("unable to create {}: {error}", parent.display()))
            })?;
        }

        let body = serde_json::to_vec_pretty(&values)
            .map_err(|error| DirectoryError::preferences(error.to_string()))?;
        tokio::fs::write(&self.path, body).await.map_err(|error| {
            DirectoryError::preferences(format!("unable to write {}: {error}", self.path.display()))
        })?;
        debug!(key, path = %self.path.display(), "preference saved");
        Ok(())
    }
}

#[derive(Clone)]
pub struct AdminServices {
    pub directory: DirectoryService,
    pub preferences: Arc<FilePreferenceStore>,
    pub operator: Operator,
}

impl AdminServices {
    pub fn initialise(config: &AppConfig) -> Result<Self> {
        let directory =
            DirectoryService::new(&config.api).context("failed to build directory client")?;
        let preferences = Arc::new(FilePreferenceStore::new(&config.preferences.path));
        let operator = Operator::from(config.operator.clone());

        info!(
            base_url = %directory.base_url(),
            preferences = %preferences.path().display(),
            classes = operator.classes.len(),
            "admin services ready"
        );

        Ok(Self {
            directory,
            preferences,
            operator,
        })
    }

    /// A fresh admin session reporting through tracing.
    pub fn session(&self) -> ClassAdminSession {
        ClassAdminSession::new(
            self.directory.clone(),
            self.preferences.clone(),
            Arc::new(TracingNotifier),
            Arc::new(KeyTranslator),
            self.operator.clone(),
        )
    }
}
