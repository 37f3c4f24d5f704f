use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "classadmin.toml",
    "config/classadmin.toml",
    "crates/config/classadmin.toml",
    "../classadmin.toml",
    "../config/classadmin.toml",
    "../crates/config/classadmin.toml",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub operator: OperatorConfig,
    #[serde(default)]
    pub preferences: PreferencesConfig,
}

/// Connection settings for the directory REST backend.
///
/// ```
/// use classadmin_config::ApiConfig;
///
/// let api = ApiConfig::default();
/// assert_eq!(api.base_url, "http://localhost:8090");
/// assert_eq!(api.request_timeout_seconds, 30);
/// assert_eq!(api.import_path, "upload_file");
/// assert!(api.api_token.is_none());
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "ApiConfig::default_base_url")]
    pub base_url: String,
    #[serde(default = "ApiConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,
    #[serde(default)]
    pub api_token: Option<String>,
    /// Multipart upload target, relative to `base_url`.
    #[serde(default = "ApiConfig::default_import_path")]
    pub import_path: String,
}

impl ApiConfig {
    fn default_base_url() -> String {
        "http://localhost:8090".to_string()
    }

    const fn default_request_timeout() -> u64 {
        30
    }

    fn default_import_path() -> String {
        "upload_file".to_string()
    }
}

/// The bearer token never appears in logs.
impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .field("import_path", &self.import_path)
            .finish()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            request_timeout_seconds: Self::default_request_timeout(),
            api_token: None,
            import_path: Self::default_import_path(),
        }
    }
}

/// The account the console acts on behalf of.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperatorConfig {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub mobile: Option<String>,
    #[serde(default)]
    pub classes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferencesConfig {
    pub path: String,
}

impl Default for PreferencesConfig {
    fn default() -> Self {
        Self {
            path: "classadmin-preferences.json".to_string(),
        }
    }
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use classadmin_config::load;
///
/// std::env::remove_var("CLASSADMIN_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.api.base_url.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let timeout = i64::try_from(defaults.api.request_timeout_seconds).unwrap_or(i64::MAX);

    let mut builder = config::Config::builder()
        .set_default("api.base_url", defaults.api.base_url.clone())?
        .set_default("api.request_timeout_seconds", timeout)?
        .set_default("api.import_path", defaults.api.import_path.clone())?
        .set_default("preferences.path", defaults.preferences.path.clone())?;

    let environment_overrides = config::Environment::with_prefix("CLASSADMIN")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("operator.classes")
        .try_parsing(true);

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("CLASSADMIN_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via CLASSADMIN_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(environment_overrides);

    let cfg = builder.build().context("unable to build configuration")?;

    let mut config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    if config.api.request_timeout_seconds == 0 {
        config.api.request_timeout_seconds = defaults.api.request_timeout_seconds;
    }

    debug!(?config, "loaded console configuration");
    Ok(config)
}
