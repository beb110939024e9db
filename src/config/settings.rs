//! TOML-based configuration for superset-sync.
//!
//! Supports a config file (`superset-sync.toml`) with environment variable
//! expansion in string values that name secrets or endpoints.
//!
//! Example configuration:
//! ```toml
//! [superset]
//! url = "https://superset.example.com"
//! token = "${SUPERSET_TOKEN}"
//! timeout_secs = 30
//!
//! [database]
//! id = 1
//! sqlalchemy_uri = "${WAREHOUSE_URI}"
//!
//! [sync]
//! disallow_edits = true
//! external_url_prefix = "https://dbt-docs.example.com/"
//! aggregate_policy = "coalesce_zero"
//! ```

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::connection::{ConnectionError, DatabaseConnection};
use crate::metrics::AggregatePolicy;
use crate::sync::SyncOptions;

/// Environment variable pointing at a config file.
pub const CONFIG_ENV_VAR: &str = "SUPERSET_SYNC_CONFIG";

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Missing required setting: {0}")]
    MissingSetting(&'static str),

    #[error("Invalid URL in setting {setting}: {source}")]
    InvalidUrl {
        setting: &'static str,
        #[source]
        source: url::ParseError,
    },

    #[error(transparent)]
    Connection(#[from] ConnectionError),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub superset: SupersetSettings,
    pub database: DatabaseSettings,
    pub sync: SyncSettings,
}

/// Where the Superset API lives and how to authenticate.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SupersetSettings {
    /// Base URL of the Superset instance (supports ${ENV_VAR} expansion).
    pub url: Option<String>,

    /// Bearer token (supports ${ENV_VAR} expansion).
    pub token: Option<String>,

    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for SupersetSettings {
    fn default() -> Self {
        Self {
            url: None,
            token: None,
            timeout_secs: 30,
        }
    }
}

/// The Superset database datasets are created in.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Superset database id.
    pub id: Option<i64>,

    /// SQLAlchemy URI of that database (supports ${ENV_VAR} expansion).
    pub sqlalchemy_uri: Option<String>,
}

/// Sync behaviour.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Mark datasets as managed externally so they are read-only in Superset.
    pub disallow_edits: bool,

    /// dbt docs base URL; datasets link back to `<prefix>#!/model/<unique_id>`.
    pub external_url_prefix: Option<String>,

    pub aggregate_policy: AggregatePolicy,
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `SUPERSET_SYNC_CONFIG`
    /// 2. `./superset-sync.toml`
    /// 3. `~/.config/superset-sync/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("superset-sync.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("superset-sync").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// Superset base URL with environment variables expanded.
    pub fn superset_url(&self) -> Result<String, SettingsError> {
        let url = self
            .superset
            .url
            .as_deref()
            .ok_or(SettingsError::MissingSetting("superset.url"))?;
        expand_env_vars(url)
    }

    /// Bearer token with environment variables expanded, if configured.
    pub fn superset_token(&self) -> Result<Option<String>, SettingsError> {
        self.superset
            .token
            .as_deref()
            .map(expand_env_vars)
            .transpose()
    }

    /// Build the target database descriptor.
    pub fn database_connection(&self) -> Result<DatabaseConnection, SettingsError> {
        let id = self
            .database
            .id
            .ok_or(SettingsError::MissingSetting("database.id"))?;
        let uri = self
            .database
            .sqlalchemy_uri
            .as_deref()
            .ok_or(SettingsError::MissingSetting("database.sqlalchemy_uri"))?;

        Ok(DatabaseConnection::new(id, expand_env_vars(uri)?)?)
    }

    /// Reconciliation options from the `[sync]` table.
    pub fn sync_options(&self) -> Result<SyncOptions, SettingsError> {
        let mut options = SyncOptions::default()
            .with_disallow_edits(self.sync.disallow_edits)
            .with_aggregate_policy(self.sync.aggregate_policy);

        if let Some(prefix) = &self.sync.external_url_prefix {
            options = options
                .with_external_url_prefix(&expand_env_vars(prefix)?)
                .map_err(|source| SettingsError::InvalidUrl {
                    setting: "sync.external_url_prefix",
                    source,
                })?;
        }

        Ok(options)
    }
}

static ENV_VAR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)")
        .expect("env var pattern is valid")
});

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax. A `$` not followed by a name is kept.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut missing = None;
    let expanded = ENV_VAR_RE.replace_all(s, |caps: &Captures<'_>| {
        let name = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
        match env::var(name) {
            Ok(value) => value,
            Err(_) => {
                missing.get_or_insert_with(|| name.to_string());
                String::new()
            }
        }
    });

    match missing {
        Some(name) => Err(SettingsError::MissingEnvVar(name)),
        None => Ok(expanded.into_owned()),
    }
}
