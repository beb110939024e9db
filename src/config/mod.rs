//! Configuration module for superset-sync.
//!
//! Handles the target database descriptor, the settings file and
//! environment variable expansion.

mod connection;
mod settings;

pub use connection::{ConnectionError, DatabaseConnection, DatabaseUrl};
pub use settings::{
    expand_env_vars, DatabaseSettings, Settings, SettingsError, SupersetSettings, SyncSettings,
    CONFIG_ENV_VAR,
};
