//! Process-wide settings.
//!
//! Settings are read from a TOML or YAML file with every key under a
//! `common` section. Content containing `common:` is treated as YAML,
//! anything else as TOML. Missing keys keep their defaults.

use std::fs;
use std::path::Path;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::parser::subparser::DEFAULT_MAX_DEPTH;

fn default_user_agent() -> String {
    format!("subsync/{}", env!("CARGO_PKG_VERSION"))
}

fn default_fetch_timeout() -> u64 {
    15
}

fn default_proxy() -> String {
    "NONE".to_string()
}

fn default_max_download_size() -> u64 {
    32 * 1024 * 1024
}

fn default_max_decode_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// User-Agent sent when fetching subscriptions.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Fetch timeout in seconds.
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout: u64,
    /// Proxy URL for fetching, `NONE` for a direct connection.
    #[serde(default = "default_proxy")]
    pub proxy: String,
    /// Largest accepted subscription body, in bytes.
    #[serde(default = "default_max_download_size")]
    pub max_download_size: u64,
    #[serde(default = "default_max_decode_depth")]
    pub max_decode_depth: usize,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            user_agent: default_user_agent(),
            fetch_timeout: default_fetch_timeout(),
            proxy: default_proxy(),
            max_download_size: default_max_download_size(),
            max_decode_depth: default_max_decode_depth(),
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    common: Option<Settings>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the global settings.
    pub fn current() -> Arc<Settings> {
        global
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn load_from_content(content: &str) -> Result<Self, SettingsError> {
        let file: SettingsFile = if content.contains("common:") {
            serde_yaml::from_str(content)?
        } else {
            toml::from_str(content)?
        };
        Ok(file.common.unwrap_or_default())
    }

    pub fn load_from_file(path: &Path) -> Result<Self, SettingsError> {
        let content = fs::read_to_string(path)?;
        Self::load_from_content(&content)
    }
}

// Global settings instance
#[allow(non_upper_case_globals)]
pub static global: LazyLock<RwLock<Arc<Settings>>> =
    LazyLock::new(|| RwLock::new(Arc::new(Settings::new())));

fn replace_global(settings: Settings) {
    *global.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(settings);
}

/// Replace the global settings with the content of a settings file.
pub fn update_settings_from_file(path: &Path) -> Result<(), SettingsError> {
    let settings = Settings::load_from_file(path)?;
    info!("Loaded settings from {}", path.display());
    replace_global(settings);
    Ok(())
}

/// Replace the global settings with parsed TOML or YAML content.
pub fn update_settings_from_content(content: &str) -> Result<(), SettingsError> {
    replace_global(Settings::load_from_content(content)?);
    Ok(())
}
