//! Configuration for the console client
//!
//! Reads config from ~/.config/eden-console/config.toml. The base API URL can
//! be overridden with the `EDEN_API_URL` environment variable.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use eden_console_protocol::{CODE_OK, CODE_OK_LEGACY};
use serde::{Deserialize, Serialize};

/// Environment variable that overrides `api.base_url`
pub const API_URL_ENV: &str = "EDEN_API_URL";

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Backend connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Envelope codes that mean success
    pub success_codes: Vec<i64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            success_codes: vec![CODE_OK_LEGACY, CODE_OK],
        }
    }
}

impl ApiConfig {
    /// Overall request timeout; `0` falls back to the default
    pub const fn timeout(&self) -> Duration {
        if self.timeout_secs == 0 {
            Duration::from_secs(DEFAULT_TIMEOUT_SECS)
        } else {
            Duration::from_secs(self.timeout_secs)
        }
    }
}

/// Durable client-side storage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite file; the per-user default location when unset
    pub path: Option<PathBuf>,
}

impl StorageConfig {
    pub fn resolved_path(&self) -> Option<PathBuf> {
        self.path.clone().or_else(|| {
            dirs::config_dir().map(|dir| dir.join("eden-console").join("storage.db"))
        })
    }
}

/// Route names the navigation guard works with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    pub login_path: String,
    pub home_path: String,
    /// Routes reachable without a credential
    pub allow_list: Vec<String>,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            login_path: "/login".to_string(),
            home_path: "/".to_string(),
            allow_list: vec!["/login".to_string(), "/auth-redirect".to_string()],
        }
    }
}

/// Full client configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub navigation: NavigationConfig,
}

impl ClientConfig {
    /// Load configuration from the default path, then apply the environment
    pub fn load() -> Self {
        let mut config = Self::load_from_path(&Self::default_config_path()).unwrap_or_default();
        config.apply_env();
        config
    }

    /// Get default config path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("eden-console")
            .join("config.toml")
    }

    /// Load from a specific path; `None` when missing or malformed
    pub fn load_from_path(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        match Self::parse(&content) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring malformed config file");
                None
            }
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse console config")
    }

    /// Override the base URL from `EDEN_API_URL` when set and non-empty
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api.base_url = url.trim().to_string();
            }
        }
    }

    /// Create default config file if it doesn't exist
    pub fn create_default_if_missing() {
        let path = Self::default_config_path();
        if !path.exists() {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let default_config = r#"# eden-console Configuration

[api]
base_url = "http://localhost:8080"
timeout_secs = 10
# Envelope codes treated as success
success_codes = [0, 200]

[storage]
# path = "/var/lib/eden-console/storage.db"

[navigation]
login_path = "/login"
home_path = "/"
allow_list = ["/login", "/auth-redirect"]
"#;
            let _ = std::fs::write(&path, default_config);
        }
    }
}
