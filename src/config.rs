//! Configuration.
//!
//! Loaded from `~/.depot/config.toml`. A missing file falls back to
//! defaults so the tool works out of the box against a local backend.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5002";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Base URL of the connector backend.
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Storage root override. Defaults to `~/.depot/`.
    #[serde(default)]
    pub storage_root: Option<PathBuf>,
}

fn default_backend_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            storage_root: None,
        }
    }
}

impl Config {
    /// Load config from `~/.depot/config.toml`, or defaults if absent.
    pub fn load() -> Result<Self, String> {
        let Some(path) = Self::path() else {
            return Err("could not determine home directory".to_string());
        };
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .map_err(|e| format!("invalid config at {}: {e}", path.display()))?;

        if config.backend_url.is_empty() {
            return Err(format!("backend-url is empty in {}", path.display()));
        }
        Ok(config)
    }

    /// The config file path: `~/.depot/config.toml`.
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".depot").join("config.toml"))
    }
}
