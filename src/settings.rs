//! Service settings, read from `settings.yaml`.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ForgeResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    /// Request bodies above this size are refused.
    pub max_body_bytes: usize,
    /// Open the service URL in a browser once listening.
    pub open_browser: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            max_body_bytes: 64 * 1024,
            open_browser: false,
        }
    }
}

impl Settings {
    /// `<config dir>/blockforge/settings.yaml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("blockforge").join("settings.yaml"))
    }

    pub fn from_yaml(content: &str) -> ForgeResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Loads settings from `explicit`, which must exist, or from the default
    /// location, which may be absent.
    pub fn load(explicit: Option<&Path>) -> ForgeResult<Self> {
        if let Some(path) = explicit {
            info!("[Settings] Loading {}", path.display());
            return Self::from_yaml(&fs::read_to_string(path)?);
        }
        match Self::default_path() {
            Some(path) if path.exists() => {
                info!("[Settings] Loading {}", path.display());
                Self::from_yaml(&fs::read_to_string(&path)?)
            }
            _ => {
                debug!("[Settings] No settings file, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
