// Global preferences for the app (not user-specific). Read once at startup;
// writing preferences back is left to the host application.
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::state::{AppConfig, AppError, AppResult};

const PREFS_PATH_ENV: &str = "LOBBYCHAT_PREFS";
const PREFS_FILENAME: &str = ".lobbychat_prefs.json";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct GlobalPrefs {
    pub desktop_notifications_enabled: bool,
    pub config: AppConfig,
}

impl Default for GlobalPrefs {
    fn default() -> Self {
        Self {
            desktop_notifications_enabled: true,
            config: AppConfig::default(),
        }
    }
}

impl GlobalPrefs {
    pub fn config_path() -> PathBuf {
        if let Some(path) = std::env::var(PREFS_PATH_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
        {
            return PathBuf::from(path);
        }
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(PREFS_FILENAME)
    }

    pub fn parse(data: &str) -> AppResult<Self> {
        let prefs: Self = serde_json::from_str(data)?;
        if prefs.config.lobby_name.trim().is_empty() {
            return Err(AppError::Config("lobby_name must not be empty".to_string()));
        }
        Ok(prefs)
    }

    /// Load preferences, falling back to defaults when the file is missing
    /// or unreadable.
    pub fn load() -> Self {
        let path = Self::config_path();
        let data = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(e) => {
                debug!("No preferences at {}: {}", path.display(), e);
                return Self::default();
            }
        };
        match Self::parse(&data) {
            Ok(prefs) => prefs,
            Err(e) => {
                warn!("Ignoring preferences at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}
