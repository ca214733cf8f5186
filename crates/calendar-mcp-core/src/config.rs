//! Configuration management for calendar-mcp

use crate::error::{Error, Result};
use crate::time::Zone;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings
    #[serde(default)]
    pub general: GeneralConfig,

    /// Calendar store settings
    #[serde(default)]
    pub calendar: CalendarConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error) or a full tracing filter directive
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Data directory path (logs live under `<data_dir>/logs`)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// IANA timezone used for "today" and for date-times without an offset
    /// (e.g. "America/Los_Angeles"). The system timezone is used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            data_dir: default_data_dir(),
            timezone: None,
        }
    }
}

/// Calendar store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Path to the Calendar SQLite database
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_data_dir() -> PathBuf {
    get_data_dir()
}

fn default_db_path() -> PathBuf {
    home_dir()
        .join("Library")
        .join("Group Containers")
        .join("group.com.apple.calendar")
        .join("Calendar.sqlitedb")
}

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// Get the data directory (XDG: ~/.local/share/calendar-mcp)
fn get_data_dir() -> PathBuf {
    home_dir().join(".local").join("share").join(crate::APP_NAME)
}

/// Get the config directory (XDG: ~/.config/calendar-mcp)
fn get_config_dir() -> PathBuf {
    home_dir().join(".config").join(crate::APP_NAME)
}

impl Config {
    /// Default config file location
    pub fn config_path() -> PathBuf {
        get_config_dir().join("config.toml")
    }

    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&contents)?;
            info!("Loaded configuration from {:?}", path);
            Ok(config)
        } else {
            info!("No config file found at {:?}, using defaults", path);
            Ok(Config::default())
        }
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents =
            toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))?;
        std::fs::write(path, contents)?;
        info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Get the Calendar database path
    pub fn calendar_db_path(&self) -> &Path {
        &self.calendar.db_path
    }

    /// Get the logs directory
    pub fn logs_dir(&self) -> PathBuf {
        self.general.data_dir.join("logs")
    }

    /// Resolve the configured timezone
    pub fn zone(&self) -> Result<Zone> {
        match &self.general.timezone {
            None => Ok(Zone::Local),
            Some(name) => name
                .parse()
                .map(Zone::Named)
                .map_err(|_| Error::InvalidConfig {
                    field: "general.timezone".to_string(),
                    reason: format!("unknown timezone '{}'", name),
                }),
        }
    }
}
