//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/domoro/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/domoro/` (~/.config/domoro/)
//! - Data: `$XDG_DATA_HOME/domoro/` (~/.local/share/domoro/)
//! - State/Logs: `$XDG_STATE_HOME/domoro/` (~/.local/state/domoro/)

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_DATA_HOME or ~/.local/share
fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Timer defaults
    #[serde(default)]
    pub timer: TimerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Timer defaults
#[derive(Debug, Deserialize)]
pub struct TimerConfig {
    /// Target duration, in minutes, used when `start` runs a timer
    /// without an explicit `--minutes`
    #[serde(default = "default_target_minutes")]
    pub default_minutes: i64,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            default_minutes: default_target_minutes(),
        }
    }
}

fn default_target_minutes() -> i64 {
    25
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        if config.timer.default_minutes <= 0 {
            return Err(Error::Config(
                "timer.default_minutes must be greater than zero".to_string(),
            ));
        }

        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/domoro/config.toml` (~/.config/domoro/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("domoro").join("config.toml")
    }

    /// Returns the data directory path (for the SQLite database)
    ///
    /// `$XDG_DATA_HOME/domoro/` (~/.local/share/domoro/)
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join("domoro")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/domoro/` (~/.local/state/domoro/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("domoro")
    }

    /// Returns the database file path
    ///
    /// `$XDG_DATA_HOME/domoro/sessions.db` (~/.local/share/domoro/sessions.db)
    pub fn database_path() -> PathBuf {
        Self::data_dir().join("sessions.db")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/domoro/domoro.log` (~/.local/state/domoro/domoro.log)
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("domoro.log")
    }

    /// Ensure XDG base directory environment variables are set.
    ///
    /// This is mainly for CLI binaries that want explicit, stable path
    /// behavior before invoking other components that read these env vars.
    pub fn ensure_xdg_env() {
        let home = home_dir();

        if std::env::var("XDG_DATA_HOME").is_err() {
            std::env::set_var("XDG_DATA_HOME", home.join(".local/share"));
        }

        if std::env::var("XDG_STATE_HOME").is_err() {
            std::env::set_var("XDG_STATE_HOME", home.join(".local/state"));
        }

        if std::env::var("XDG_CONFIG_HOME").is_err() {
            std::env::set_var("XDG_CONFIG_HOME", home.join(".config"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.timer.default_minutes, 25);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.max_files, 5);
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[timer]
default_minutes = 50

[logging]
level = "debug"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.timer.default_minutes, 50);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.max_files, 5);
    }

    #[test]
    fn test_rejects_non_positive_default_minutes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[timer]\ndefault_minutes = 0\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
