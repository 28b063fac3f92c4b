//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/planwise/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/planwise/` (~/.config/planwise/)
//! - Data: `$XDG_DATA_HOME/planwise/` (~/.local/share/planwise/)
//! - State/Logs: `$XDG_STATE_HOME/planwise/` (~/.local/state/planwise/)

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
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Calendar and recurrence settings
    #[serde(default)]
    pub calendar: CalendarConfig,

    /// Remote finance intent service (optional)
    #[serde(default)]
    pub intent_service: IntentServiceConfig,
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

/// Calendar configuration
#[derive(Debug, Deserialize, Clone)]
pub struct CalendarConfig {
    /// Months a recurrence runs for when the utterance names no end date
    #[serde(default = "default_recurrence_months")]
    pub default_recurrence_months: u32,

    /// Upper bound on generated instances per expansion
    #[serde(default = "default_max_recurrence_instances")]
    pub max_recurrence_instances: usize,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            default_recurrence_months: default_recurrence_months(),
            max_recurrence_instances: default_max_recurrence_instances(),
        }
    }
}

fn default_recurrence_months() -> u32 {
    3
}

fn default_max_recurrence_instances() -> usize {
    1000
}

/// Finance intent service configuration
///
/// When enabled, finance-flavoured utterances are first classified by the
/// remote service. Local extraction always runs regardless.
#[derive(Debug, Deserialize, Clone)]
pub struct IntentServiceConfig {
    /// Enable/disable the remote classifier
    #[serde(default)]
    pub enabled: bool,

    /// Full URL the classification request is POSTed to
    pub endpoint: Option<String>,

    /// Bearer token (optional)
    pub api_key: Option<String>,

    /// HTTP request timeout in seconds
    #[serde(default = "default_intent_timeout")]
    pub timeout_secs: u64,
}

impl Default for IntentServiceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: None,
            api_key: None,
            timeout_secs: default_intent_timeout(),
        }
    }
}

impl IntentServiceConfig {
    /// Check if the service is enabled and has somewhere to send requests
    pub fn is_ready(&self) -> bool {
        self.enabled && self.endpoint.is_some()
    }

    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        if self.endpoint.is_none() {
            return Err(Error::Config(
                "intent_service.endpoint is required when the intent service is enabled"
                    .to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Config(
                "intent_service.timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_intent_timeout() -> u64 {
    10
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

        config.intent_service.validate()?;

        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/planwise/config.toml` (~/.config/planwise/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("planwise").join("config.toml")
    }

    /// Returns the data directory path (for the event store)
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join("planwise")
    }

    /// Returns the state directory path (for logs)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("planwise")
    }

    /// Returns the event database path
    ///
    /// `$XDG_DATA_HOME/planwise/events.db` (~/.local/share/planwise/events.db)
    pub fn database_path() -> PathBuf {
        Self::data_dir().join("events.db")
    }

    /// Returns the log file path
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("planwise.log")
    }

    /// Ensure XDG base directory environment variables are set.
    ///
    /// This is mainly for the CLI, which wants explicit, stable path behavior
    /// before invoking other components that read these env vars.
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
