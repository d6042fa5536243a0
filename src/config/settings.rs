//! Configuration settings for poncik.
//!
//! Settings are loaded from `~/.poncik/config.yaml`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cli::args::OutputFormat;
use crate::config::Paths;
use crate::error::PoncikError;
use crate::features::focus::TimerMode;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// General settings.
    pub general: GeneralConfig,
    /// Backend connection settings.
    pub api: ApiConfig,
    /// What to do when a settlement cannot be delivered.
    pub settlement: SettlementConfig,
    /// Focus timer settings.
    pub focus: FocusConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Default output format.
    #[serde(default = "default_output_format")]
    pub default_output: OutputFormat,
    /// Color output setting.
    #[serde(default = "default_color")]
    pub color: ColorSetting,
    /// Default log filter (overridden by `RUST_LOG`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Color output setting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColorSetting {
    /// Auto-detect based on terminal.
    #[default]
    Auto,
    /// Always use colors.
    Always,
    /// Never use colors.
    Never,
}

/// Backend connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the REST API, including the `/api` prefix.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bearer token for the authenticated user.
    #[serde(default)]
    pub token: Option<String>,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Disposition for settlements whose retries are exhausted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FailureMode {
    /// Warn and drop the reward.
    #[default]
    Discard,
    /// Persist the settlement for a later `poncik pending flush`.
    Queue,
}

/// Settlement delivery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SettlementConfig {
    /// Additional attempts after the first failed end-session call.
    #[serde(default)]
    pub max_retries: u32,
    /// Delay between attempts in milliseconds (doubled on each retry).
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    /// What happens after the last attempt fails.
    #[serde(default)]
    pub on_failure: FailureMode,
}

/// Focus timer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusConfig {
    /// Mode selected when the timer opens.
    #[serde(default)]
    pub default_mode: TimerMode,
    /// Ring the terminal bell when a countdown completes.
    #[serde(default = "default_true")]
    pub bell: bool,
}

// Default value functions for serde
const fn default_output_format() -> OutputFormat {
    OutputFormat::Pretty
}

const fn default_color() -> ColorSetting {
    ColorSetting::Auto
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

const fn default_timeout_secs() -> u64 {
    10
}

const fn default_retry_backoff_ms() -> u64 {
    500
}

const fn default_true() -> bool {
    true
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_output: default_output_format(),
            color: default_color(),
            log_level: default_log_level(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ApiConfig {
    /// Request timeout as a `Duration`.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            retry_backoff_ms: default_retry_backoff_ms(),
            on_failure: FailureMode::Discard,
        }
    }
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            default_mode: TimerMode::Focus,
            bell: default_true(),
        }
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self, PoncikError> {
        let paths = Paths::new()?;
        Self::load_from_path(&paths.config_file)
    }

    /// Load configuration from a specific path.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load_from_path(path: &std::path::Path) -> Result<Self, PoncikError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            PoncikError::Config(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        serde_yaml::from_str(&contents).map_err(|e| {
            PoncikError::Config(format!(
                "Failed to parse config file {}: {e}",
                path.display()
            ))
        })
    }

    /// Save configuration to a specific path.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be written.
    pub fn save_to_path(&self, path: &std::path::Path) -> Result<(), PoncikError> {
        let contents = serde_yaml::to_string(self)
            .map_err(|e| PoncikError::Config(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, contents).map_err(|e| {
            PoncikError::Config(format!(
                "Failed to write config file {}: {e}",
                path.display()
            ))
        })
    }

    /// Apply command-line / environment overrides on top of the file values.
    pub fn apply_overrides(&mut self, api_url: Option<String>, token: Option<String>) {
        if let Some(url) = api_url {
            self.api.base_url = url;
        }
        if token.is_some() {
            self.api.token = token;
        }
    }

    /// Render the configuration as YAML, with the token masked.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_masked_yaml(&self) -> Result<String, PoncikError> {
        let mut masked = self.clone();
        if masked.api.token.is_some() {
            masked.api.token = Some("********".to_string());
        }
        serde_yaml::to_string(&masked)
            .map_err(|e| PoncikError::Config(format!("Failed to serialize config: {e}")))
    }
}
