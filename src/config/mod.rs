//! Configuration management for poncik.
//!
//! This module handles loading and saving configuration from `~/.poncik/`.

mod paths;
mod settings;

pub use paths::Paths;
pub use settings::{
    ApiConfig, ColorSetting, Config, FailureMode, FocusConfig, GeneralConfig, SettlementConfig,
};
