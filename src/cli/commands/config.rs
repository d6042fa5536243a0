//! Config commands.

use crate::cli::args::ConfigCommands;
use crate::config::{Config, Paths};
use crate::error::PoncikError;

/// Execute config subcommands.
///
/// # Errors
///
/// Returns an error if the config cannot be serialized or the home directory
/// cannot be determined.
pub fn config(config: &Config, cmd: ConfigCommands) -> Result<String, PoncikError> {
    match cmd {
        ConfigCommands::Show => config.to_masked_yaml(),
        ConfigCommands::Path => Ok(Paths::new()?.config_file.display().to_string()),
    }
}
