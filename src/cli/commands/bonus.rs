//! Study bonus commands.

use crate::cli::args::{BonusCommands, OutputFormat};
use crate::error::PoncikError;
use crate::features::rewards::{BonusTracker, TRACKER_KEY};
use crate::output::format_bonus_status;
use crate::storage::{KeyValueStore, SqliteStore};

/// Execute bonus subcommands.
///
/// # Errors
///
/// Returns an error if local storage fails, or `reset` is run without
/// `--force`.
pub fn bonus(cmd: BonusCommands, format: OutputFormat) -> Result<String, PoncikError> {
    let mut store = SqliteStore::new()?;
    run(&mut store, cmd, format)
}

fn run(
    store: &mut dyn KeyValueStore,
    cmd: BonusCommands,
    format: OutputFormat,
) -> Result<String, PoncikError> {
    match cmd {
        BonusCommands::Status => format_bonus_status(&BonusTracker::load(store)?, format),

        BonusCommands::Reset { force } => {
            if !force {
                return Err(PoncikError::Config(
                    "This will reset your streak and study counters.\nUse --force to confirm."
                        .to_string(),
                ));
            }
            store.remove(TRACKER_KEY)?;
            Ok("Bonus progress reset.".to_string())
        }
    }
}
