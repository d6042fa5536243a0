//! Queued settlement commands.

use crate::api::HttpClient;
use crate::cli::args::{OutputFormat, PendingCommands};
use crate::config::Config;
use crate::error::PoncikError;
use crate::features::focus::PendingStore;
use crate::output::{format_flush, format_pending, to_json};

/// Execute pending subcommands.
///
/// # Errors
///
/// Returns an error if the local database fails, or `clear` is run without
/// `--force`.
pub async fn pending(
    config: &Config,
    cmd: PendingCommands,
    format: OutputFormat,
) -> Result<String, PoncikError> {
    let store = PendingStore::new()?;

    match cmd {
        PendingCommands::List => format_pending(&store.list()?, format),

        PendingCommands::Flush => {
            let client = HttpClient::new(&config.api)?;
            let report = store.flush(&client).await?;
            format_flush(&report, format)
        }

        PendingCommands::Clear { force } => clear(&store, force, format),
    }
}

fn clear(store: &PendingStore, force: bool, format: OutputFormat) -> Result<String, PoncikError> {
    if !force {
        let count = store.count()?;
        return Err(PoncikError::Config(format!(
            "This will drop {count} queued settlement(s) without sending them.\nUse --force to confirm."
        )));
    }

    let dropped = store.clear()?;
    match format {
        OutputFormat::Json => to_json(&serde_json::json!({ "dropped": dropped })),
        OutputFormat::Pretty => Ok(format!("Dropped {dropped} queued settlement(s).")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{SessionId, SettlementRequest};
    use crate::features::focus::{PendingSettlement, TimerMode};
    use crate::storage::Database;

    fn store_with_one() -> PendingStore {
        let store = PendingStore::with_database(Database::open_in_memory().unwrap());
        store
            .enqueue(
                &PendingSettlement {
                    session_id: SessionId::new("focus_1"),
                    mode: TimerMode::Focus,
                    request: SettlementRequest {
                        elapsed_minutes: 3,
                        double_credits: false,
                    },
                },
                Some("timeout"),
            )
            .unwrap();
        store
    }

    #[test]
    fn test_clear_requires_force() {
        let store = store_with_one();
        let err = clear(&store, false, OutputFormat::Pretty).unwrap_err();
        assert!(err.to_string().contains("drop 1 queued"));
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_clear_with_force() {
        let store = store_with_one();
        let output = clear(&store, true, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["dropped"], 1);
        assert_eq!(store.count().unwrap(), 0);
    }
}
