//! Leaderboard command.

use crate::api::HttpClient;
use crate::cli::args::OutputFormat;
use crate::config::Config;
use crate::error::PoncikError;
use crate::output::format_leaderboard;

/// Fetch and show the top `limit` users by focus time.
///
/// # Errors
///
/// Returns an error if the backend call fails.
pub async fn leaderboard(
    config: &Config,
    limit: usize,
    format: OutputFormat,
) -> Result<String, PoncikError> {
    let client = HttpClient::new(&config.api)?;
    let mut entries = client.leaderboard().await?;
    entries.truncate(limit);
    format_leaderboard(&entries, format)
}
