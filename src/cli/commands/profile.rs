//! Profile command.

use crate::api::{HttpClient, UserProfile};
use crate::cli::args::OutputFormat;
use crate::config::Config;
use crate::error::PoncikError;
use crate::output::format_profile;

/// Fetch and show the signed-in user.
///
/// # Errors
///
/// Returns an error if the backend call fails.
pub async fn profile(config: &Config, format: OutputFormat) -> Result<String, PoncikError> {
    let client = HttpClient::new(&config.api)?;
    let user = client.refresh().await?;
    format_profile(&user, format)
}
