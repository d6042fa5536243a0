//! Error types for poncik.

use thiserror::Error;

use crate::api::ApiError;
use crate::features::focus::ControllerError;
use crate::features::inventory::InventoryError;

/// Top-level error type for the crate.
#[derive(Debug, Error)]
pub enum PoncikError {
    /// Configuration could not be read, parsed, or resolved.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Local database failure.
    #[error("Database error: {0}")]
    Database(String),

    /// I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization or deserialization failure.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Requested item does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The backend rejected or failed a request.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The focus controller rejected an operation.
    #[error(transparent)]
    Controller(#[from] ControllerError),

    /// Shop purchase or equip failure.
    #[error(transparent)]
    Inventory(#[from] InventoryError),

    /// Terminal setup or drawing failure.
    #[error("Terminal error: {0}")]
    Terminal(String),
}

impl PoncikError {
    /// Exit code used by the binary for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Api(ApiError::Unauthorized)
            | Self::Controller(ControllerError::StartFailed(ApiError::Unauthorized)) => 3,
            Self::Api(_) | Self::Controller(ControllerError::StartFailed(_)) => 4,
            Self::NotFound(_) | Self::Inventory(InventoryError::ItemNotFound(_)) => 5,
            _ => 1,
        }
    }
}

impl From<rusqlite::Error> for PoncikError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Database(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(PoncikError::Config("x".into()).exit_code(), 2);
        assert_eq!(PoncikError::Api(ApiError::Unauthorized).exit_code(), 3);
        assert_eq!(PoncikError::Api(ApiError::Timeout).exit_code(), 4);
        assert_eq!(PoncikError::NotFound("x".into()).exit_code(), 5);
        assert_eq!(PoncikError::Database("x".into()).exit_code(), 1);
    }

    #[test]
    fn test_exit_codes_see_through_wrapped_errors() {
        let rejected = ControllerError::StartFailed(ApiError::Unauthorized);
        assert_eq!(PoncikError::from(rejected).exit_code(), 3);

        let unreachable = ControllerError::StartFailed(ApiError::Timeout);
        assert_eq!(PoncikError::from(unreachable).exit_code(), 4);

        let missing = InventoryError::ItemNotFound("dragon".into());
        assert_eq!(PoncikError::from(missing).exit_code(), 5);

        assert_eq!(PoncikError::from(ControllerError::NoBonusOffer).exit_code(), 1);
        assert_eq!(
            PoncikError::from(InventoryError::AlreadyOwned("casual".into())).exit_code(),
            1
        );
    }

    #[test]
    fn test_display_is_transparent_for_api() {
        let err = PoncikError::from(ApiError::Timeout);
        assert_eq!(err.to_string(), ApiError::Timeout.to_string());
    }
}
