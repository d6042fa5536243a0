//! Service traits consumed by the focus controller.

use async_trait::async_trait;

use super::types::{ApiError, SessionId, SettlementRequest, SettlementResult, UserState};

/// Server-side accounting for focus sessions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionService: Send + Sync {
    /// Open a session for `duration_minutes` and return its id.
    async fn start(&self, duration_minutes: u32) -> Result<SessionId, ApiError>;

    /// Settle a session. Credits and XP are computed by the backend.
    async fn end(
        &self,
        session_id: &SessionId,
        request: SettlementRequest,
    ) -> Result<SettlementResult, ApiError>;
}

/// Source of truth for the signed-in user's credits, XP and level.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserProfile: Send + Sync {
    /// Fetch the current user state.
    async fn refresh(&self) -> Result<UserState, ApiError>;
}
