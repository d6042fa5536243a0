//! Settlement outcomes and what happens when the end-session call fails.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tracing::{error, info, warn};

use super::mode::TimerMode;
use super::pending::PendingStore;
use crate::api::{ApiError, SessionId, SettlementRequest, SettlementResult, UserState};
use crate::config::{FailureMode, SettlementConfig};
use crate::error::PoncikError;

/// An end-session call that has not reached the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingSettlement {
    pub session_id: SessionId,
    pub mode: TimerMode,
    pub request: SettlementRequest,
}

/// What became of a settlement whose retries ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "disposition", rename_all = "lowercase")]
pub enum FailureDisposition {
    /// Dropped; the session's reward is lost.
    Discarded,
    /// Stored for `poncik pending flush`.
    Queued { id: i64 },
}

/// Retry and failure handling for the end-session call.
pub trait SettlementRetryPolicy: Send + Sync {
    /// Extra attempts after the first failure.
    fn max_retries(&self) -> u32 {
        0
    }

    /// Delay before retry number `attempt` (1-based).
    fn backoff(&self, _attempt: u32) -> Duration {
        Duration::ZERO
    }

    /// Called once every attempt has failed.
    fn on_exhausted(&self, pending: &PendingSettlement, error: &ApiError) -> FailureDisposition;
}

/// Retry count with a doubling delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RetrySchedule {
    pub max_retries: u32,
    pub base_backoff: Duration,
}

impl RetrySchedule {
    #[must_use]
    pub const fn new(max_retries: u32, base_backoff: Duration) -> Self {
        Self {
            max_retries,
            base_backoff,
        }
    }

    /// `base * 2^(attempt - 1)`, capped at 2^10.
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(10);
        self.base_backoff.saturating_mul(1 << exponent)
    }
}

/// Drop failed settlements after logging them.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardOnFailure {
    schedule: RetrySchedule,
}

impl DiscardOnFailure {
    #[must_use]
    pub const fn new(schedule: RetrySchedule) -> Self {
        Self { schedule }
    }
}

impl SettlementRetryPolicy for DiscardOnFailure {
    fn max_retries(&self) -> u32 {
        self.schedule.max_retries
    }

    fn backoff(&self, attempt: u32) -> Duration {
        self.schedule.delay(attempt)
    }

    fn on_exhausted(&self, pending: &PendingSettlement, error: &ApiError) -> FailureDisposition {
        warn!(
            session_id = %pending.session_id,
            elapsed_minutes = pending.request.elapsed_minutes,
            error = %error,
            "settlement failed, discarding"
        );
        FailureDisposition::Discarded
    }
}

/// Store failed settlements in the local database.
pub struct QueueOnFailure {
    schedule: RetrySchedule,
    store: Mutex<PendingStore>,
}

impl QueueOnFailure {
    #[must_use]
    pub fn new(schedule: RetrySchedule, store: PendingStore) -> Self {
        Self {
            schedule,
            store: Mutex::new(store),
        }
    }
}

impl SettlementRetryPolicy for QueueOnFailure {
    fn max_retries(&self) -> u32 {
        self.schedule.max_retries
    }

    fn backoff(&self, attempt: u32) -> Duration {
        self.schedule.delay(attempt)
    }

    fn on_exhausted(&self, pending: &PendingSettlement, error: &ApiError) -> FailureDisposition {
        let store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        match store.enqueue(pending, Some(&error.to_string())) {
            Ok(id) => {
                info!(session_id = %pending.session_id, id, "settlement queued for retry");
                FailureDisposition::Queued { id }
            }
            Err(e) => {
                error!(session_id = %pending.session_id, error = %e, "could not queue settlement");
                FailureDisposition::Discarded
            }
        }
    }
}

/// Build the policy selected in the `settlement` config section.
///
/// # Errors
///
/// Returns an error if queueing is selected and the database cannot be opened.
pub fn policy_from_config(
    config: &SettlementConfig,
) -> Result<Box<dyn SettlementRetryPolicy>, PoncikError> {
    let schedule = RetrySchedule::new(
        config.max_retries,
        Duration::from_millis(config.retry_backoff_ms),
    );
    Ok(match config.on_failure {
        FailureMode::Discard => Box::new(DiscardOnFailure::new(schedule)),
        FailureMode::Queue => Box::new(QueueOnFailure::new(schedule, PendingStore::new()?)),
    })
}

/// A session the backend accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettlementReport {
    pub session_id: SessionId,
    pub mode: TimerMode,
    pub request: SettlementRequest,
    pub result: SettlementResult,
    /// Level increased compared to the user state held before settling.
    pub leveled_up: bool,
    /// User state after the settlement, when known.
    pub user: Option<UserState>,
}

/// How a settlement ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SettlementOutcome {
    Settled(SettlementReport),
    Failed {
        session_id: SessionId,
        request: SettlementRequest,
        error: ApiError,
        disposition: FailureDisposition,
    },
}

impl SettlementOutcome {
    /// The request that was sent.
    #[must_use]
    pub const fn request(&self) -> SettlementRequest {
        match self {
            Self::Settled(report) => report.request,
            Self::Failed { request, .. } => *request,
        }
    }

    #[must_use]
    pub const fn is_settled(&self) -> bool {
        matches!(self, Self::Settled(_))
    }
}
