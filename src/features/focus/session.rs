//! An open focus session and the elapsed-minute rule used at settlement.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::Instant;

use super::mode::TimerMode;
use crate::api::SessionId;

/// A session the backend has opened and the client is timing.
#[derive(Debug, Clone, Serialize)]
pub struct FocusSession {
    /// Identifier issued by the backend
    pub id: SessionId,
    /// Mode the session was started in
    pub mode: TimerMode,
    /// Requested duration in minutes
    pub duration_minutes: u32,
    /// Wall-clock start, for display
    pub started_at: DateTime<Utc>,
    /// Monotonic start, for elapsed time
    #[serde(skip)]
    started: Instant,
}

impl FocusSession {
    /// Begin timing a session the backend just opened.
    #[must_use]
    pub fn begin(id: SessionId, mode: TimerMode) -> Self {
        Self {
            id,
            mode,
            duration_minutes: mode.duration_minutes(),
            started_at: Utc::now(),
            started: Instant::now(),
        }
    }

    /// Time since the session started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Whole minutes to report when settling.
    #[must_use]
    pub fn elapsed_minutes(&self) -> u32 {
        elapsed_minutes(self.elapsed())
    }
}

/// `max(1, floor(elapsed / 60s))`.
#[must_use]
pub fn elapsed_minutes(elapsed: Duration) -> u32 {
    let minutes = elapsed.as_millis() / 60_000;
    u32::try_from(minutes).unwrap_or(u32::MAX).max(1)
}
