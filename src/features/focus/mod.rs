//! Focus timer and reward settlement.
//!
//! - [`TimerMode`]: focus, short break and long break
//! - [`FocusSessionController`]: the session state machine
//! - [`SettlementRetryPolicy`]: what happens when settling fails
//! - [`PendingStore`]: settlements queued for a later flush

pub mod controller;
pub mod mode;
pub mod offer;
pub mod pending;
pub mod session;
pub mod settlement;
pub mod timer;

pub use controller::{
    ControllerError, ControllerEvent, ControllerState, FocusSessionController, StopOutcome,
    MIN_BONUS_SESSION_SECS,
};
pub use mode::TimerMode;
pub use offer::{BonusOffer, OfferOrigin, BONUS_DELAY_SECS};
pub use pending::{FlushReport, PendingRecord, PendingStore};
pub use session::{elapsed_minutes, FocusSession};
pub use settlement::{
    policy_from_config, DiscardOnFailure, FailureDisposition, PendingSettlement, QueueOnFailure,
    RetrySchedule, SettlementOutcome, SettlementReport, SettlementRetryPolicy,
};
pub use timer::{format_duration, format_secs_mmss, render_progress_bar, Countdown, Ticker};
