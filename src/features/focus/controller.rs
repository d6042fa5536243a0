//! The focus-session state machine.
//!
//! ```text
//! Idle -> Running -> {Completed | Stopped} -> Settling -> Idle
//! ```
//!
//! The controller owns its tick source. Whoever drives it (the TUI or the
//! headless runner) awaits [`FocusSessionController::next_event`] and calls
//! the user-facing operations between events.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::mode::TimerMode;
use super::offer::{BonusOffer, OfferOrigin};
use super::session::FocusSession;
use super::settlement::{
    DiscardOnFailure, PendingSettlement, SettlementOutcome, SettlementReport,
    SettlementRetryPolicy,
};
use super::timer::{Countdown, Ticker};
use crate::api::{ApiError, SessionId, SessionService, SettlementRequest, UserProfile, UserState};

/// Sessions stopped before this many seconds settle without a bonus offer.
pub const MIN_BONUS_SESSION_SECS: u64 = 10;

/// Controller lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ControllerState {
    Idle,
    Running,
    Completed,
    Stopped,
    Settling,
}

impl std::fmt::Display for ControllerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Stopped => "stopped",
            Self::Settling => "settling",
        };
        f.write_str(s)
    }
}

/// Operations the controller refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    #[error("Cannot {operation} while {state}")]
    InvalidTransition {
        operation: &'static str,
        state: ControllerState,
    },

    /// The backend did not open a session. The controller is still idle.
    #[error("Could not start session: {0}")]
    StartFailed(ApiError),

    #[error("Bonus is locked for another {remaining_secs}s")]
    BonusLocked { remaining_secs: u32 },

    #[error("No bonus was offered for this session")]
    NoBonusOffer,
}

/// Something the driver should redraw or react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerEvent {
    /// One second of the session elapsed.
    Tick { remaining_secs: u32 },
    /// The countdown reached zero; a bonus offer is now open.
    Completed,
    /// One second of the bonus gate elapsed.
    BonusCountdown { remaining_secs: u32 },
    /// "Accept bonus" is now available.
    BonusReady,
}

/// Result of [`FocusSessionController::stop`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopOutcome {
    /// The session was too short for a bonus and has been settled.
    Settled(SettlementOutcome),
    /// A bonus offer is open; call accept or skip.
    BonusOffered,
}

/// Drives one focus session at a time against a [`SessionService`].
pub struct FocusSessionController {
    service: Arc<dyn SessionService>,
    profile: Option<Arc<dyn UserProfile>>,
    policy: Box<dyn SettlementRetryPolicy>,
    mode: TimerMode,
    countdown: Countdown,
    state: ControllerState,
    session: Option<FocusSession>,
    offer: Option<BonusOffer>,
    ticker: Option<Ticker>,
    user: Option<UserState>,
}

impl FocusSessionController {
    /// An idle controller in focus mode that discards failed settlements.
    #[must_use]
    pub fn new(service: Arc<dyn SessionService>) -> Self {
        let mode = TimerMode::default();
        Self {
            service,
            profile: None,
            policy: Box::new(DiscardOnFailure::default()),
            mode,
            countdown: Countdown::new(mode.duration_secs()),
            state: ControllerState::Idle,
            session: None,
            offer: None,
            ticker: None,
            user: None,
        }
    }

    /// Refresh this profile after each successful settlement.
    #[must_use]
    pub fn with_profile(mut self, profile: Arc<dyn UserProfile>) -> Self {
        self.profile = Some(profile);
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: Box<dyn SettlementRetryPolicy>) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_mode(mut self, mode: TimerMode) -> Self {
        self.select_mode(mode);
        self
    }

    /// Seed the cached user state, used to detect level-ups.
    #[must_use]
    pub fn with_user(mut self, user: UserState) -> Self {
        self.user = Some(user);
        self
    }

    #[must_use]
    pub const fn state(&self) -> ControllerState {
        self.state
    }

    #[must_use]
    pub const fn mode(&self) -> TimerMode {
        self.mode
    }

    #[must_use]
    pub const fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    #[must_use]
    pub const fn remaining_secs(&self) -> u32 {
        self.countdown.remaining_secs()
    }

    #[must_use]
    pub const fn session(&self) -> Option<&FocusSession> {
        self.session.as_ref()
    }

    /// The open bonus offer, while settling.
    #[must_use]
    pub const fn offer(&self) -> Option<BonusOffer> {
        self.offer
    }

    #[must_use]
    pub const fn user(&self) -> Option<&UserState> {
        self.user.as_ref()
    }

    /// Switch timer mode. Ignored unless idle.
    ///
    /// Returns whether the mode changed.
    pub fn select_mode(&mut self, mode: TimerMode) -> bool {
        if self.state != ControllerState::Idle {
            debug!(state = %self.state, requested = %mode, "mode change ignored");
            return false;
        }
        self.mode = mode;
        self.countdown.reset(mode.duration_secs());
        true
    }

    /// Open a session with the backend and start counting down.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless idle, or `StartFailed` if the backend
    /// call fails. The controller stays idle on error.
    pub async fn start(&mut self) -> Result<SessionId, ControllerError> {
        self.require(ControllerState::Idle, "start")?;

        let minutes = self.mode.duration_minutes();
        let id = self.service.start(minutes).await.map_err(|e| {
            warn!(mode = %self.mode, error = %e, "session start failed");
            ControllerError::StartFailed(e)
        })?;

        info!(session_id = %id, mode = %self.mode, minutes, "session started");
        self.session = Some(FocusSession::begin(id.clone(), self.mode));
        self.countdown.reset(self.mode.duration_secs());
        self.ticker = Some(Ticker::every_second());
        self.state = ControllerState::Running;
        Ok(id)
    }

    /// Advance one second.
    ///
    /// Normally called by [`Self::next_event`]; exposed for drivers with their
    /// own clock.
    pub fn tick(&mut self) -> Option<ControllerEvent> {
        match self.state {
            ControllerState::Running => {
                if self.countdown.tick() {
                    self.state = ControllerState::Completed;
                    info!(mode = %self.mode, "session completed");
                    self.enter_settling(OfferOrigin::Completed);
                    Some(ControllerEvent::Completed)
                } else {
                    Some(ControllerEvent::Tick {
                        remaining_secs: self.countdown.remaining_secs(),
                    })
                }
            }
            ControllerState::Settling => {
                let offer = self.offer.as_mut()?;
                if offer.is_ready() {
                    return None;
                }
                if offer.tick() {
                    self.ticker = None;
                    Some(ControllerEvent::BonusReady)
                } else {
                    Some(ControllerEvent::BonusCountdown {
                        remaining_secs: offer.remaining_secs(),
                    })
                }
            }
            _ => None,
        }
    }

    /// Wait for the next tick and apply it.
    ///
    /// Pends forever when no tick source is active. Cancel safe.
    pub async fn next_event(&mut self) -> ControllerEvent {
        loop {
            match self.ticker.as_mut() {
                Some(ticker) => ticker.tick().await,
                None => std::future::pending::<()>().await,
            }
            if let Some(event) = self.tick() {
                return event;
            }
        }
    }

    /// Stop a running session early.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless running.
    pub async fn stop(&mut self) -> Result<StopOutcome, ControllerError> {
        self.require(ControllerState::Running, "stop")?;
        self.ticker = None;

        let elapsed = self
            .session
            .as_ref()
            .map_or(Duration::ZERO, FocusSession::elapsed);

        if elapsed < Duration::from_secs(MIN_BONUS_SESSION_SECS) {
            debug!(elapsed_ms = elapsed.as_millis(), "stopped too early for a bonus");
            self.state = ControllerState::Settling;
            let outcome = self.settle_inner(false).await?;
            return Ok(StopOutcome::Settled(outcome));
        }

        self.state = ControllerState::Stopped;
        info!(elapsed_secs = elapsed.as_secs(), "session stopped");
        self.enter_settling(OfferOrigin::Stopped);
        Ok(StopOutcome::BonusOffered)
    }

    /// Settle with double credits. Only once the bonus gate has opened.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless settling, `NoBonusOffer` if the
    /// session had no offer, or `BonusLocked` while the gate is counting down.
    pub async fn accept_bonus(&mut self) -> Result<SettlementOutcome, ControllerError> {
        self.settle(true).await
    }

    /// Settle without the bonus.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless settling.
    pub async fn skip_bonus(&mut self) -> Result<SettlementOutcome, ControllerError> {
        self.settle(false).await
    }

    /// Send the end-session call and return to idle.
    ///
    /// A backend failure is not an error here: it is reported in
    /// [`SettlementOutcome::Failed`] after the retry policy has run.
    ///
    /// # Errors
    ///
    /// See [`Self::accept_bonus`].
    pub async fn settle(&mut self, double_credits: bool) -> Result<SettlementOutcome, ControllerError> {
        self.require(ControllerState::Settling, "settle")?;

        if double_credits {
            match self.offer {
                None => return Err(ControllerError::NoBonusOffer),
                Some(offer) if !offer.is_ready() => {
                    return Err(ControllerError::BonusLocked {
                        remaining_secs: offer.remaining_secs(),
                    })
                }
                Some(_) => {}
            }
        }

        self.settle_inner(double_credits).await
    }

    fn require(&self, expected: ControllerState, operation: &'static str) -> Result<(), ControllerError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(ControllerError::InvalidTransition {
                operation,
                state: self.state,
            })
        }
    }

    fn enter_settling(&mut self, origin: OfferOrigin) {
        self.state = ControllerState::Settling;
        self.offer = Some(BonusOffer::new(origin));
        self.ticker = Some(Ticker::every_second());
    }

    async fn settle_inner(&mut self, double_credits: bool) -> Result<SettlementOutcome, ControllerError> {
        self.ticker = None;
        self.offer = None;

        let Some(session) = self.session.take() else {
            self.reset_to_idle();
            return Err(ControllerError::InvalidTransition {
                operation: "settle",
                state: ControllerState::Idle,
            });
        };

        let request = SettlementRequest {
            elapsed_minutes: session.elapsed_minutes(),
            double_credits,
        };

        let mut attempt = 0;
        let result = loop {
            match self.service.end(&session.id, request).await {
                Ok(result) => break Ok(result),
                Err(e) if attempt < self.policy.max_retries() => {
                    attempt += 1;
                    let delay = self.policy.backoff(attempt);
                    warn!(session_id = %session.id, attempt, error = %e, ?delay, "settlement failed, retrying");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => break Err(e),
            }
        };

        let outcome = match result {
            Ok(result) => {
                info!(
                    session_id = %session.id,
                    elapsed_minutes = request.elapsed_minutes,
                    double_credits,
                    credits = result.credits_earned,
                    xp = result.xp_earned,
                    "session settled"
                );
                let previous_level = self.user.as_ref().map_or(1, |u| u.level);
                if let Some(user) = self.user.as_mut() {
                    user.apply_settlement(request, &result);
                }
                self.refresh_user().await;

                SettlementOutcome::Settled(SettlementReport {
                    session_id: session.id,
                    mode: session.mode,
                    request,
                    result,
                    leveled_up: result.new_level > previous_level,
                    user: self.user.clone(),
                })
            }
            Err(error) => {
                let pending = PendingSettlement {
                    session_id: session.id,
                    mode: session.mode,
                    request,
                };
                let disposition = self.policy.on_exhausted(&pending, &error);
                SettlementOutcome::Failed {
                    session_id: pending.session_id,
                    request,
                    error,
                    disposition,
                }
            }
        };

        self.reset_to_idle();
        Ok(outcome)
    }

    async fn refresh_user(&mut self) {
        let Some(profile) = self.profile.as_ref() else {
            return;
        };
        match profile.refresh().await {
            Ok(user) => self.user = Some(user),
            Err(e) => warn!(error = %e, "profile refresh failed, keeping local totals"),
        }
    }

    fn reset_to_idle(&mut self) {
        self.ticker = None;
        self.offer = None;
        self.session = None;
        self.countdown.reset(self.mode.duration_secs());
        self.state = ControllerState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MockSessionService, MockUserProfile, SettlementResult};
    use crate::features::focus::settlement::{FailureDisposition, RetrySchedule};
    use mockall::predicate::eq;

    fn reward(minutes: u32, double: bool, level: u32) -> SettlementResult {
        let credits = i64::from(minutes) * if double { 2 } else { 1 };
        SettlementResult {
            credits_earned: credits,
            xp_earned: i64::from(minutes) * 10,
            new_level: level,
            streak_days: Some(1),
        }
    }

    fn starting_service(minutes: u32) -> MockSessionService {
        let mut service = MockSessionService::new();
        service
            .expect_start()
            .with(eq(minutes))
            .times(1)
            .returning(|_| Ok(SessionId::new("focus_1")));
        service
    }

    fn controller(service: MockSessionService) -> FocusSessionController {
        FocusSessionController::new(Arc::new(service))
    }

    fn user(level: u32) -> UserState {
        UserState {
            user_id: "user_1".to_string(),
            name: "Ada".to_string(),
            credits: 100,
            xp: 0,
            level,
            streak_days: 0,
            total_focus_minutes: 0,
        }
    }

    async fn run_secs(c: &mut FocusSessionController, secs: u32) {
        for _ in 0..secs {
            assert!(matches!(c.next_event().await, ControllerEvent::Tick { .. }));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_mode_only_while_idle() {
        let mut c = controller(starting_service(5));

        assert!(c.select_mode(TimerMode::ShortBreak));
        assert_eq!(c.remaining_secs(), 300);

        c.start().await.unwrap();
        run_secs(&mut c, 2).await;

        assert!(!c.select_mode(TimerMode::LongBreak));
        assert_eq!(c.mode(), TimerMode::ShortBreak);
        assert_eq!(c.remaining_secs(), 298);
        assert_eq!(c.state(), ControllerState::Running);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_start_is_rejected_without_service_call() {
        let mut c = controller(starting_service(25));

        let id = c.start().await.unwrap();
        assert_eq!(id.as_str(), "focus_1");

        assert_eq!(
            c.start().await,
            Err(ControllerError::InvalidTransition {
                operation: "start",
                state: ControllerState::Running
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_failure_stays_idle_and_can_retry() {
        let mut service = MockSessionService::new();
        let mut calls = 0;
        service.expect_start().times(2).returning(move |_| {
            calls += 1;
            if calls == 1 {
                Err(ApiError::Transport {
                    message: "connection refused".to_string(),
                })
            } else {
                Ok(SessionId::new("focus_2"))
            }
        });
        let mut c = controller(service);

        let err = c.start().await.unwrap_err();
        assert!(matches!(err, ControllerError::StartFailed(ApiError::Transport { .. })));
        assert_eq!(c.state(), ControllerState::Idle);
        assert!(c.session().is_none());

        assert_eq!(c.start().await.unwrap().as_str(), "focus_2");
        assert_eq!(c.state(), ControllerState::Running);
    }

    #[tokio::test(start_paused = true)]
    async fn test_completion_reports_full_duration() {
        let mut service = starting_service(25);
        service
            .expect_end()
            .withf(|id, req| id.as_str() == "focus_1" && req.elapsed_minutes == 25 && !req.double_credits)
            .times(1)
            .returning(|_, _| Ok(reward(25, false, 1)));
        let mut c = controller(service);

        c.start().await.unwrap();
        run_secs(&mut c, 1499).await;
        assert_eq!(c.next_event().await, ControllerEvent::Completed);

        assert_eq!(c.state(), ControllerState::Settling);
        let offer = c.offer().unwrap();
        assert_eq!(offer.origin(), OfferOrigin::Completed);
        assert!(!offer.is_ready());

        assert_eq!(
            c.accept_bonus().await,
            Err(ControllerError::BonusLocked { remaining_secs: 5 })
        );
        assert_eq!(c.state(), ControllerState::Settling);

        let outcome = c.skip_bonus().await.unwrap();
        let SettlementOutcome::Settled(report) = outcome else {
            panic!("expected settled outcome");
        };
        assert_eq!(report.result.credits_earned, 25);
        assert_eq!(c.state(), ControllerState::Idle);
        assert_eq!(c.remaining_secs(), 1500);
        assert!(c.offer().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_stop_settles_without_offer() {
        let mut service = starting_service(25);
        service
            .expect_end()
            .withf(|_, req| req.elapsed_minutes == 1 && !req.double_credits)
            .times(1)
            .returning(|_, _| Ok(reward(1, false, 1)));
        let mut c = controller(service);

        c.start().await.unwrap();
        run_secs(&mut c, 7).await;

        let outcome = c.stop().await.unwrap();
        let StopOutcome::Settled(outcome) = outcome else {
            panic!("expected immediate settlement");
        };
        assert!(outcome.is_settled());
        assert_eq!(
            outcome.request(),
            SettlementRequest {
                elapsed_minutes: 1,
                double_credits: false
            }
        );
        assert_eq!(c.state(), ControllerState::Idle);
        assert!(c.offer().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_immediate_stop_reports_one_minute() {
        let mut service = starting_service(25);
        service
            .expect_end()
            .withf(|_, req| req.elapsed_minutes == 1)
            .times(1)
            .returning(|_, _| Ok(reward(1, false, 1)));
        let mut c = controller(service);

        c.start().await.unwrap();
        assert!(matches!(c.stop().await.unwrap(), StopOutcome::Settled(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_long_stop_gates_bonus_for_five_seconds() {
        let mut service = starting_service(25);
        service
            .expect_end()
            .withf(|_, req| req.elapsed_minutes == 1 && req.double_credits)
            .times(1)
            .returning(|_, _| Ok(reward(1, true, 1)));
        let mut c = controller(service);

        c.start().await.unwrap();
        run_secs(&mut c, 45).await;

        assert_eq!(c.stop().await.unwrap(), StopOutcome::BonusOffered);
        assert_eq!(c.state(), ControllerState::Settling);
        assert_eq!(c.offer().map(|o| o.origin()), Some(OfferOrigin::Stopped));

        for remaining_secs in [4, 3, 2, 1] {
            assert_eq!(
                c.next_event().await,
                ControllerEvent::BonusCountdown { remaining_secs }
            );
        }
        assert_eq!(c.next_event().await, ControllerEvent::BonusReady);

        let outcome = c.accept_bonus().await.unwrap();
        assert_eq!(
            outcome.request(),
            SettlementRequest {
                elapsed_minutes: 1,
                double_credits: true
            }
        );
        assert_eq!(c.state(), ControllerState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_settlement_returns_to_idle() {
        let mut service = starting_service(25);
        service
            .expect_end()
            .times(1)
            .returning(|_, _| Err(ApiError::Timeout));
        let mut c = controller(service);

        c.start().await.unwrap();
        run_secs(&mut c, 3).await;

        let StopOutcome::Settled(outcome) = c.stop().await.unwrap() else {
            panic!("expected immediate settlement");
        };
        assert_eq!(
            outcome,
            SettlementOutcome::Failed {
                session_id: SessionId::new("focus_1"),
                request: SettlementRequest {
                    elapsed_minutes: 1,
                    double_credits: false
                },
                error: ApiError::Timeout,
                disposition: FailureDisposition::Discarded,
            }
        );
        assert_eq!(c.state(), ControllerState::Idle);
        assert!(c.session().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_follow_policy() {
        let mut service = starting_service(25);
        service.expect_end().times(3).returning(|_, _| {
            Err(ApiError::Status {
                status: 502,
                message: "Bad Gateway".to_string(),
            })
        });
        let policy = DiscardOnFailure::new(RetrySchedule::new(2, Duration::from_millis(100)));
        let mut c = controller(service).with_policy(Box::new(policy));

        c.start().await.unwrap();
        let StopOutcome::Settled(outcome) = c.stop().await.unwrap() else {
            panic!("expected immediate settlement");
        };
        assert!(!outcome.is_settled());
        assert_eq!(c.state(), ControllerState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_recovers() {
        let mut service = starting_service(25);
        let mut calls = 0;
        service.expect_end().times(2).returning(move |_, _| {
            calls += 1;
            if calls == 1 {
                Err(ApiError::Timeout)
            } else {
                Ok(reward(1, false, 1))
            }
        });
        let policy = DiscardOnFailure::new(RetrySchedule::new(3, Duration::from_secs(1)));
        let mut c = controller(service).with_policy(Box::new(policy));

        c.start().await.unwrap();
        let StopOutcome::Settled(outcome) = c.stop().await.unwrap() else {
            panic!("expected immediate settlement");
        };
        assert!(outcome.is_settled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_settlement_refreshes_profile_and_detects_level_up() {
        let mut service = starting_service(25);
        service
            .expect_end()
            .times(1)
            .returning(|_, _| Ok(reward(1, false, 2)));
        let mut profile = MockUserProfile::new();
        profile.expect_refresh().times(1).returning(|| {
            Ok(UserState {
                credits: 101,
                level: 2,
                ..user(2)
            })
        });
        let mut c = controller(service)
            .with_profile(Arc::new(profile))
            .with_user(user(1));

        c.start().await.unwrap();
        let StopOutcome::Settled(SettlementOutcome::Settled(report)) = c.stop().await.unwrap()
        else {
            panic!("expected settled outcome");
        };

        assert!(report.leveled_up);
        assert_eq!(report.user.as_ref().map(|u| u.credits), Some(101));
        assert_eq!(c.user().map(|u| u.level), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_refresh_keeps_provisional_state() {
        let mut service = starting_service(25);
        service
            .expect_end()
            .times(1)
            .returning(|_, _| Ok(reward(1, false, 1)));
        let mut profile = MockUserProfile::new();
        profile
            .expect_refresh()
            .times(1)
            .returning(|| Err(ApiError::Unauthorized));
        let mut c = controller(service)
            .with_profile(Arc::new(profile))
            .with_user(user(1));

        c.start().await.unwrap();
        let StopOutcome::Settled(SettlementOutcome::Settled(report)) = c.stop().await.unwrap()
        else {
            panic!("expected settled outcome");
        };

        assert!(!report.leveled_up);
        let cached = c.user().unwrap();
        assert_eq!(cached.credits, 101);
        assert_eq!(cached.total_focus_minutes, 1);
    }

    #[tokio::test]
    async fn test_operations_outside_their_state_are_rejected() {
        let mut c = controller(MockSessionService::new());

        assert_eq!(
            c.stop().await,
            Err(ControllerError::InvalidTransition {
                operation: "stop",
                state: ControllerState::Idle
            })
        );
        assert_eq!(
            c.skip_bonus().await,
            Err(ControllerError::InvalidTransition {
                operation: "settle",
                state: ControllerState::Idle
            })
        );
        assert_eq!(c.tick(), None);
    }
}
