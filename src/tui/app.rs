//! Application state for the TUI.

use chrono::Local;
use tracing::warn;

use super::event::Action;
use crate::cli::commands::record_bonuses;
use crate::features::focus::{
    ControllerEvent, ControllerState, FailureDisposition, FocusSessionController,
    SettlementOutcome, StopOutcome, TimerMode, BONUS_DELAY_SECS,
};
use crate::features::rewards::Bonus;
use crate::storage::KeyValueStore;

/// Application state.
pub struct App {
    /// The session state machine.
    pub controller: FocusSessionController,
    /// Outcome of the most recent settlement.
    pub last_outcome: Option<SettlementOutcome>,
    /// Bonuses unlocked by the most recent settlement.
    pub new_bonuses: Vec<Bonus>,
    /// Status message to display.
    pub status: Option<String>,
    /// Whether the app should quit.
    pub should_quit: bool,
    bell: bool,
    bell_pending: bool,
    store: Box<dyn KeyValueStore>,
}

impl App {
    /// Create a new app around an idle controller.
    ///
    /// `store` holds the bonus tracker.
    #[must_use]
    pub fn new(controller: FocusSessionController, bell: bool, store: Box<dyn KeyValueStore>) -> Self {
        Self {
            controller,
            last_outcome: None,
            new_bonuses: Vec::new(),
            status: Some("Press s to start, q to quit".to_string()),
            should_quit: false,
            bell,
            bell_pending: false,
            store,
        }
    }

    /// Whether the terminal bell should ring now. Clears the request.
    pub fn take_bell(&mut self) -> bool {
        std::mem::take(&mut self.bell_pending)
    }

    /// Apply a key action.
    ///
    /// Rejected operations are shown in the status bar rather than returned.
    pub async fn handle(&mut self, action: Action) {
        match action {
            Action::SelectMode(mode) => self.select_mode(mode),
            Action::Start => match self.controller.start().await {
                Ok(_) => {
                    self.last_outcome = None;
                    self.new_bonuses.clear();
                    self.status = Some(format!(
                        "{} started. x to stop.",
                        self.controller.mode().display_name()
                    ));
                }
                Err(e) => self.status = Some(e.to_string()),
            },
            Action::Stop => match self.controller.stop().await {
                Ok(StopOutcome::Settled(outcome)) => self.finish(outcome),
                Ok(StopOutcome::BonusOffered) => {
                    self.status = Some(format!(
                        "Stopped. Double credits unlock in {BONUS_DELAY_SECS}s, n to skip."
                    ));
                }
                Err(e) => self.status = Some(e.to_string()),
            },
            Action::AcceptBonus => match self.controller.accept_bonus().await {
                Ok(outcome) => self.finish(outcome),
                Err(e) => self.status = Some(e.to_string()),
            },
            Action::SkipBonus => match self.controller.skip_bonus().await {
                Ok(outcome) => self.finish(outcome),
                Err(e) => self.status = Some(e.to_string()),
            },
            Action::Quit => self.quit().await,
        }
    }

    /// Apply a controller event.
    pub fn on_event(&mut self, event: ControllerEvent) {
        match event {
            ControllerEvent::Completed => {
                self.bell_pending = self.bell;
                self.status = Some(format!(
                    "{} complete! Double credits unlock in {BONUS_DELAY_SECS}s, n to skip.",
                    self.controller.mode().display_name()
                ));
            }
            ControllerEvent::BonusReady => {
                self.status = Some("Press b to double your credits, n to skip.".to_string());
            }
            ControllerEvent::Tick { .. } | ControllerEvent::BonusCountdown { .. } => {}
        }
    }

    fn select_mode(&mut self, mode: TimerMode) {
        if self.controller.select_mode(mode) {
            self.status = Some(format!("{} selected", mode.display_name()));
        } else {
            self.status = Some(format!(
                "Cannot change mode while {}",
                self.controller.state()
            ));
        }
    }

    /// Settle whatever is open, then quit.
    async fn quit(&mut self) {
        if self.controller.state() == ControllerState::Running {
            match self.controller.stop().await {
                Ok(StopOutcome::Settled(outcome)) => self.finish(outcome),
                Ok(StopOutcome::BonusOffered) => {}
                Err(e) => warn!(error = %e, "stop on quit failed"),
            }
        }
        if self.controller.state() == ControllerState::Settling {
            match self.controller.skip_bonus().await {
                Ok(outcome) => self.finish(outcome),
                Err(e) => warn!(error = %e, "settle on quit failed"),
            }
        }
        self.should_quit = true;
    }

    fn finish(&mut self, outcome: SettlementOutcome) {
        self.new_bonuses = match record_bonuses(
            self.store.as_mut(),
            &outcome,
            Local::now().date_naive(),
        ) {
            Ok(bonuses) => bonuses,
            Err(e) => {
                warn!(error = %e, "could not update bonus tracker");
                Vec::new()
            }
        };

        self.status = Some(match &outcome {
            SettlementOutcome::Settled(report) => {
                let mut message = format!(
                    "+{} credits, +{} XP",
                    report.result.credits_earned, report.result.xp_earned
                );
                if report.leveled_up {
                    message.push_str(&format!(". Level up! Now level {}", report.result.new_level));
                }
                message
            }
            SettlementOutcome::Failed {
                error, disposition, ..
            } => match disposition {
                FailureDisposition::Queued { .. } => {
                    format!("Settlement failed ({error}), queued for `poncik pending flush`")
                }
                FailureDisposition::Discarded => format!("Settlement failed: {error}"),
            },
        });
        self.last_outcome = Some(outcome);
    }
}
