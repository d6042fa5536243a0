//! Focus session commands.
//!
//! `focus run` drives a [`FocusSessionController`] either through the TUI or
//! headless on stderr. `focus history` lists what the backend has settled.

use std::future::Future;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use colored::Colorize;
use tracing::{info, warn};

use crate::api::{HttpClient, UserProfile};
use crate::cli::args::{FocusCommands, OutputFormat};
use crate::config::Config;
use crate::error::PoncikError;
use crate::features::focus::{
    policy_from_config, render_progress_bar, ControllerEvent, FocusSessionController,
    SettlementOutcome, StopOutcome, TimerMode, BONUS_DELAY_SECS,
};
use crate::features::rewards::{Bonus, BonusTracker};
use crate::output::{format_history, format_modes, format_settlement};
use crate::storage::{KeyValueStore, SqliteStore};

/// Execute focus subcommands.
///
/// # Errors
///
/// Returns an error if the backend refuses to start a session, local storage
/// fails, or the terminal cannot be set up.
pub async fn focus(
    config: &Config,
    cmd: FocusCommands,
    format: OutputFormat,
) -> Result<String, PoncikError> {
    match cmd {
        FocusCommands::Modes => format_modes(&TimerMode::ALL, format),

        FocusCommands::History { limit } => {
            let client = HttpClient::new(&config.api)?;
            let mut history = client.focus_history().await?;
            history.truncate(limit);
            format_history(&history, format)
        }

        FocusCommands::Run {
            mode,
            headless,
            accept_bonus,
        } => {
            let mode = mode.unwrap_or(config.focus.default_mode);
            let mut controller = build_controller(config, mode).await?;

            if !headless {
                crate::tui::run(controller, config.focus.bell).await?;
                return Ok(String::new());
            }

            let outcome = run_headless(
                &mut controller,
                accept_bonus,
                config.focus.bell,
                tokio::signal::ctrl_c,
            )
            .await?;
            let mut store = SqliteStore::new()?;
            let bonuses = record_bonuses(&mut store, &outcome, Local::now().date_naive())?;
            format_settlement(&outcome, &bonuses, format)
        }
    }
}

/// Wire a controller to the HTTP backend using the loaded config.
///
/// The initial profile fetch is best effort; without it level-ups are
/// measured from level 1.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built or the pending
/// settlement database cannot be opened.
pub async fn build_controller(
    config: &Config,
    mode: TimerMode,
) -> Result<FocusSessionController, PoncikError> {
    let client = Arc::new(HttpClient::new(&config.api)?);
    let policy = policy_from_config(&config.settlement)?;

    let controller = FocusSessionController::new(client.clone())
        .with_profile(client.clone())
        .with_policy(policy)
        .with_mode(mode);

    match client.refresh().await {
        Ok(user) => Ok(controller.with_user(user)),
        Err(e) => {
            warn!(error = %e, "could not load profile");
            Ok(controller)
        }
    }
}

/// Run one session to settlement, printing progress to stderr.
///
/// `interrupt` is called once per phase for a future that resolves on the
/// next Ctrl-C. The session ends when the countdown completes or the first
/// interrupt resolves. A bonus offer is skipped unless `accept_bonus` is set,
/// in which case the gate is waited out and double credits are claimed; an
/// interrupt during that wait skips the bonus instead.
///
/// # Errors
///
/// Returns an error if the session cannot be started or the interrupt
/// source fails.
pub async fn run_headless<I, F>(
    controller: &mut FocusSessionController,
    accept_bonus: bool,
    bell: bool,
    mut interrupt: I,
) -> Result<SettlementOutcome, PoncikError>
where
    I: FnMut() -> F,
    F: Future<Output = std::io::Result<()>>,
{
    controller.start().await?;
    let mode = controller.mode();
    eprintln!(
        "{} {} started ({} min). Press Ctrl-C to stop.",
        "▶".green(),
        mode.display_name().bold(),
        mode.duration_minutes()
    );

    let stop = interrupt();
    tokio::pin!(stop);
    loop {
        tokio::select! {
            event = controller.next_event() => match event {
                ControllerEvent::Tick { .. } => print_progress(controller),
                ControllerEvent::Completed => {
                    eprintln!();
                    if bell {
                        eprint!("\x07");
                    }
                    eprintln!("{} {} complete", "✓".green(), mode.display_name());
                    break;
                }
                ControllerEvent::BonusCountdown { .. } | ControllerEvent::BonusReady => {}
            },
            result = &mut stop => {
                result?;
                eprintln!();
                info!("interrupted, stopping session");
                match controller.stop().await? {
                    StopOutcome::Settled(outcome) => return Ok(outcome),
                    StopOutcome::BonusOffered => break,
                }
            }
        }
    }

    if !accept_bonus {
        return Ok(controller.skip_bonus().await?);
    }

    eprintln!("Unlocking double credits in {BONUS_DELAY_SECS}s... Ctrl-C to skip.");
    let skip = interrupt();
    tokio::pin!(skip);
    loop {
        tokio::select! {
            event = controller.next_event() => match event {
                ControllerEvent::BonusReady => return Ok(controller.accept_bonus().await?),
                ControllerEvent::BonusCountdown { remaining_secs } => {
                    eprint!("\r  {remaining_secs}s ");
                }
                ControllerEvent::Tick { .. } | ControllerEvent::Completed => {}
            },
            result = &mut skip => {
                result?;
                eprintln!();
                info!("interrupted during bonus wait, skipping bonus");
                return Ok(controller.skip_bonus().await?);
            }
        }
    }
}

fn print_progress(controller: &FocusSessionController) {
    let countdown = controller.countdown();
    eprint!(
        "\r{} {} ",
        countdown.format_remaining().bold(),
        render_progress_bar(countdown.progress(), 30)
    );
}

/// Feed a settled session into the bonus tracker.
///
/// Returns bonuses that became active with this session. Failed settlements
/// are not counted.
///
/// # Errors
///
/// Returns an error if the tracker cannot be loaded or saved.
pub fn record_bonuses(
    store: &mut dyn KeyValueStore,
    outcome: &SettlementOutcome,
    today: NaiveDate,
) -> Result<Vec<Bonus>, PoncikError> {
    let SettlementOutcome::Settled(report) = outcome else {
        return Ok(Vec::new());
    };

    let mut tracker = BonusTracker::load(store)?;
    let bonuses = tracker.record_session(report.mode, report.request.elapsed_minutes, today);
    tracker.save(store)?;
    Ok(bonuses)
}
