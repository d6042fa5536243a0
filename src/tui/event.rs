//! Keyboard input for the TUI.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::features::focus::TimerMode;

/// Action to take after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Switch timer mode.
    SelectMode(TimerMode),
    /// Start a session.
    Start,
    /// Stop the running session.
    Stop,
    /// Accept double credits.
    AcceptBonus,
    /// Settle without the bonus.
    SkipBonus,
    /// Leave, settling any open session first.
    Quit,
}

/// Map a key press to an action.
#[must_use]
pub fn action_for(key: KeyEvent) -> Option<Action> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }

    match key.code {
        KeyCode::Char('1') => Some(Action::SelectMode(TimerMode::Focus)),
        KeyCode::Char('2') => Some(Action::SelectMode(TimerMode::ShortBreak)),
        KeyCode::Char('3') => Some(Action::SelectMode(TimerMode::LongBreak)),
        KeyCode::Char('s') | KeyCode::Enter => Some(Action::Start),
        KeyCode::Char('x') => Some(Action::Stop),
        KeyCode::Char('b') => Some(Action::AcceptBonus),
        KeyCode::Char('n') => Some(Action::SkipBonus),
        KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
        _ => None,
    }
}

/// Read key presses on a blocking thread and forward them.
///
/// The reader exits when `stop` is set or the receiver is dropped.
pub fn spawn_key_reader(tx: UnboundedSender<KeyEvent>, stop: Arc<AtomicBool>) -> JoinHandle<()> {
    tokio::task::spawn_blocking(move || {
        while !stop.load(Ordering::Relaxed) {
            match event::poll(Duration::from_millis(100)) {
                Ok(false) => {}
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) => {
                        if tx.send(key).is_err() {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!(error = %e, "terminal read failed");
                        break;
                    }
                },
                Err(e) => {
                    warn!(error = %e, "terminal poll failed");
                    break;
                }
            }
        }
    })
}
