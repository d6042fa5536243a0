//! Terminal User Interface (TUI) for poncik.
//!
//! One screen: mode selector, countdown, progress and rewards. Built with
//! ratatui and crossterm. Key presses arrive on a channel from a blocking
//! reader; ticks come from the controller.

mod app;
mod event;
mod ui;

pub use app::App;
pub use event::Action;

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossterm::{
    event::KeyEvent,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use tokio::sync::mpsc::{self, UnboundedReceiver};

use crate::error::PoncikError;
use crate::features::focus::FocusSessionController;
use crate::storage::SqliteStore;

/// Run the TUI until the user quits.
///
/// An open session is settled before returning.
///
/// # Errors
///
/// Returns an error if the terminal cannot be set up or drawn, or the bonus
/// store cannot be opened.
pub async fn run(controller: FocusSessionController, bell: bool) -> Result<(), PoncikError> {
    let store = SqliteStore::new()?;
    let mut app = App::new(controller, bell, Box::new(store));

    enable_raw_mode().map_err(|e| PoncikError::Terminal(format!("Failed to enable raw mode: {e}")))?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)
        .map_err(|e| PoncikError::Terminal(format!("Failed to setup terminal: {e}")))?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)
        .map_err(|e| PoncikError::Terminal(format!("Failed to create terminal: {e}")))?;

    let (tx, mut keys) = mpsc::unbounded_channel();
    let stop = Arc::new(AtomicBool::new(false));
    let reader = event::spawn_key_reader(tx, Arc::clone(&stop));

    let result = run_app(&mut terminal, &mut app, &mut keys).await;

    stop.store(true, Ordering::Relaxed);
    reader.await.ok();

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    result
}

/// Run the main application loop.
async fn run_app<B: Backend + Write>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    keys: &mut UnboundedReceiver<KeyEvent>,
) -> Result<(), PoncikError> {
    loop {
        terminal
            .draw(|frame| ui::render(frame, app))
            .map_err(|e| PoncikError::Terminal(format!("Failed to draw: {e}")))?;

        if app.take_bell() {
            let backend = terminal.backend_mut();
            backend.write_all(b"\x07").ok();
            Write::flush(backend).ok();
        }

        if app.should_quit {
            break;
        }

        tokio::select! {
            key = keys.recv() => match key {
                Some(key) => {
                    if let Some(action) = event::action_for(key) {
                        app.handle(action).await;
                    }
                }
                None => app.handle(Action::Quit).await,
            },
            event = app.controller.next_event() => app.on_event(event),
        }
    }

    Ok(())
}
