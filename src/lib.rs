//! poncik - a terminal client for the PoncikFocus study timer
//!
//! This crate runs Pomodoro-style focus sessions against the PoncikFocus
//! backend, settles earned credits and XP, and manages the cosmetic shop
//! and study bonuses kept on the client.

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod features;
pub mod logging;
pub mod output;
pub mod storage;
pub mod tui;

pub use api::{HttpClient, SessionService, UserProfile};
pub use cli::args::{Cli, Commands, OutputFormat};
pub use error::PoncikError;
pub use features::focus::FocusSessionController;
