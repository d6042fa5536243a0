//! Command implementations for poncik.
//!
//! Each command returns the text to print; `main` owns stdout.

mod bonus;
mod completions;
mod config;
mod focus;
mod leaderboard;
mod pending;
mod profile;
mod shop;

pub use bonus::bonus;
pub use completions::completions;
pub use config::config;
pub use focus::{build_controller, focus, record_bonuses, run_headless};
pub use leaderboard::leaderboard;
pub use pending::pending;
pub use profile::profile;
pub use shop::shop;
