//! Tracing subscriber setup.
//!
//! `RUST_LOG` wins when set. Otherwise the level comes from
//! `general.log_level` in the config, raised by each `-v`.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::error::PoncikError;

/// Where log lines go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// Standard error, for CLI commands.
    Stderr,
    /// Append to a file, for the TUI which owns the terminal.
    File(PathBuf),
}

/// Install the global subscriber.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened or a subscriber is
/// already installed.
pub fn init(log_level: &str, verbosity: u8, target: LogTarget) -> Result<(), PoncikError> {
    let filter = build_filter(log_level, verbosity);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let result = match target {
        LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init(),
        LogTarget::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
    };

    result.map_err(|e| PoncikError::Config(format!("Failed to initialize logging: {e}")))
}

fn build_filter(log_level: &str, verbosity: u8) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    EnvFilter::builder()
        .with_default_directive(level_for(log_level, verbosity).into())
        .parse_lossy("")
}

/// The configured level, raised one step per `-v`.
fn level_for(log_level: &str, verbosity: u8) -> LevelFilter {
    let base = log_level.parse::<LevelFilter>().unwrap_or(LevelFilter::WARN);
    let raised = match verbosity {
        0 => base,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    base.max(raised)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_config() {
        assert_eq!(level_for("warn", 0), LevelFilter::WARN);
        assert_eq!(level_for("debug", 0), LevelFilter::DEBUG);
        assert_eq!(level_for("nonsense", 0), LevelFilter::WARN);
    }

    #[test]
    fn test_verbosity_raises_level() {
        assert_eq!(level_for("warn", 1), LevelFilter::INFO);
        assert_eq!(level_for("warn", 2), LevelFilter::DEBUG);
        assert_eq!(level_for("warn", 5), LevelFilter::TRACE);
        // Never lowers a more verbose config
        assert_eq!(level_for("trace", 1), LevelFilter::TRACE);
    }
}
