//! Countdown arithmetic, the one-second tick source, and time formatting.

use std::time::Duration;

use tokio::time::{self, Instant, Interval, MissedTickBehavior};

/// A countdown in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    /// Total duration in seconds
    total_seconds: u32,
    /// Remaining seconds
    remaining_seconds: u32,
}

impl Countdown {
    /// Create a countdown of `seconds`.
    #[must_use]
    pub const fn new(seconds: u32) -> Self {
        Self {
            total_seconds: seconds,
            remaining_seconds: seconds,
        }
    }

    /// Decrement by one second.
    ///
    /// Returns true once the countdown is at zero.
    pub fn tick(&mut self) -> bool {
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        self.remaining_seconds == 0
    }

    /// Restart from `seconds`.
    pub fn reset(&mut self, seconds: u32) {
        *self = Self::new(seconds);
    }

    /// Remaining seconds.
    #[must_use]
    pub const fn remaining_secs(&self) -> u32 {
        self.remaining_seconds
    }

    /// Get progress as a fraction (0.0 - 1.0).
    #[must_use]
    pub fn progress(&self) -> f64 {
        if self.total_seconds == 0 {
            return 1.0;
        }
        1.0 - f64::from(self.remaining_seconds) / f64::from(self.total_seconds)
    }

    /// Format remaining time as MM:SS.
    #[must_use]
    pub fn format_remaining(&self) -> String {
        format_secs_mmss(u64::from(self.remaining_seconds))
    }
}

/// Repeating tick source owned by whoever is counting.
///
/// Dropping the ticker cancels it; there is no separate stop call.
#[derive(Debug)]
pub struct Ticker {
    interval: Interval,
}

impl Ticker {
    /// Tick every `period`, first tick one period from now.
    #[must_use]
    pub fn every(period: Duration) -> Self {
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Burst);
        Self { interval }
    }

    /// Tick once per second.
    #[must_use]
    pub fn every_second() -> Self {
        Self::every(Duration::from_secs(1))
    }

    /// Wait for the next tick. Cancel safe.
    pub async fn tick(&mut self) {
        self.interval.tick().await;
    }
}

/// Format seconds as MM:SS.
#[must_use]
pub fn format_secs_mmss(total_seconds: u64) -> String {
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{minutes:02}:{seconds:02}")
}

/// Format a duration as a human-readable string.
#[must_use]
pub fn format_duration(d: Duration) -> String {
    let total_minutes = d.as_secs() / 60;

    if total_minutes < 1 {
        let seconds = d.as_secs();
        return format!("{} second{}", seconds, if seconds == 1 { "" } else { "s" });
    }

    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    if hours > 0 {
        if minutes > 0 {
            format!(
                "{} hour{}, {} minute{}",
                hours,
                if hours == 1 { "" } else { "s" },
                minutes,
                if minutes == 1 { "" } else { "s" }
            )
        } else {
            format!("{} hour{}", hours, if hours == 1 { "" } else { "s" })
        }
    } else {
        format!("{} minute{}", minutes, if minutes == 1 { "" } else { "s" })
    }
}

/// Render a progress bar.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn render_progress_bar(progress: f64, width: usize) -> String {
    let filled = ((progress.clamp(0.0, 1.0)) * width as f64) as usize;
    let empty = width.saturating_sub(filled);

    format!("[{}{}]", "█".repeat(filled), "░".repeat(empty))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_countdown_new() {
        let countdown = Countdown::new(1500);
        assert_eq!(countdown.remaining_secs(), 1500);
        assert_eq!(countdown.progress(), 0.0);
        assert_eq!(countdown.format_remaining(), "25:00");
    }

    #[test]
    fn test_countdown_tick() {
        let mut countdown = Countdown::new(60);

        for _ in 0..59 {
            assert!(!countdown.tick());
        }

        assert!(countdown.tick());
        assert_eq!(countdown.remaining_secs(), 0);
        assert!(countdown.tick());
        assert_eq!(countdown.remaining_secs(), 0);
    }

    #[test]
    fn test_countdown_progress_and_reset() {
        let mut countdown = Countdown::new(100);
        assert_eq!(countdown.progress(), 0.0);

        for _ in 0..50 {
            countdown.tick();
        }
        assert!((countdown.progress() - 0.5).abs() < 0.01);

        countdown.reset(300);
        assert_eq!(countdown.remaining_secs(), 300);
        assert_eq!(countdown.progress(), 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_fires_once_per_period() {
        let start = Instant::now();
        let mut ticker = Ticker::every_second();

        ticker.tick().await;
        assert_eq!(start.elapsed(), Duration::from_secs(1));

        ticker.tick().await;
        ticker.tick().await;
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(25 * 60)), "25 minutes");
        assert_eq!(format_duration(Duration::from_secs(60)), "1 minute");
        assert_eq!(format_duration(Duration::from_secs(7200)), "2 hours");
        assert_eq!(format_duration(Duration::from_secs(90 * 60)), "1 hour, 30 minutes");
        assert_eq!(format_duration(Duration::from_secs(45)), "45 seconds");
    }

    #[test]
    fn test_format_secs_mmss() {
        assert_eq!(format_secs_mmss(1500), "25:00");
        assert_eq!(format_secs_mmss(90), "01:30");
        assert_eq!(format_secs_mmss(0), "00:00");
    }

    #[test]
    fn test_render_progress_bar() {
        let bar = render_progress_bar(0.5, 10);
        assert!(bar.contains("█████"));
        assert!(bar.contains("░░░░░"));
        assert_eq!(render_progress_bar(2.0, 4), "[████]");
    }
}
