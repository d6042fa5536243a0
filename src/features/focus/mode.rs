//! Timer modes and their fixed durations.

use serde::{Deserialize, Serialize};

/// Timer mode selected before a session starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerMode {
    /// Focus interval (25 minutes)
    #[default]
    Focus,
    /// Short break (5 minutes)
    ShortBreak,
    /// Long break (15 minutes)
    LongBreak,
}

impl TimerMode {
    /// Every mode, in display order.
    pub const ALL: [Self; 3] = [Self::Focus, Self::ShortBreak, Self::LongBreak];

    /// Nominal duration in minutes.
    #[must_use]
    pub const fn duration_minutes(self) -> u32 {
        match self {
            Self::Focus => 25,
            Self::ShortBreak => 5,
            Self::LongBreak => 15,
        }
    }

    /// Nominal duration in seconds.
    #[must_use]
    pub const fn duration_secs(self) -> u32 {
        self.duration_minutes() * 60
    }

    /// Parse a mode from user input.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "focus" | "f" | "pomodoro" | "pomo" => Some(Self::Focus),
            "short" | "short-break" | "short_break" | "sb" => Some(Self::ShortBreak),
            "long" | "long-break" | "long_break" | "lb" => Some(Self::LongBreak),
            _ => None,
        }
    }

    /// Stable identifier, matching the serde name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Focus => "focus",
            Self::ShortBreak => "short_break",
            Self::LongBreak => "long_break",
        }
    }

    /// Get display name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Focus => "Focus",
            Self::ShortBreak => "Short Break",
            Self::LongBreak => "Long Break",
        }
    }

    /// Check if this is a break mode.
    #[must_use]
    pub const fn is_break(self) -> bool {
        matches!(self, Self::ShortBreak | Self::LongBreak)
    }
}

impl std::fmt::Display for TimerMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_durations() {
        assert_eq!(TimerMode::Focus.duration_minutes(), 25);
        assert_eq!(TimerMode::ShortBreak.duration_minutes(), 5);
        assert_eq!(TimerMode::LongBreak.duration_minutes(), 15);
        assert_eq!(TimerMode::Focus.duration_secs(), 1500);
    }

    #[test]
    fn test_parse() {
        assert_eq!(TimerMode::parse("focus"), Some(TimerMode::Focus));
        assert_eq!(TimerMode::parse("Pomo"), Some(TimerMode::Focus));
        assert_eq!(TimerMode::parse("short-break"), Some(TimerMode::ShortBreak));
        assert_eq!(TimerMode::parse("lb"), Some(TimerMode::LongBreak));
        assert_eq!(TimerMode::parse("nap"), None);
    }

    #[test]
    fn test_is_break() {
        assert!(!TimerMode::Focus.is_break());
        assert!(TimerMode::ShortBreak.is_break());
        assert!(TimerMode::LongBreak.is_break());
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&TimerMode::ShortBreak).unwrap(), r#""short_break""#);
        let mode: TimerMode = serde_json::from_str(r#""long_break""#).unwrap();
        assert_eq!(mode, TimerMode::LongBreak);
    }
}
