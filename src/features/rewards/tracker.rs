//! Continuous-work, daily-goal and streak bonuses.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PoncikError;
use crate::features::focus::TimerMode;
use crate::storage::KeyValueStore;

/// Key the tracker is stored under.
pub const TRACKER_KEY: &str = "bonus_tracker";

const CONTINUOUS_WORK_MINUTES: u32 = 120;
const DAILY_GOAL_MINUTES: u32 = 240;
const WEEKLY_STREAK_DAYS: u32 = 7;

/// A bonus the user currently qualifies for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Bonus {
    /// Two hours without a break: +20% on minute credits.
    ContinuousWork,
    /// Four hours today: +500 credits.
    DailyGoal,
    /// Seven study days in a row: +1000 credits.
    WeeklyStreak,
}

impl Bonus {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ContinuousWork => "Continuous Work",
            Self::DailyGoal => "Daily Goal",
            Self::WeeklyStreak => "Weekly Streak",
        }
    }

    #[must_use]
    pub const fn emoji(self) -> &'static str {
        match self {
            Self::ContinuousWork => "🔥",
            Self::DailyGoal => "🎯",
            Self::WeeklyStreak => "⚡",
        }
    }

    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ContinuousWork => "2 hours of continuous work! +20% bonus!",
            Self::DailyGoal => "4 hours completed! +500 credits bonus!",
            Self::WeeklyStreak => "7 day streak! +1000 credits bonus!",
        }
    }

    /// Factor applied to per-minute credits.
    #[must_use]
    pub const fn multiplier(self) -> Option<f64> {
        match self {
            Self::ContinuousWork => Some(1.20),
            Self::DailyGoal | Self::WeeklyStreak => None,
        }
    }

    /// One-off credits.
    #[must_use]
    pub const fn credits(self) -> i64 {
        match self {
            Self::ContinuousWork => 0,
            Self::DailyGoal => 500,
            Self::WeeklyStreak => 1000,
        }
    }
}

/// Per-user study counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BonusTracker {
    pub session_start: Option<DateTime<Utc>>,
    pub last_break: Option<DateTime<Utc>>,
    pub continuous_minutes: u32,
    pub daily_minutes: u32,
    pub streak_days: u32,
    pub last_study_date: Option<NaiveDate>,
}

impl BonusTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the saved tracker, or a fresh one if none is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or the saved value is not valid JSON.
    pub fn load(store: &dyn KeyValueStore) -> Result<Self, PoncikError> {
        match store.get(TRACKER_KEY)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Self::new()),
        }
    }

    /// Persist the tracker.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), PoncikError> {
        store.set(TRACKER_KEY, &serde_json::to_string(self)?)
    }

    /// Mark the start of a work session.
    pub fn start_session(&mut self) {
        self.session_start = Some(Utc::now());
        self.last_break = None;
    }

    /// Record a break; continuous work starts over.
    pub fn take_break(&mut self) {
        self.last_break = Some(Utc::now());
        self.continuous_minutes = 0;
    }

    /// Add worked minutes and return every bonus now active.
    pub fn track_minutes(&mut self, minutes: u32) -> Vec<Bonus> {
        self.continuous_minutes = self.continuous_minutes.saturating_add(minutes);
        self.daily_minutes = self.daily_minutes.saturating_add(minutes);
        self.active_bonuses()
    }

    /// Bonuses the current counters qualify for.
    #[must_use]
    pub fn active_bonuses(&self) -> Vec<Bonus> {
        let mut bonuses = Vec::new();
        if self.continuous_minutes >= CONTINUOUS_WORK_MINUTES {
            bonuses.push(Bonus::ContinuousWork);
        }
        if self.daily_minutes >= DAILY_GOAL_MINUTES {
            bonuses.push(Bonus::DailyGoal);
        }
        if self.streak_days >= WEEKLY_STREAK_DAYS {
            bonuses.push(Bonus::WeeklyStreak);
        }
        bonuses
    }

    /// Roll the streak forward to `today` and return the streak length.
    ///
    /// Studying yesterday extends the streak, a gap resets it to zero.
    /// Daily minutes reset whenever the day changes.
    pub fn check_daily_streak(&mut self, today: NaiveDate) -> u32 {
        match self.last_study_date {
            Some(last) if last == today => return self.streak_days,
            Some(last) if Some(last) == today.pred_opt() => self.streak_days += 1,
            Some(_) => self.streak_days = 0,
            None => {}
        }

        self.last_study_date = Some(today);
        self.daily_minutes = 0;
        self.streak_days
    }

    /// Record a settled session and return the bonuses it newly unlocked.
    ///
    /// Focus minutes count toward every bonus; a break resets continuous work.
    pub fn record_session(&mut self, mode: TimerMode, minutes: u32, today: NaiveDate) -> Vec<Bonus> {
        self.check_daily_streak(today);
        let before = self.active_bonuses();
        if mode.is_break() {
            self.take_break();
            return Vec::new();
        }
        if self.session_start.is_none() || self.last_break.is_some() {
            self.start_session();
        }
        self.track_minutes(minutes)
            .into_iter()
            .filter(|bonus| !before.contains(bonus))
            .collect()
    }
}

/// Per-minute credits after multiplier bonuses, rounded down.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn calculate_minute_credits(base: i64, bonuses: &[Bonus]) -> i64 {
    let factor: f64 = bonuses.iter().filter_map(|b| b.multiplier()).product();
    (base as f64 * factor).floor() as i64
}

/// Sum of one-off bonus credits.
#[must_use]
pub fn calculate_bonus_credits(bonuses: &[Bonus]) -> i64 {
    bonuses.iter().map(|b| b.credits()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    #[test]
    fn test_continuous_work_bonus() {
        let mut tracker = BonusTracker::new();
        assert!(tracker.track_minutes(119).is_empty());
        assert_eq!(tracker.track_minutes(1), vec![Bonus::ContinuousWork]);

        tracker.take_break();
        assert_eq!(tracker.continuous_minutes, 0);
        assert!(tracker.active_bonuses().is_empty());
    }

    #[test]
    fn test_daily_goal_survives_breaks() {
        let mut tracker = BonusTracker::new();
        for _ in 0..4 {
            tracker.track_minutes(60);
            tracker.take_break();
        }
        assert_eq!(tracker.daily_minutes, 240);
        assert_eq!(tracker.active_bonuses(), vec![Bonus::DailyGoal]);
    }

    #[test]
    fn test_streak_extends_and_breaks() {
        let mut tracker = BonusTracker::new();
        assert_eq!(tracker.check_daily_streak(day(1)), 0);
        assert_eq!(tracker.check_daily_streak(day(2)), 1);
        assert_eq!(tracker.check_daily_streak(day(2)), 1);
        assert_eq!(tracker.check_daily_streak(day(3)), 2);
        assert_eq!(tracker.check_daily_streak(day(6)), 0);
    }

    #[test]
    fn test_day_change_resets_daily_minutes() {
        let mut tracker = BonusTracker::new();
        tracker.check_daily_streak(day(1));
        tracker.track_minutes(50);

        tracker.check_daily_streak(day(1));
        assert_eq!(tracker.daily_minutes, 50);

        tracker.check_daily_streak(day(2));
        assert_eq!(tracker.daily_minutes, 0);
    }

    #[test]
    fn test_weekly_streak_bonus() {
        let mut tracker = BonusTracker::new();
        for d in 1..=8 {
            tracker.check_daily_streak(day(d));
        }
        assert_eq!(tracker.streak_days, 7);
        assert_eq!(tracker.active_bonuses(), vec![Bonus::WeeklyStreak]);
    }

    #[test]
    fn test_record_session_reports_new_bonuses_once() {
        let mut tracker = BonusTracker::new();
        for _ in 0..4 {
            assert!(tracker.record_session(TimerMode::Focus, 25, day(10)).is_empty());
        }
        assert_eq!(
            tracker.record_session(TimerMode::Focus, 25, day(10)),
            vec![Bonus::ContinuousWork]
        );
        assert!(tracker.record_session(TimerMode::Focus, 25, day(10)).is_empty());
        assert_eq!(tracker.daily_minutes, 150);
    }

    #[test]
    fn test_daily_goal_unlocks_again_next_day() {
        let mut tracker = BonusTracker::new();
        let first = tracker.record_session(TimerMode::Focus, 240, day(10));
        assert!(first.contains(&Bonus::DailyGoal));

        let second = tracker.record_session(TimerMode::Focus, 240, day(11));
        assert!(second.contains(&Bonus::DailyGoal));
        assert_eq!(tracker.daily_minutes, 240);
        assert_eq!(tracker.streak_days, 1);
    }

    #[test]
    fn test_record_break_session() {
        let mut tracker = BonusTracker::new();
        tracker.record_session(TimerMode::Focus, 130, day(10));
        assert!(tracker
            .record_session(TimerMode::ShortBreak, 5, day(10))
            .is_empty());
        assert_eq!(tracker.continuous_minutes, 0);
        assert_eq!(tracker.daily_minutes, 130);
        assert!(tracker.last_break.is_some());

        tracker.record_session(TimerMode::Focus, 25, day(10));
        assert!(tracker.last_break.is_none());
        assert_eq!(tracker.continuous_minutes, 25);
    }

    #[test]
    fn test_credit_helpers() {
        assert_eq!(calculate_minute_credits(10, &[]), 10);
        assert_eq!(calculate_minute_credits(10, &[Bonus::ContinuousWork]), 12);
        assert_eq!(calculate_minute_credits(7, &[Bonus::ContinuousWork, Bonus::DailyGoal]), 8);

        let all = [Bonus::ContinuousWork, Bonus::DailyGoal, Bonus::WeeklyStreak];
        assert_eq!(calculate_bonus_credits(&all), 1500);
        assert_eq!(calculate_bonus_credits(&[]), 0);
    }

    #[test]
    fn test_save_and_load() {
        let mut store = MemoryStore::new();
        assert_eq!(BonusTracker::load(&store).unwrap(), BonusTracker::new());

        let mut tracker = BonusTracker::new();
        tracker.check_daily_streak(day(4));
        tracker.track_minutes(30);
        tracker.save(&mut store).unwrap();

        let loaded = BonusTracker::load(&store).unwrap();
        assert_eq!(loaded, tracker);
        assert_eq!(loaded.last_study_date, Some(day(4)));
    }

    #[test]
    fn test_load_rejects_corrupt_value() {
        let mut store = MemoryStore::new();
        store.set(TRACKER_KEY, "not json").unwrap();
        assert!(matches!(BonusTracker::load(&store), Err(PoncikError::Parse(_))));
    }
}
