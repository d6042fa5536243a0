//! Study bonuses tracked on the client.
//!
//! The backend stays authoritative for credits; these bonuses are shown to
//! the user as progress toward rewards.

mod tracker;

pub use tracker::{calculate_bonus_credits, calculate_minute_credits, Bonus, BonusTracker, TRACKER_KEY};
