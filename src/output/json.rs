//! JSON output formatting for poncik.

use serde::Serialize;
use serde_json::json;

use crate::api::{FocusHistoryEntry, LeaderboardEntry};
use crate::error::PoncikError;
use crate::features::focus::{PendingRecord, SettlementOutcome, TimerMode};
use crate::features::inventory::{Inventory, ShopItem};
use crate::features::rewards::{Bonus, BonusTracker};

/// Format timer modes as JSON
///
/// # Errors
///
/// Returns `PoncikError::Parse` if JSON serialization fails.
pub fn format_modes_json(modes: &[TimerMode]) -> Result<String, PoncikError> {
    let items: Vec<_> = modes
        .iter()
        .map(|mode| {
            json!({
                "mode": mode,
                "name": mode.display_name(),
                "duration_minutes": mode.duration_minutes(),
            })
        })
        .collect();
    to_json(&json!({ "count": items.len(), "items": items }))
}

/// Format a settlement as JSON
///
/// # Errors
///
/// Returns `PoncikError::Parse` if JSON serialization fails.
pub fn format_settlement_json(
    outcome: &SettlementOutcome,
    new_bonuses: &[Bonus],
) -> Result<String, PoncikError> {
    to_json(&json!({ "settlement": outcome, "new_bonuses": new_bonuses }))
}

/// Format queued settlements as JSON
///
/// # Errors
///
/// Returns `PoncikError::Parse` if JSON serialization fails.
pub fn format_pending_json(records: &[PendingRecord]) -> Result<String, PoncikError> {
    to_json(&json!({ "count": records.len(), "items": records }))
}

/// Format completed sessions as JSON
///
/// # Errors
///
/// Returns `PoncikError::Parse` if JSON serialization fails.
pub fn format_history_json(entries: &[FocusHistoryEntry]) -> Result<String, PoncikError> {
    let total_minutes: u64 = entries.iter().map(|e| u64::from(e.minutes())).sum();
    to_json(&json!({
        "count": entries.len(),
        "total_minutes": total_minutes,
        "items": entries,
    }))
}

/// Format the leaderboard as JSON
///
/// # Errors
///
/// Returns `PoncikError::Parse` if JSON serialization fails.
pub fn format_leaderboard_json(entries: &[LeaderboardEntry]) -> Result<String, PoncikError> {
    let items: Vec<_> = entries
        .iter()
        .enumerate()
        .map(|(rank, entry)| json!({ "rank": rank + 1, "user": entry }))
        .collect();
    to_json(&json!({ "count": items.len(), "items": items }))
}

/// Format shop items as JSON
///
/// # Errors
///
/// Returns `PoncikError::Parse` if JSON serialization fails.
pub fn format_shop_json(items: &[&ShopItem]) -> Result<String, PoncikError> {
    to_json(&json!({ "count": items.len(), "items": items }))
}

/// Format the inventory as JSON
///
/// # Errors
///
/// Returns `PoncikError::Parse` if JSON serialization fails.
pub fn format_inventory_json(inventory: &Inventory, total_value: i64) -> Result<String, PoncikError> {
    to_json(&json!({ "inventory": inventory, "total_value": total_value }))
}

/// Format bonus counters as JSON
///
/// # Errors
///
/// Returns `PoncikError::Parse` if JSON serialization fails.
pub fn format_bonus_status_json(tracker: &BonusTracker) -> Result<String, PoncikError> {
    to_json(&json!({ "tracker": tracker, "active": tracker.active_bonuses() }))
}

/// Serialize any value as pretty JSON
///
/// # Errors
///
/// Returns `PoncikError::Parse` if JSON serialization fails.
pub fn to_json<T: Serialize>(value: &T) -> Result<String, PoncikError> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, SessionId, SettlementRequest};
    use crate::features::focus::FailureDisposition;
    use crate::features::inventory::filter_shop_items;
    use serde_json::Value;

    #[test]
    fn test_format_modes_json() {
        let value: Value =
            serde_json::from_str(&format_modes_json(&TimerMode::ALL).unwrap()).unwrap();
        assert_eq!(value["count"], 3);
        assert_eq!(value["items"][1]["mode"], "short_break");
        assert_eq!(value["items"][2]["duration_minutes"], 15);
    }

    #[test]
    fn test_format_failed_settlement_json() {
        let outcome = SettlementOutcome::Failed {
            session_id: SessionId::new("focus_1"),
            request: SettlementRequest {
                elapsed_minutes: 1,
                double_credits: true,
            },
            error: ApiError::Unauthorized,
            disposition: FailureDisposition::Discarded,
        };
        let json = format_settlement_json(&outcome, &[Bonus::WeeklyStreak]).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["settlement"]["status"], "failed");
        assert_eq!(value["settlement"]["request"]["actual_minutes"], 1);
        assert_eq!(value["settlement"]["error"]["kind"], "unauthorized");
        assert_eq!(value["new_bonuses"][0], "weekly_streak");
    }

    #[test]
    fn test_format_history_json() {
        let entries: Vec<FocusHistoryEntry> = serde_json::from_value(serde_json::json!([
            {"session_id": "focus_2", "duration_minutes": 25, "actual_minutes": 10,
             "started_at": "2026-10-16T10:00:00+00:00"},
            {"session_id": "focus_1", "duration_minutes": 50,
             "started_at": "2026-10-16T09:00:00+00:00"}
        ]))
        .unwrap();
        let value: Value = serde_json::from_str(&format_history_json(&entries).unwrap()).unwrap();
        assert_eq!(value["count"], 2);
        assert_eq!(value["total_minutes"], 60);
        assert_eq!(value["items"][0]["session_id"], "focus_2");
    }

    #[test]
    fn test_format_leaderboard_json_ranks() {
        let entries: Vec<LeaderboardEntry> = serde_json::from_value(serde_json::json!([
            {"user_id": "user_2", "total_focus_minutes": 3100},
            {"user_id": "user_1", "total_focus_minutes": 95}
        ]))
        .unwrap();
        let value: Value =
            serde_json::from_str(&format_leaderboard_json(&entries).unwrap()).unwrap();
        assert_eq!(value["items"][1]["rank"], 2);
        assert_eq!(value["items"][1]["user"]["user_id"], "user_1");
        assert_eq!(value["items"][0]["user"]["level"], 1);
    }

    #[test]
    fn test_format_shop_json() {
        let themes = filter_shop_items(Some(crate::features::inventory::ItemCategory::Theme), None, None);
        let value: Value = serde_json::from_str(&format_shop_json(&themes).unwrap()).unwrap();
        assert_eq!(value["count"], 3);
        assert_eq!(value["items"][0]["id"], "sakura");
        assert_eq!(value["items"][0]["colors"]["accent"], "#FF69B4");
        assert!(value["items"][0].get("size").is_none());
    }

    #[test]
    fn test_format_bonus_status_json() {
        let mut tracker = BonusTracker::new();
        tracker.track_minutes(240);
        let value: Value =
            serde_json::from_str(&format_bonus_status_json(&tracker).unwrap()).unwrap();
        assert_eq!(value["tracker"]["daily_minutes"], 240);
        assert_eq!(value["active"][0], "continuous_work");
        assert_eq!(value["active"][1], "daily_goal");
    }
}
