//! Output formatting for poncik.
//!
//! Every command result can be rendered as colored text or as JSON.

mod json;
mod pretty;

use crate::api::{FocusHistoryEntry, LeaderboardEntry, UserState};
use crate::cli::args::OutputFormat;
use crate::error::PoncikError;
use crate::features::focus::{FlushReport, PendingRecord, SettlementOutcome, TimerMode};
use crate::features::inventory::{Inventory, Purchase, ShopItem};
use crate::features::rewards::{Bonus, BonusTracker};

pub use json::*;
pub use pretty::*;

/// Format timer modes based on output format
///
/// # Errors
///
/// Returns `PoncikError::Parse` if JSON serialization fails.
pub fn format_modes(modes: &[TimerMode], format: OutputFormat) -> Result<String, PoncikError> {
    match format {
        OutputFormat::Pretty => Ok(format_modes_pretty(modes)),
        OutputFormat::Json => format_modes_json(modes),
    }
}

/// Format a settlement based on output format
///
/// # Errors
///
/// Returns `PoncikError::Parse` if JSON serialization fails.
pub fn format_settlement(
    outcome: &SettlementOutcome,
    new_bonuses: &[Bonus],
    format: OutputFormat,
) -> Result<String, PoncikError> {
    match format {
        OutputFormat::Pretty => Ok(format_settlement_pretty(outcome, new_bonuses)),
        OutputFormat::Json => format_settlement_json(outcome, new_bonuses),
    }
}

/// Format queued settlements based on output format
///
/// # Errors
///
/// Returns `PoncikError::Parse` if JSON serialization fails.
pub fn format_pending(records: &[PendingRecord], format: OutputFormat) -> Result<String, PoncikError> {
    match format {
        OutputFormat::Pretty => Ok(format_pending_pretty(records)),
        OutputFormat::Json => format_pending_json(records),
    }
}

/// Format a flush report based on output format
///
/// # Errors
///
/// Returns `PoncikError::Parse` if JSON serialization fails.
pub fn format_flush(report: &FlushReport, format: OutputFormat) -> Result<String, PoncikError> {
    match format {
        OutputFormat::Pretty => Ok(format_flush_pretty(report)),
        OutputFormat::Json => to_json(report),
    }
}

/// Format the user profile based on output format
///
/// # Errors
///
/// Returns `PoncikError::Parse` if JSON serialization fails.
pub fn format_profile(user: &UserState, format: OutputFormat) -> Result<String, PoncikError> {
    match format {
        OutputFormat::Pretty => Ok(format_profile_pretty(user)),
        OutputFormat::Json => to_json(user),
    }
}

/// Format completed sessions based on output format
///
/// # Errors
///
/// Returns `PoncikError::Parse` if JSON serialization fails.
pub fn format_history(
    entries: &[FocusHistoryEntry],
    format: OutputFormat,
) -> Result<String, PoncikError> {
    match format {
        OutputFormat::Pretty => Ok(format_history_pretty(entries)),
        OutputFormat::Json => format_history_json(entries),
    }
}

/// Format the leaderboard based on output format
///
/// # Errors
///
/// Returns `PoncikError::Parse` if JSON serialization fails.
pub fn format_leaderboard(
    entries: &[LeaderboardEntry],
    format: OutputFormat,
) -> Result<String, PoncikError> {
    match format {
        OutputFormat::Pretty => Ok(format_leaderboard_pretty(entries)),
        OutputFormat::Json => format_leaderboard_json(entries),
    }
}

/// Format shop items based on output format
///
/// # Errors
///
/// Returns `PoncikError::Parse` if JSON serialization fails.
pub fn format_shop(items: &[&ShopItem], format: OutputFormat) -> Result<String, PoncikError> {
    match format {
        OutputFormat::Pretty => Ok(format_shop_pretty(items)),
        OutputFormat::Json => format_shop_json(items),
    }
}

/// Format a purchase based on output format
///
/// # Errors
///
/// Returns `PoncikError::Parse` if JSON serialization fails.
pub fn format_purchase(purchase: &Purchase, format: OutputFormat) -> Result<String, PoncikError> {
    match format {
        OutputFormat::Pretty => Ok(format_purchase_pretty(purchase)),
        OutputFormat::Json => to_json(purchase),
    }
}

/// Format an equipped item based on output format
///
/// # Errors
///
/// Returns `PoncikError::Parse` if JSON serialization fails.
pub fn format_equip(item: &ShopItem, format: OutputFormat) -> Result<String, PoncikError> {
    match format {
        OutputFormat::Pretty => Ok(format_equip_pretty(item)),
        OutputFormat::Json => to_json(item),
    }
}

/// Format the inventory based on output format
///
/// # Errors
///
/// Returns `PoncikError::Parse` if JSON serialization fails.
pub fn format_inventory(
    inventory: &Inventory,
    total_value: i64,
    format: OutputFormat,
) -> Result<String, PoncikError> {
    match format {
        OutputFormat::Pretty => Ok(format_inventory_pretty(inventory, total_value)),
        OutputFormat::Json => format_inventory_json(inventory, total_value),
    }
}

/// Format bonus counters based on output format
///
/// # Errors
///
/// Returns `PoncikError::Parse` if JSON serialization fails.
pub fn format_bonus_status(tracker: &BonusTracker, format: OutputFormat) -> Result<String, PoncikError> {
    match format {
        OutputFormat::Pretty => Ok(format_bonus_status_pretty(tracker)),
        OutputFormat::Json => format_bonus_status_json(tracker),
    }
}
