use std::time::Duration;

use chrono::{DateTime, Local};
use colored::Colorize;

use crate::api::{FocusHistoryEntry, LeaderboardEntry, UserState};
use crate::features::focus::{
    format_duration, format_secs_mmss, FailureDisposition, FlushReport, PendingRecord,
    SettlementOutcome, TimerMode,
};
use crate::features::inventory::{Inventory, ItemCategory, Purchase, Rarity, ShopItem};
use crate::features::rewards::{Bonus, BonusTracker};

/// Format the timer modes.
pub fn format_modes_pretty(modes: &[TimerMode]) -> String {
    let mut output = format!("Timer modes ({})\n", modes.len());
    output.push_str(&"─".repeat(40));
    output.push('\n');

    for mode in modes {
        let duration = format_secs_mmss(u64::from(mode.duration_secs()));
        output.push_str(&format!(
            "  {:<12} {}  {}\n",
            mode.display_name().bold(),
            duration.cyan(),
            mode.as_str().dimmed()
        ));
    }

    output
}

/// Format a settlement and any bonuses it unlocked.
pub fn format_settlement_pretty(outcome: &SettlementOutcome, new_bonuses: &[Bonus]) -> String {
    let mut output = Vec::new();

    match outcome {
        SettlementOutcome::Settled(report) => {
            let title = format!("✅ {} session settled", report.mode.display_name());
            output.push(title.green().bold().to_string());

            let bonus = if report.request.double_credits {
                format!("  {}", "(double credits)".yellow())
            } else {
                String::new()
            };
            output.push(format!("   Minutes: {}{bonus}", report.request.elapsed_minutes));
            output.push(format!(
                "   Earned:  {} credits, {} XP",
                format!("+{}", report.result.credits_earned).green(),
                format!("+{}", report.result.xp_earned).cyan()
            ));

            let level = format!("   Level:   {}", report.result.new_level);
            if report.leveled_up {
                output.push(format!("{level}  {}", "🎉 Level up!".magenta().bold()));
            } else {
                output.push(level);
            }

            if let Some(streak) = report.result.streak_days {
                output.push(format!("   Streak:  {streak} day{}", plural(streak)));
            }
            if let Some(user) = &report.user {
                output.push(format!("   Balance: {} credits", user.credits));
            }
        }
        SettlementOutcome::Failed {
            request,
            error,
            disposition,
            ..
        } => {
            output.push(format!("⚠️  Settlement failed: {error}").yellow().bold().to_string());
            output.push(format!(
                "   {} minute{} not confirmed by the server.",
                request.elapsed_minutes,
                plural(request.elapsed_minutes)
            ));
            match disposition {
                FailureDisposition::Discarded => {
                    output.push("   Your reward may not have been recorded.".to_string());
                }
                FailureDisposition::Queued { id } => {
                    output.push(format!("   Queued as #{id}."));
                    output.push(
                        "   Use 'poncik pending flush' to retry".dimmed().to_string(),
                    );
                }
            }
        }
    }

    for bonus in new_bonuses {
        output.push(format!("   {} {}", bonus.emoji(), bonus.message()));
    }

    output.join("\n")
}

/// Format queued settlements.
pub fn format_pending_pretty(records: &[PendingRecord]) -> String {
    if records.is_empty() {
        return "Pending settlements (0)\n  Nothing queued".to_string();
    }

    let mut output = format!("Pending settlements ({})\n", records.len());
    output.push_str(&"─".repeat(60));
    output.push('\n');

    for record in records {
        let request = record.settlement.request;
        let double = if request.double_credits { " x2" } else { "" };
        output.push_str(&format!(
            "#{:<4} {}  {} min{}  {}\n",
            record.id,
            record.settlement.session_id.as_str().bold(),
            request.elapsed_minutes,
            double.yellow(),
            record.created_at.format("%Y-%m-%d %H:%M").to_string().dimmed()
        ));
        if let Some(error) = &record.last_error {
            output.push_str(&format!(
                "      {} attempt{}, last error: {}\n",
                record.attempts,
                plural(record.attempts),
                error.red()
            ));
        }
    }

    output
}

/// Format the result of a flush.
pub fn format_flush_pretty(report: &FlushReport) -> String {
    if report.settled.is_empty() && report.failed.is_empty() {
        return "Nothing to flush".to_string();
    }

    let mut output = Vec::new();
    for (session_id, result) in &report.settled {
        output.push(format!(
            "{} {}  +{} credits, +{} XP",
            "✓".green(),
            session_id,
            result.credits_earned,
            result.xp_earned
        ));
    }
    for (session_id, error) in &report.failed {
        output.push(format!("{} {}  {}", "✗".red(), session_id, error.dimmed()));
    }
    output.push(String::new());
    output.push(format!(
        "{} settled, {} still pending",
        report.settled.len(),
        report.failed.len()
    ));

    output.join("\n")
}

/// Format the signed-in user.
pub fn format_profile_pretty(user: &UserState) -> String {
    let name = if user.name.is_empty() {
        user.user_id.as_str()
    } else {
        user.name.as_str()
    };

    let mut output = format!("👤 {}\n", name.bold());
    output.push_str(&format!("  {}: {}\n", "Level".dimmed(), user.level));
    output.push_str(&format!("  {}: {}\n", "Credits".dimmed(), user.credits.to_string().green()));
    output.push_str(&format!("  {}: {}\n", "XP".dimmed(), user.xp));
    output.push_str(&format!(
        "  {}: {} day{}\n",
        "Streak".dimmed(),
        user.streak_days,
        plural(user.streak_days)
    ));
    output.push_str(&format!(
        "  {}: {} min\n",
        "Focused".dimmed(),
        user.total_focus_minutes
    ));
    output
}

/// Format completed sessions.
pub fn format_history_pretty(entries: &[FocusHistoryEntry]) -> String {
    if entries.is_empty() {
        return "Focus history (0 sessions)\n  No completed sessions yet".to_string();
    }

    let mut output = format!("Focus history ({} sessions)\n", entries.len());
    output.push_str(&"─".repeat(50));
    output.push('\n');

    for entry in entries {
        let bonus = if entry.double_credits {
            " ×2".yellow().to_string()
        } else {
            String::new()
        };
        output.push_str(&format!(
            "  {}  {:>3} min  {:>+5} credits{}\n",
            local_time(&entry.started_at).dimmed(),
            entry.minutes(),
            entry.credits_earned,
            bonus
        ));
    }

    let total: u64 = entries.iter().map(|e| u64::from(e.minutes())).sum();
    output.push_str(&format!(
        "\n  {}: {}\n",
        "Total".dimmed(),
        format_duration(Duration::from_secs(total * 60))
    ));
    output
}

/// Format the leaderboard.
pub fn format_leaderboard_pretty(entries: &[LeaderboardEntry]) -> String {
    if entries.is_empty() {
        return "Leaderboard\n  Nobody has focused yet".to_string();
    }

    let mut output = String::from("🏆 Leaderboard\n");
    output.push_str(&"─".repeat(50));
    output.push('\n');

    for (rank, entry) in entries.iter().enumerate() {
        let name = if entry.name.is_empty() {
            entry.user_id.as_str()
        } else {
            entry.name.as_str()
        };
        output.push_str(&format!(
            "  {:>2}. {:<20} Lv {:<3} {:>6} min  🔥 {}\n",
            rank + 1,
            name.bold(),
            entry.level,
            entry.total_focus_minutes,
            entry.streak_days
        ));
    }
    output
}

/// Backend timestamps in local time, or as sent if unparseable.
fn local_time(timestamp: &str) -> String {
    DateTime::parse_from_rfc3339(timestamp).map_or_else(
        |_| timestamp.to_string(),
        |t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
    )
}

/// Format shop items.
pub fn format_shop_pretty(items: &[&ShopItem]) -> String {
    if items.is_empty() {
        return "Shop (0 items)\n  No items match".to_string();
    }

    let mut output = format!("Shop ({} items)\n", items.len());
    output.push_str(&"─".repeat(60));
    output.push('\n');

    for item in items {
        output.push_str(&format!(
            "{} {:<18} {:>6}  {}  {}\n",
            item.emoji,
            item.name.bold(),
            item.price.to_string().yellow(),
            rarity_label(item.rarity),
            item.id.dimmed()
        ));
    }

    output
}

/// Format a purchase.
pub fn format_purchase_pretty(purchase: &Purchase) -> String {
    format!(
        "{} Bought {} {} for {} credits\n   New balance: {}",
        "✓".green(),
        purchase.item.emoji,
        purchase.item.name.bold(),
        purchase.credits_spent,
        purchase.new_balance
    )
}

/// Format an equipped item.
pub fn format_equip_pretty(item: &ShopItem) -> String {
    if item.category == ItemCategory::Furniture {
        return format!(
            "{} {} {} is yours to place in the cafe",
            "✓".green(),
            item.emoji,
            item.name.bold()
        );
    }
    format!("{} Equipped {} {}", "✓".green(), item.emoji, item.name.bold())
}

/// Format owned and equipped items.
pub fn format_inventory_pretty(inventory: &Inventory, total_value: i64) -> String {
    let mut output = String::from("Inventory\n");
    output.push_str(&"─".repeat(40));
    output.push('\n');

    let sections = [
        (ItemCategory::Pet, &inventory.pets),
        (ItemCategory::Outfit, &inventory.outfits),
        (ItemCategory::Furniture, &inventory.furniture),
        (ItemCategory::Theme, &inventory.themes),
    ];
    for (category, ids) in sections {
        let list = if ids.is_empty() {
            "none".dimmed().to_string()
        } else {
            ids.join(", ")
        };
        output.push_str(&format!("  {:<10} {}\n", category.display_name(), list));
    }

    let equipped = &inventory.equipped;
    let slot = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
    output.push_str(&format!(
        "\n  {}: pet {}, outfit {}, theme {}\n",
        "Equipped".dimmed(),
        slot(&equipped.pet).cyan(),
        slot(&equipped.outfit).cyan(),
        slot(&equipped.theme).cyan()
    ));
    output.push_str(&format!("  {}: {} credits\n", "Value".dimmed(), total_value));
    output.push_str(&format!(
        "  {}: {} credits\n",
        "Spent".dimmed(),
        inventory.spent_credits
    ));

    output
}

/// Format bonus counters.
pub fn format_bonus_status_pretty(tracker: &BonusTracker) -> String {
    let mut output = String::from("Study bonuses\n");
    output.push_str(&"─".repeat(40));
    output.push('\n');
    output.push_str(&format!(
        "  {}: {} / 120 min\n",
        "Continuous".dimmed(),
        tracker.continuous_minutes
    ));
    output.push_str(&format!("  {}: {} / 240 min\n", "Today".dimmed(), tracker.daily_minutes));
    output.push_str(&format!("  {}: {} / 7 days\n", "Streak".dimmed(), tracker.streak_days));

    let active = tracker.active_bonuses();
    if active.is_empty() {
        output.push_str(&format!("\n  {}\n", "No active bonuses".dimmed()));
    } else {
        output.push('\n');
        for bonus in active {
            output.push_str(&format!("  {} {}\n", bonus.emoji(), bonus.name().bold()));
        }
    }

    output
}

fn rarity_label(rarity: Rarity) -> String {
    match rarity {
        Rarity::Common => "common".white().to_string(),
        Rarity::Rare => "rare".blue().to_string(),
        Rarity::Epic => "epic".magenta().to_string(),
    }
}

const fn plural(n: u32) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}
