use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use serde::{Deserialize, Serialize};

use crate::features::focus::TimerMode;
use crate::features::inventory::{ItemCategory, Rarity};

#[derive(Parser)]
#[command(name = "poncik")]
#[command(about = "Focus timer and rewards client for PoncikFocus")]
#[command(long_about = "poncik - Focus timer and rewards client for PoncikFocus

Run Pomodoro-style focus sessions against your PoncikFocus account, earn
credits and XP, and spend them in the cosmetic shop.

QUICK START:
  poncik focus run              Open the interactive timer
  poncik focus run --headless   Run a session in the terminal, Ctrl-C to stop
  poncik profile                Show credits, XP and level
  poncik focus history          List your completed sessions
  poncik leaderboard            See who has focused the most
  poncik shop list              Browse the shop

AUTHENTICATION:
  Set api.token in ~/.poncik/config.yaml, or pass --token / PONCIK_TOKEN.

OUTPUT FORMATS:
  --output pretty    Human-readable colored output (default)
  --output json      Machine-readable JSON for scripting")]
#[command(version, propagate_version = true)]
pub struct Cli {
    /// Output format for command results
    ///
    /// Defaults to `general.default_output` from the config file.
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Backend base URL, including the /api prefix
    #[arg(long, env = "PONCIK_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Bearer token for the backend
    #[arg(long, env = "PONCIK_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for command results.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable colored output.
    #[default]
    Pretty,
    /// Machine-readable JSON output.
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run focus sessions
    ///
    /// # Examples
    ///
    ///   poncik focus run
    ///   poncik focus run --mode short-break
    ///   poncik focus run --headless --accept-bonus
    #[command(alias = "f")]
    Focus(FocusArgs),

    /// Manage settlements queued after a failed end-session call
    ///
    /// Only used when `settlement.on_failure` is `queue`.
    Pending(PendingArgs),

    /// Refresh and show your credits, XP and level
    #[command(alias = "me")]
    Profile,

    /// Show the users with the most focus time
    #[command(alias = "top")]
    Leaderboard {
        /// Number of users to show
        #[arg(long, short = 'n', default_value_t = 10)]
        limit: usize,
    },

    /// Browse and buy cosmetic items
    Shop(ShopArgs),

    /// Show or reset study bonus progress
    Bonus(BonusArgs),

    /// Show configuration
    Config(ConfigArgs),

    /// Generate shell completions
    ///
    /// # Examples
    ///
    ///   poncik completions bash > /etc/bash_completion.d/poncik
    ///   poncik completions zsh > ~/.zfunc/_poncik
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
pub struct FocusArgs {
    #[command(subcommand)]
    pub command: FocusCommands,
}

#[derive(Subcommand)]
pub enum FocusCommands {
    /// Run one session
    ///
    /// Opens the interactive timer unless --headless is given. Headless
    /// sessions stop on Ctrl-C.
    Run {
        /// Timer mode (focus, short-break, long-break)
        #[arg(long, short = 'm', value_parser = parse_mode)]
        mode: Option<TimerMode>,

        /// Print progress to stderr instead of opening the TUI
        #[arg(long)]
        headless: bool,

        /// Wait for the bonus gate and accept double credits (headless only)
        #[arg(long, requires = "headless")]
        accept_bonus: bool,
    },

    /// List timer modes and their durations
    Modes,

    /// List completed sessions, newest first
    History {
        /// Number of sessions to show
        #[arg(long, short = 'n', default_value_t = 10)]
        limit: usize,
    },
}

fn parse_mode(s: &str) -> Result<TimerMode, String> {
    TimerMode::parse(s).ok_or_else(|| {
        format!("unknown mode '{s}' (expected focus, short-break or long-break)")
    })
}

#[derive(Args)]
pub struct PendingArgs {
    #[command(subcommand)]
    pub command: PendingCommands,
}

#[derive(Subcommand)]
pub enum PendingCommands {
    /// List queued settlements
    List,

    /// Re-send every queued settlement
    Flush,

    /// Drop all queued settlements
    Clear {
        /// Skip confirmation
        #[arg(long, short = 'f')]
        force: bool,
    },
}

#[derive(Args)]
pub struct ShopArgs {
    #[command(subcommand)]
    pub command: ShopCommands,
}

#[derive(Subcommand)]
pub enum ShopCommands {
    /// List shop items
    List {
        #[arg(long, short = 'c', value_enum)]
        category: Option<ItemCategory>,

        #[arg(long, short = 'r', value_enum)]
        rarity: Option<Rarity>,

        /// Only items costing at most this many credits
        #[arg(long)]
        max_price: Option<i64>,
    },

    /// Buy an item with your current credits
    Buy {
        /// Item id, e.g. cat-orange
        id: String,
    },

    /// Equip an owned item
    Equip {
        /// Item id, e.g. winter
        id: String,
    },

    /// Show owned and equipped items
    Inventory,
}

#[derive(Args)]
pub struct BonusArgs {
    #[command(subcommand)]
    pub command: BonusCommands,
}

#[derive(Subcommand)]
pub enum BonusCommands {
    /// Show counters and active bonuses
    Status,

    /// Reset all bonus counters
    Reset {
        /// Skip confirmation
        #[arg(long, short = 'f')]
        force: bool,
    },
}

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration (token masked)
    Show,

    /// Print the config file path
    Path,
}
