use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;

use poncik::cli::args::{Cli, Commands, FocusCommands};
use poncik::cli::commands;
use poncik::config::{ColorSetting, Config, Paths};
use poncik::error::PoncikError;
use poncik::logging::{self, LogTarget};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{}: {:#}", "error".red().bold(), e);
        let code = e
            .downcast_ref::<PoncikError>()
            .map_or(1, PoncikError::exit_code);
        std::process::exit(code);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().context("failed to load configuration")?;
    config.apply_overrides(cli.api_url.clone(), cli.token.clone());

    match config.general.color {
        ColorSetting::Always => colored::control::set_override(true),
        ColorSetting::Never => colored::control::set_override(false),
        ColorSetting::Auto => {}
    }
    let format = cli.output.unwrap_or(config.general.default_output);

    // The TUI owns the terminal, so it logs to a file.
    let target = if opens_tui(&cli.command) {
        let paths = Paths::new()?;
        paths.ensure_dirs()?;
        LogTarget::File(paths.log_file)
    } else {
        LogTarget::Stderr
    };
    logging::init(&config.general.log_level, cli.verbose, target)?;

    let output = match cli.command {
        Commands::Focus(args) => commands::focus(&config, args.command, format).await?,
        Commands::Pending(args) => commands::pending(&config, args.command, format).await?,
        Commands::Profile => commands::profile(&config, format).await?,
        Commands::Leaderboard { limit } => commands::leaderboard(&config, limit, format).await?,
        Commands::Shop(args) => commands::shop(&config, args.command, format).await?,
        Commands::Bonus(args) => commands::bonus(args.command, format)?,
        Commands::Config(args) => commands::config(&config, args.command)?,
        Commands::Completions { shell } => commands::completions(shell)?,
    };

    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}

fn opens_tui(command: &Commands) -> bool {
    matches!(
        command,
        Commands::Focus(args) if matches!(args.command, FocusCommands::Run { headless: false, .. })
    )
}
