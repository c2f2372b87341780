//! intentctl
//!
//! Command-line front end for the intent reconciliation engine. Intents and
//! their pre-rendered site objects are read from JSON files; devices are
//! reached through the controller configured in a TOML file.

mod cli;
mod commands;
mod context;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;
    tracing::debug!("Verbose mode enabled");

    let config = cli.config.as_deref();
    match &cli.command {
        Commands::Sync { args } => commands::run_sync(config, args),
        Commands::Audit { args, json } => commands::run_audit(config, args, *json),
        Commands::Indicators { args } => commands::run_indicators(config, args),
        Commands::Ledger { intent, json } => commands::run_ledger(intent, *json),
    }
}
