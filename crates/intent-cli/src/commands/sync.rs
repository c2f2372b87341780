//! Sync command implementation

use std::path::Path;

use colored::Colorize;

use crate::cli::IntentArgs;
use crate::context::{Context, read_intent, read_objects, write_intent};
use crate::error::{CliError, Result};

/// Run the sync command
///
/// The updated topology is written back to the intent file before the
/// outcome is reported, so a partial failure never loses the ledger.
pub fn run_sync(config: Option<&Path>, args: &IntentArgs) -> Result<()> {
    let mut intent = read_intent(&args.intent)?;
    let renderer = read_objects(&args.objects)?;
    let context = Context::load(config)?;

    println!(
        "{} Synchronizing {} ({})...",
        "=>".blue().bold(),
        intent.target.cyan(),
        intent.network_state
    );

    let outcome = context.engine(renderer).synchronize(&intent)?;
    intent.topology = outcome.topology;
    write_intent(&args.intent, &intent)?;

    for action in &outcome.report.actions {
        println!("   {} {}", "+".green(), action);
    }

    match outcome.report.error_message() {
        None => {
            println!(
                "{} {} object(s) tracked.",
                "OK".green().bold(),
                intent.topology.objects.len()
            );
            Ok(())
        }
        Some(message) => {
            for error in &outcome.report.errors {
                println!("   {} {}", "x".red(), error);
            }
            Err(CliError::SyncFailed { message })
        }
    }
}
