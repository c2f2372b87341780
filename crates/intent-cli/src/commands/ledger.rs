//! Ledger command implementation

use std::path::Path;

use colored::Colorize;

use intent_core::CleanupLedger;

use crate::context::read_intent;
use crate::error::Result;

/// Print the cleanup ledger stored in an intent's topology
pub fn run_ledger(intent_path: &Path, json: bool) -> Result<()> {
    let intent = read_intent(intent_path)?;
    let ledger = CleanupLedger::restore(&intent.topology)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&ledger)?);
        return Ok(());
    }

    if ledger.is_empty() {
        println!("{} No objects tracked for {}.", "=>".blue().bold(), intent.target.cyan());
        return Ok(());
    }

    println!(
        "{} {} object(s) tracked for {}:",
        "=>".blue().bold(),
        ledger.len(),
        intent.target.cyan()
    );
    for (device_id, object, entry) in ledger.entries() {
        println!(
            "   {} {} {} ({})",
            device_id.dimmed(),
            object.cyan(),
            entry.target,
            entry.operation
        );
    }
    Ok(())
}
