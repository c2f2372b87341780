//! Audit and indicators command implementations

use std::path::Path;

use colored::Colorize;

use intent_model::AuditReport;

use crate::cli::IntentArgs;
use crate::context::{Context, read_intent, read_objects};
use crate::error::Result;

/// Run the audit command
pub fn run_audit(config: Option<&Path>, args: &IntentArgs, json: bool) -> Result<()> {
    let intent = read_intent(&args.intent)?;
    let renderer = read_objects(&args.objects)?;
    let context = Context::load(config)?;

    let report = context.orchestrator(renderer)?.audit(&intent)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &AuditReport) {
    if report.is_aligned() {
        println!(
            "{} {} is aligned. No drift detected.",
            "OK".green().bold(),
            report.target.cyan()
        );
        return;
    }

    println!("{} {} has drifted:", "DRIFTED".red().bold(), report.target.cyan());
    for object in &report.misaligned_objects {
        let (marker, label) = if object.is_undesired {
            ("!".red(), "undesired")
        } else {
            ("-".yellow(), "missing")
        };
        println!(
            "   {} {} [{}] {}",
            marker,
            object.object_id.cyan(),
            object.device_name.dimmed(),
            label
        );
    }
    for attribute in &report.misaligned_attributes {
        println!(
            "   {} {} [{}] expected {}, found {}",
            "~".yellow(),
            attribute.name.cyan(),
            attribute.device_name.dimmed(),
            attribute.expected_value.as_deref().unwrap_or("<unset>"),
            attribute.actual_value.as_deref().unwrap_or("<unset>")
        );
    }
}

/// Run the indicators command, printing JSON
pub fn run_indicators(config: Option<&Path>, args: &IntentArgs) -> Result<()> {
    let intent = read_intent(&args.intent)?;
    let renderer = read_objects(&args.objects)?;
    let context = Context::load(config)?;

    let indicators = context.orchestrator(renderer)?.indicators(&intent)?;
    println!("{}", serde_json::to_string_pretty(&indicators)?);
    Ok(())
}
