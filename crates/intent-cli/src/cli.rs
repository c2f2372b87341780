//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// intentctl - Reconcile and audit network intents
#[derive(Parser, Debug)]
#[command(name = "intentctl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Engine configuration file (TOML)
    #[arg(short, long, global = true, env = "INTENTCTL_CONFIG")]
    pub config: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Intent and pre-rendered site objects
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct IntentArgs {
    /// Intent document (JSON), including its topology
    #[arg(short, long)]
    pub intent: PathBuf,

    /// Site objects per device (JSON): `{"<device>": {"<object>": {...}}}`
    #[arg(short, long)]
    pub objects: PathBuf,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Push the intent to its devices and store the updated topology
    ///
    /// The intent file is rewritten in place with the new topology, also
    /// when some devices failed.
    Sync {
        #[command(flatten)]
        args: IntentArgs,
    },

    /// Compare devices against the intent
    Audit {
        #[command(flatten)]
        args: IntentArgs,

        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Collect indicator values from device state
    Indicators {
        #[command(flatten)]
        args: IntentArgs,
    },

    /// Print the cleanup ledger stored in an intent
    Ledger {
        /// Intent document (JSON)
        #[arg(short, long)]
        intent: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
