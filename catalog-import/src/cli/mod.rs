//! Command-line interface

pub mod commands;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use commands::import::{FirestoreArgs, RealtimeArgs};
use commands::inspect::InspectArgs;

#[derive(Debug, Parser)]
#[command(
    name = "catalog-import",
    version,
    about = "Import product spreadsheets into Firebase Realtime Database or Cloud Firestore"
)]
pub struct Cli {
    /// Path to a TOML config file (default: <config dir>/catalog-import/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Patch description, unit and barcode under /<brand>/<sku> in a Realtime Database
    Realtime(RealtimeArgs),
    /// Merge product documents into a Firestore collection in atomic batches
    Firestore(FirestoreArgs),
    /// Show the sheet's columns and check them against the column map
    Inspect(InspectArgs),
}

impl Cli {
    /// Log filter implied by `-v` flags
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Realtime(args) => commands::import::handle_realtime_command(args, config_path).await,
        Commands::Firestore(args) => {
            commands::import::handle_firestore_command(args, config_path).await
        }
        Commands::Inspect(args) => commands::inspect::handle_inspect_command(args, config_path),
    }
}
