//! `realtime` and `firestore` commands

mod handler;

pub use handler::{handle_firestore_command, handle_realtime_command};

use clap::Args;
use std::path::PathBuf;

use crate::config::{FileConfig, ImportConfig};

/// Where to read rows from
#[derive(Debug, Clone, Args)]
pub struct SourceArgs {
    /// Spreadsheet to import (.xlsx, .xls, .xlsb, .ods or .csv)
    #[arg(short, long)]
    pub file: PathBuf,

    /// Sheet to read (default: the first sheet)
    #[arg(short, long)]
    pub sheet: Option<String>,
}

impl SourceArgs {
    pub fn import_config(&self, file_config: &FileConfig) -> ImportConfig {
        let mut config = ImportConfig::from_file(&self.file, file_config);
        config.sheet = self.sheet.clone();
        config
    }
}

#[derive(Debug, Clone, Args)]
pub struct RealtimeArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Database root URL, e.g. https://my-db-default-rtdb.firebaseio.com
    #[arg(long)]
    pub base_url: Option<String>,

    /// Run against an in-memory database instead of the real one
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Args)]
pub struct FirestoreArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Google Cloud project id
    #[arg(long)]
    pub project: Option<String>,

    /// Firestore database id (default: "(default)")
    #[arg(long)]
    pub database: Option<String>,

    /// Target collection (default: "produtos")
    #[arg(long)]
    pub collection: Option<String>,

    /// Documents per atomic commit, at most 500
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Run against an in-memory store instead of the real one
    #[arg(long)]
    pub dry_run: bool,
}

impl FirestoreArgs {
    pub fn import_config(&self, file_config: &FileConfig) -> ImportConfig {
        let mut config = self.source.import_config(file_config);
        if let Some(collection) = &self.collection {
            config.collection_name = collection.clone();
        }
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        config
    }
}
