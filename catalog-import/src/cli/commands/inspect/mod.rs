//! `inspect` command

mod handler;

pub use handler::handle_inspect_command;

use clap::Args;

use super::import::SourceArgs;

#[derive(Debug, Clone, Args)]
pub struct InspectArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}
