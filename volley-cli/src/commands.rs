use std::path::PathBuf;

use clap::Subcommand;

use crate::args::*;
use crate::output::EventsTarget;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run every request of a JSON/YAML manifest and print the outcomes.
    Run {
        manifest: PathBuf,
        #[arg(long, value_enum, default_value_t = EventsTarget::None)]
        events: EventsTarget,
        #[command(flatten)]
        batch: BatchArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Print the effective configuration.
    Config {
        #[command(flatten)]
        batch: BatchArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
}
