//! Command line interface of the `studio-worker` binary.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::jobs::Job;

/// Studio background worker.
#[derive(Debug, Parser)]
#[command(name = "studio-worker", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run every periodic job until interrupted.
    Run,

    /// Run a single job and exit (for cron).
    Once {
        #[arg(value_enum)]
        job: Job,

        /// Office-local day to act on (YYYY-MM-DD).
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}
