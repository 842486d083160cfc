//! CLI interface for trade-gate
//!
//! Provides subcommands for:
//! - `run`: Replay a recorded session through the gate on paper
//! - `check`: Validate and size a single proposal
//! - `config`: Show effective configuration

mod check;
mod run;
mod session;

pub use check::CheckArgs;
pub use run::{OutputFormat, RunArgs};
pub use session::{Session, SessionEvent, SessionSummary};

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "trade-gate")]
#[command(about = "Admission control and position lifecycle for trade proposals")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a session file on paper
    Run(RunArgs),
    /// Validate and size one proposal
    Check(CheckArgs),
    /// Show configuration
    Config,
}
