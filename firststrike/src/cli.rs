//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

/// FirstStrike - AI incident command core
#[derive(Parser)]
#[command(
    name = "firststrike",
    about = "Grounded command plans, recon imagery and spoken briefings for incident command",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Scenario file (YAML); the built-in demo board when omitted
    #[arg(short, long, global = true)]
    pub scenario: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List incidents on the board, most severe first
    Incidents,

    /// List resources and their status
    Resources,

    /// Generate a grounded command plan
    Plan {
        /// Operator latitude
        #[arg(long, requires = "lng", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Operator longitude
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lng: Option<f64>,

        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate a recon image for an incident
    Recon {
        /// Incident id (e.g. INC-001)
        incident_id: String,

        /// Write the decoded image here instead of printing a data URI
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Speak a tactical briefing
    Brief {
        /// Text to speak; defaults to a freshly generated plan summary
        #[arg(short, long)]
        text: Option<String>,
    },
}

/// Path of the log file written by the binary
pub fn get_log_path() -> PathBuf {
    debug!("get_log_path: called");
    let path = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("firststrike")
        .join("logs")
        .join("firststrike.log");
    debug!(?path, "get_log_path: returning path");
    path
}
