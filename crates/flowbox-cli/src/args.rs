//! Command-line argument definitions for the Flowbox CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments select the model, the event script to replay,
//! the snapshot path, the configuration file and the logging verbosity.

use clap::Parser;

/// Command-line arguments for the Flowbox headless editor
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the diagram model (TOML)
    #[arg(help = "Path to the model file")]
    pub input: String,

    /// Path to an event script (TOML) replayed through the editor
    #[arg(short, long)]
    pub events: Option<String>,

    /// Path to the output SVG snapshot
    #[arg(short, long, default_value = "out.svg")]
    pub output: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
