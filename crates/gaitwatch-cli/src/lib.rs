//! Gaitwatch CLI
//!
//! Command-line front end for the gaitwatch gait classifier and vital sign
//! screen.
//!
//! # Usage
//!
//! ```bash
//! # Screen a single set of vital signs
//! gaitwatch vitals --pulse 72 --oxygen 97 --temperature 98.2
//!
//! # Classify one acceleration sample
//! gaitwatch classify --x 0.1 --y 0.05 --z 9.75
//!
//! # List disorders or show recovery guidance
//! gaitwatch remedy --disorder "Ataxic Gait"
//!
//! # Assess the latest telemetry window and write comparison series
//! gaitwatch monitor --feed feed.json --output-dir static
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod feed;
pub mod gait;

/// Gaitwatch Command Line Interface
#[derive(Parser, Debug)]
#[command(name = "gaitwatch")]
#[command(author, version, about = "Gait disorder classification and vital sign screening")]
#[command(propagate_version = true)]
pub struct Cli {
    /// JSON configuration file (defaults apply when omitted)
    #[arg(short, long, global = true, env = "GAITWATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check pulse, oxygen and temperature against the normal bands
    Vitals(gait::VitalsArgs),

    /// Classify one acceleration sample against the reference table
    Classify(gait::ClassifyArgs),

    /// List known disorders or show recovery guidance
    Remedy(gait::RemedyArgs),

    /// Assess the latest telemetry window
    Monitor(gait::MonitorArgs),

    /// Display version information
    Version,
}
