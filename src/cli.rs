//! Command-line interface definition for NeuraLens
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for one-shot prediction, an interactive session,
//! and prediction history management.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// NeuraLens - traffic sign recognition client
///
/// Upload an image to a prediction server and see the recognized sign
/// together with its confidence.
#[derive(Parser, Debug, Clone)]
#[command(name = "neuralens")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// API base path or URL (overrides config; the endpoint is `<base>/predict`)
    #[arg(long, env = "NEURALENS_API_BASE")]
    pub api_base: Option<String>,

    /// Path to the prediction history database
    #[arg(long, env = "NEURALENS_HISTORY_DB")]
    pub history_db: Option<PathBuf>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for NeuraLens
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Classify a single image
    Predict {
        /// Image file to upload (JPG, PNG, WEBP)
        image: PathBuf,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Do not record the result in the prediction history
        #[arg(long)]
        no_history: bool,
    },

    /// Start an interactive session (select, predict, reset)
    Session,

    /// Manage prediction history
    History {
        /// History subcommand
        #[command(subcommand)]
        command: HistoryCommand,
    },
}

/// Prediction history subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum HistoryCommand {
    /// List recent predictions, newest first
    List {
        /// Print entries as JSON
        #[arg(long)]
        json: bool,
    },

    /// Erase the prediction history
    Clear,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            json_logs: false,
            api_base: None,
            history_db: None,
            command: Commands::History {
                command: HistoryCommand::List { json: false },
            },
        }
    }
}
