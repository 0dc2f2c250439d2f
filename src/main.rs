//! NeuraLens - traffic sign recognition client
//!
#![doc = "NeuraLens - traffic sign recognition client"]
#![doc = "Main entry point for the NeuraLens command-line client."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use neuralens::cli::{Cli, Commands};
use neuralens::commands;
use neuralens::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose, cli.json_logs);

    // Load configuration (file, environment, CLI overrides)
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Predict {
            image,
            json,
            no_history,
        } => {
            tracing::debug!("Predicting {}", image.display());
            if no_history {
                tracing::debug!("History recording disabled for this run");
            }
            commands::run_predict(config, &image, json, no_history).await?;
            Ok(())
        }
        Commands::Session => {
            tracing::info!("Starting interactive session");
            commands::run_session(config).await?;
            Ok(())
        }
        Commands::History { command } => {
            tracing::debug!("Starting history command");
            commands::handle_history(&config, command)?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so that `--json` output on stdout stays parseable.
fn init_tracing(verbose: bool, json: bool) {
    let default_level = if verbose {
        "neuralens=debug"
    } else {
        "neuralens=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
