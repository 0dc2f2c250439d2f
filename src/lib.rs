//! NeuraLens - traffic sign recognition client library
//!
//! This library uploads a user-selected image to a remote prediction
//! service and keeps a short local history of the results.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `imaging`: Image selection, validation, compression, and preview references
//! - `client`: HTTP prediction client, rate limiting, and result types
//! - `history`: Bounded, newest-first prediction history
//! - `storage`: Key-value backends for the history (sled, in-memory)
//! - `session`: Session controller driving select, predict, and reset
//! - `commands`: Command handlers used by the binary
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use neuralens::{Config, HistoryStore, PredictionClient, SessionController};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let client = PredictionClient::from_config(&config.api)?;
//!     let history = HistoryStore::open(&config.history);
//!     let mut session = SessionController::new(client, &config, history);
//!
//!     session.select_path(Path::new("stop.jpg")).await?;
//!     session.predict().await?;
//!     if let Some(result) = session.result() {
//!         println!("{} ({:?})", result.label, result.confidence);
//!     }
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod history;
pub mod imaging;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use client::{Classifier, PredictionClient, PredictionResult};
pub use config::Config;
pub use error::{NeuralensError, PredictError, Result, ValidationError};
pub use history::{HistoryEntry, HistoryStore};
pub use imaging::SelectedImage;
pub use session::{SessionController, SessionState};

#[cfg(test)]
pub mod test_utils;
