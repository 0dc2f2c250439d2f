//! One-shot prediction
//!
//! Runs a single select and predict cycle through a [`SessionController`]
//! and prints the result card (or JSON).

use crate::client::{Classifier, PredictionClient, PredictionResult};
use crate::commands::render;
use crate::config::Config;
use crate::error::Result;
use crate::history::HistoryStore;
use crate::session::{SessionController, SessionState};
use serde::Serialize;
use std::path::Path;

/// JSON shape printed by `predict --json`
#[derive(Debug, Serialize)]
pub struct PredictOutput<'a> {
    /// File that was uploaded (after compression)
    pub file_name: &'a str,
    /// Server result
    #[serde(flatten)]
    pub result: &'a PredictionResult,
    /// Whether the result reached the celebration threshold
    pub celebrate: bool,
}

/// Classify one image and print the outcome
///
/// # Arguments
///
/// * `config` - Global configuration
/// * `image` - Image file to upload
/// * `json` - Print JSON instead of the result card
/// * `no_history` - Skip recording the result in the history
///
/// # Errors
///
/// Returns the user-facing message when the file is rejected or the
/// prediction fails
pub async fn run_predict(
    config: Config,
    image: &Path,
    json: bool,
    no_history: bool,
) -> Result<()> {
    let client = PredictionClient::from_config(&config.api)?;
    tracing::debug!("Prediction endpoint: {}", client.endpoint());

    let history = if no_history {
        HistoryStore::unavailable()
    } else {
        HistoryStore::open(&config.history)
    };
    let session =
        SessionController::new(client, &config, history).with_history_recording(!no_history);

    let (file_name, result, celebrate) = classify_file(session, image).await?;
    print_outcome(&file_name, &result, celebrate, json)
}

/// Drive `session` through select and predict for `image`
///
/// Returns the uploaded file name, the result, and the celebration flag.
pub async fn classify_file<C: Classifier>(
    mut session: SessionController<C>,
    image: &Path,
) -> Result<(String, PredictionResult, bool)> {
    if session.select_path(image).await? == SessionState::Errored {
        return Err(session_error(&session));
    }

    let file_name = session
        .selected()
        .map(|s| s.file_name.clone())
        .unwrap_or_default();

    match session.predict().await? {
        SessionState::Resulted => {}
        _ => return Err(session_error(&session)),
    }

    let celebrating = session.is_celebrating();
    match session.result() {
        Some(result) => Ok((file_name, result.clone(), celebrating)),
        None => Err(session_error(&session)),
    }
}

fn session_error<C: Classifier>(session: &SessionController<C>) -> anyhow::Error {
    anyhow::anyhow!(session
        .error()
        .unwrap_or("Prediction did not complete")
        .to_string())
}

fn print_outcome(
    file_name: &str,
    result: &PredictionResult,
    celebrate: bool,
    json: bool,
) -> Result<()> {
    if json {
        let output = PredictOutput {
            file_name,
            result,
            celebrate,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        render::print_result(result, celebrate);
    }
    Ok(())
}
