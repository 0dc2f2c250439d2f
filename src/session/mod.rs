//! Session controller
//!
//! Owns all transient state of one user session and moves it through
//! [`SessionState`] with three actions:
//!
//! - `select` validates and, when needed, compresses an image, then shows
//!   it through a fresh preview reference (the previous one is revoked)
//! - `predict` sends the selected image to the classifier and, on success,
//!   records the result in the history
//! - `reset` drops the selection, result, and error, and revokes the preview
//!
//! A result at or above the celebration threshold turns on a celebration
//! flag that switches itself off after a fixed delay.

pub mod state;
pub use state::SessionState;

use crate::client::{Classifier, PredictionResult};
use crate::config::Config;
use crate::error::{NeuralensError, PredictError, Result};
use crate::history::HistoryStore;
use crate::imaging::{ImageCompressor, ImageValidator, PreviewRegistry, PreviewUrl, SelectedImage};
use std::path::Path;
use std::time::Duration;
use tokio::time::Instant;

/// Shown when a selected file cannot be read
const PROCESSING_FAILED_MESSAGE: &str = "Failed to process image";

/// Drives one select, predict, reset cycle at a time
pub struct SessionController<C> {
    classifier: C,
    validator: ImageValidator,
    compressor: ImageCompressor,
    history: HistoryStore,
    record_history: bool,
    previews: PreviewRegistry,
    celebration_threshold: f64,
    celebration_duration: Duration,

    state: SessionState,
    selected: Option<SelectedImage>,
    preview: Option<PreviewUrl>,
    result: Option<PredictionResult>,
    error: Option<String>,
    celebrate_until: Option<Instant>,
    total_predictions: usize,
}

impl<C: Classifier> SessionController<C> {
    /// Create an idle session
    ///
    /// # Arguments
    ///
    /// * `classifier` - Prediction backend
    /// * `config` - Upload limits and celebration settings are taken from here
    /// * `history` - Where successful predictions are recorded
    pub fn new(classifier: C, config: &Config, history: HistoryStore) -> Self {
        Self {
            classifier,
            validator: ImageValidator::from_config(&config.upload),
            compressor: ImageCompressor::from_config(&config.upload),
            history,
            record_history: true,
            previews: PreviewRegistry::new(),
            celebration_threshold: config.session.celebration_threshold,
            celebration_duration: Duration::from_millis(config.session.celebration_ms),
            state: SessionState::Idle,
            selected: None,
            preview: None,
            result: None,
            error: None,
            celebrate_until: None,
            total_predictions: 0,
        }
    }

    /// Turn history recording on or off for this session
    pub fn with_history_recording(mut self, enabled: bool) -> Self {
        self.record_history = enabled;
        self
    }

    /// Read `path` from disk and select it
    ///
    /// A file that cannot be read puts the session in `Errored`.
    ///
    /// # Errors
    ///
    /// Returns `NeuralensError::InvalidTransition` while a prediction is in flight
    pub async fn select_path(&mut self, path: &Path) -> Result<SessionState> {
        self.ensure(self.state.can_select(), "select a file")?;

        match SelectedImage::from_path(path).await {
            Ok(image) => self.select(image).await,
            Err(e) => {
                tracing::warn!("Could not read {}: {:#}", path.display(), e);
                self.clear_transient();
                self.fail(PROCESSING_FAILED_MESSAGE.to_string());
                Ok(self.state)
            }
        }
    }

    /// Select an image
    ///
    /// Ends in `FileSelected` when the image passes validation and in
    /// `Errored` otherwise. Any earlier selection, result, and preview are
    /// discarded first.
    ///
    /// # Errors
    ///
    /// Returns `NeuralensError::InvalidTransition` while a prediction is in flight
    pub async fn select(&mut self, image: SelectedImage) -> Result<SessionState> {
        self.ensure(self.state.can_select(), "select a file")?;
        self.clear_transient();

        if let Err(e) = self.validator.validate(&image.mime_type, image.size()) {
            tracing::info!(file = %image.file_name, "Rejected selection: {}", e);
            self.fail(e.to_string());
            return Ok(self.state);
        }

        let image = self.compressor.compress(image).await;
        self.preview = Some(self.previews.create(&image));
        self.selected = Some(image);
        self.state = SessionState::FileSelected;

        Ok(self.state)
    }

    /// Send the selected image for classification
    ///
    /// Ends in `Resulted` on success and `Errored` on failure. A request
    /// refused by the local rate limiter leaves the session in
    /// `FileSelected` with the wait message set.
    ///
    /// # Errors
    ///
    /// Returns `NeuralensError::InvalidTransition` unless a file is selected
    pub async fn predict(&mut self) -> Result<SessionState> {
        self.ensure(self.state.can_predict(), "predict")?;
        let image = match &self.selected {
            Some(image) => image.clone(),
            None => return Err(self.invalid("predict").into()),
        };

        self.state = SessionState::Predicting;
        self.error = None;

        match self.classifier.classify(&image).await {
            Ok(result) => self.succeed(&image, result),
            Err(e @ PredictError::RateLimited { .. }) => {
                tracing::info!("{}", e);
                self.error = Some(e.to_string());
                self.state = SessionState::FileSelected;
            }
            Err(e) => {
                tracing::warn!(file = %image.file_name, "Prediction failed: {:?}", e);
                self.fail(e.to_string());
            }
        }

        Ok(self.state)
    }

    /// Return to `Idle`, releasing the preview and clearing all transient state
    pub fn reset(&mut self) -> SessionState {
        self.clear_transient();
        self.state = SessionState::Idle;
        self.state
    }

    fn succeed(&mut self, image: &SelectedImage, result: PredictionResult) {
        tracing::info!(
            label = %result.label,
            confidence = ?result.confidence_percent().map(|p| format!("{}%", p)),
            processing_time = ?result.processing_time.map(|t| format!("{:.2}s", t)),
            timestamp = %chrono::Utc::now().to_rfc3339(),
            "Prediction analytics"
        );

        if self.record_history {
            self.history.record(
                &result.label,
                result.confidence,
                image.data_url(),
                result.processing_time,
            );
        }

        if result
            .confidence
            .is_some_and(|c| c >= self.celebration_threshold)
        {
            self.celebrate_until = Some(Instant::now() + self.celebration_duration);
        }

        self.total_predictions += 1;
        self.result = Some(result);
        self.state = SessionState::Resulted;
    }

    fn fail(&mut self, message: String) {
        self.error = Some(message);
        self.state = SessionState::Errored;
    }

    fn clear_transient(&mut self) {
        if let Some(preview) = self.preview.take() {
            self.previews.revoke(&preview);
        }
        self.selected = None;
        self.result = None;
        self.error = None;
        self.celebrate_until = None;
    }

    fn ensure(&self, allowed: bool, action: &'static str) -> Result<()> {
        if allowed {
            Ok(())
        } else {
            Err(self.invalid(action).into())
        }
    }

    fn invalid(&self, action: &'static str) -> NeuralensError {
        NeuralensError::InvalidTransition {
            action,
            state: self.state.name(),
        }
    }

    /// Current state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Image waiting to be (or that was) classified
    pub fn selected(&self) -> Option<&SelectedImage> {
        self.selected.as_ref()
    }

    /// Preview reference of the selected image
    pub fn preview(&self) -> Option<&PreviewUrl> {
        self.preview.as_ref()
    }

    /// Last prediction
    pub fn result(&self) -> Option<&PredictionResult> {
        self.result.as_ref()
    }

    /// Message of the last failure
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Round-trip time of the last prediction in seconds
    pub fn processing_time(&self) -> Option<f64> {
        self.result.as_ref().and_then(|r| r.processing_time)
    }

    /// Whether the celebration for the last result is still showing
    pub fn is_celebrating(&self) -> bool {
        self.celebrate_until
            .is_some_and(|until| Instant::now() < until)
    }

    /// Successful predictions in this session
    pub fn total_predictions(&self) -> usize {
        self.total_predictions
    }

    /// Prediction history backing this session
    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Preview references handed out by this session
    pub fn previews(&self) -> &PreviewRegistry {
        &self.previews
    }
}

impl<C> std::fmt::Debug for SessionController<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("state", &self.state)
            .field("selected", &self.selected.as_ref().map(|s| &s.file_name))
            .field("error", &self.error)
            .field("total_predictions", &self.total_predictions)
            .finish()
    }
}
