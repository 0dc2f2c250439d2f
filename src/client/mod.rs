//! HTTP client for the prediction endpoint
//!
//! This module uploads a selected image to `<base>/predict` as multipart
//! form data and turns the answer into a [`PredictionResult`] or one of the
//! [`PredictError`] classes:
//! - 413 means the server found the upload too large
//! - 400 means the server could not read the image
//! - no response at all means the server is unreachable
//! - anything else is a generic failure
//!
//! Requests are rate limited locally; a refused request never reaches the
//! network.

pub mod rate_limit;
pub mod types;

pub use rate_limit::RateLimitState;
pub use types::{ConfidenceTier, PredictionResult};

use crate::config::ApiConfig;
use crate::error::{PredictError, Result};
use crate::imaging::SelectedImage;
use async_trait::async_trait;
use rand::Rng;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use types::PredictResponse;
use url::Url;

/// Name of the multipart field carrying the image
const FILE_FIELD: &str = "file";

/// Something that can classify an image
///
/// The session controller talks to the prediction service only through
/// this trait.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify `image`
    async fn classify(
        &self,
        image: &SelectedImage,
    ) -> std::result::Result<PredictionResult, PredictError>;
}

/// Client for `POST <base>/predict`
#[derive(Clone)]
pub struct PredictionClient {
    client: reqwest::Client,
    endpoint: Url,
    rate_limiter: Arc<Mutex<RateLimitState>>,
    synthesize_missing_confidence: bool,
}

impl PredictionClient {
    /// Create a client
    ///
    /// # Arguments
    ///
    /// * `endpoint` - Full URL of the prediction endpoint
    /// * `timeout` - Transport timeout for one request
    /// * `min_interval` - Minimum time between two requests
    pub fn new(endpoint: Url, timeout: Duration, min_interval: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            endpoint,
            rate_limiter: Arc::new(Mutex::new(RateLimitState::new(min_interval))),
            synthesize_missing_confidence: false,
        }
    }

    /// Create a client from API configuration
    ///
    /// # Errors
    ///
    /// Returns error if the configured endpoint is not a valid URL
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Ok(Self::new(
            config.predict_url()?,
            config.timeout(),
            config.min_request_interval(),
        )
        .with_synthesized_confidence(config.synthesize_missing_confidence))
    }

    /// Fill in a placeholder confidence when the server reports none
    ///
    /// The placeholder is drawn uniformly from [0.7, 1.0) and carries no
    /// information about the prediction.
    pub fn with_synthesized_confidence(mut self, enabled: bool) -> Self {
        self.synthesize_missing_confidence = enabled;
        self
    }

    /// URL requests are sent to
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Upload `image` and return the prediction
    ///
    /// # Errors
    ///
    /// Returns the `PredictError` class of the failure; see the module docs
    pub async fn predict(
        &self,
        image: &SelectedImage,
    ) -> std::result::Result<PredictionResult, PredictError> {
        let part = Part::bytes(image.bytes.to_vec())
            .file_name(image.file_name.clone())
            .mime_str(&image.mime_type)
            .map_err(|e| PredictError::Failed(format!("Invalid MIME type: {}", e)))?;
        let form = Form::new().part(FILE_FIELD, part);

        self.rate_limiter.lock().await.check_and_record()?;

        tracing::debug!(
            endpoint = %self.endpoint,
            file = %image.file_name,
            size = image.size(),
            "Sending prediction request"
        );

        let started = Instant::now();
        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Prediction server unreachable: {}", e);
                PredictError::Unreachable(e)
            })?;

        let status = response.status();
        match status {
            StatusCode::PAYLOAD_TOO_LARGE => return Err(PredictError::PayloadTooLarge),
            StatusCode::BAD_REQUEST => return Err(PredictError::InvalidFormat),
            s if !s.is_success() => {
                let body = response.text().await.unwrap_or_default();
                tracing::warn!(status = s.as_u16(), body = %body, "Prediction failed");
                return Err(PredictError::Failed(format!("HTTP {}", s.as_u16())));
            }
            _ => {}
        }

        let body: PredictResponse = response
            .json()
            .await
            .map_err(|e| PredictError::Failed(format!("Unreadable response: {}", e)))?;
        let processing_time = started.elapsed().as_secs_f64();

        let label = body
            .label()
            .ok_or_else(|| PredictError::Failed("Response has no label".to_string()))?
            .to_string();

        Ok(PredictionResult {
            confidence: self.resolve_confidence(body.confidence),
            label,
            processing_time: Some(processing_time),
            class_id: body.class_id,
        })
    }

    fn resolve_confidence(&self, reported: Option<f64>) -> Option<f64> {
        let valid = match reported {
            Some(c) if c.is_finite() && (0.0..=1.0).contains(&c) => Some(c),
            Some(c) => {
                tracing::warn!(confidence = c, "Ignoring out-of-range confidence");
                None
            }
            None => None,
        };

        if valid.is_none() && self.synthesize_missing_confidence {
            return Some(rand::rng().random_range(0.7..1.0));
        }
        valid
    }
}

#[async_trait]
impl Classifier for PredictionClient {
    async fn classify(
        &self,
        image: &SelectedImage,
    ) -> std::result::Result<PredictionResult, PredictError> {
        self.predict(image).await
    }
}

impl std::fmt::Debug for PredictionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictionClient")
            .field("endpoint", &self.endpoint.as_str())
            .field(
                "synthesize_missing_confidence",
                &self.synthesize_missing_confidence,
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> PredictionClient {
        PredictionClient::from_config(&ApiConfig::default()).unwrap()
    }

    #[test]
    fn test_from_config_builds_endpoint() {
        assert_eq!(
            client().endpoint().as_str(),
            "http://localhost:8000/api/predict"
        );
    }

    #[test]
    fn test_reported_confidence_is_kept() {
        assert_eq!(client().resolve_confidence(Some(0.42)), Some(0.42));
        assert_eq!(client().resolve_confidence(Some(0.0)), Some(0.0));
        assert_eq!(client().resolve_confidence(Some(1.0)), Some(1.0));
    }

    #[test]
    fn test_missing_confidence_stays_unknown_by_default() {
        assert_eq!(client().resolve_confidence(None), None);
    }

    #[test]
    fn test_out_of_range_confidence_is_dropped() {
        assert_eq!(client().resolve_confidence(Some(1.3)), None);
        assert_eq!(client().resolve_confidence(Some(-0.1)), None);
        assert_eq!(client().resolve_confidence(Some(f64::NAN)), None);
    }

    #[test]
    fn test_synthesized_confidence_in_placeholder_range() {
        let client = client().with_synthesized_confidence(true);
        for _ in 0..100 {
            let c = client.resolve_confidence(None).unwrap();
            assert!((0.7..1.0).contains(&c), "{} out of range", c);
        }
        // a reported value always wins
        assert_eq!(client.resolve_confidence(Some(0.5)), Some(0.5));
    }

    #[tokio::test]
    async fn test_invalid_mime_type_does_not_consume_rate_limit() {
        let client = PredictionClient::new(
            Url::parse("http://127.0.0.1:1/api/predict").unwrap(),
            Duration::from_secs(2),
            Duration::from_secs(60),
        );
        let image = SelectedImage::new("stop.jpg", "not a mime type", vec![0u8; 16]);

        let err = client.predict(&image).await.unwrap_err();
        assert!(matches!(err, PredictError::Failed(_)));
        assert!(client.rate_limiter.lock().await.last_request().is_none());
    }

    #[tokio::test]
    async fn test_unreachable_server_is_classified() {
        // bind and release a port so nothing is listening on it
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let client = PredictionClient::new(
            Url::parse(&format!("http://127.0.0.1:{}/api/predict", port)).unwrap(),
            Duration::from_secs(2),
            Duration::ZERO,
        );
        let image = SelectedImage::new("stop.jpg", "image/jpeg", vec![0u8; 16]);

        let err = client.predict(&image).await.unwrap_err();
        assert!(matches!(err, PredictError::Unreachable(_)));
        assert!(err.to_string().starts_with("Cannot connect"));
    }
}
