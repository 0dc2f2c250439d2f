//! Error types for NeuraLens
//!
//! This module defines the error types used throughout the client,
//! using `thiserror` for ergonomic error handling. The `Display` text of
//! the user-facing variants is the message shown to the user.

use std::time::Duration;
use thiserror::Error;

/// Why a selected file was rejected before upload
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// MIME type outside the accepted set
    #[error("Please upload a valid image (JPG, PNG, WEBP)")]
    UnsupportedType {
        /// The declared MIME type of the rejected file
        mime_type: String,
    },

    /// File larger than the configured maximum
    #[error("File too large. Maximum size is {}MB", whole_megabytes(.max_bytes))]
    TooLarge {
        /// Size of the rejected file in bytes
        size: u64,
        /// Configured maximum in bytes
        max_bytes: u64,
    },
}

fn whole_megabytes(bytes: &u64) -> u64 {
    (*bytes as f64 / 1024.0 / 1024.0).round() as u64
}

/// Outcome classes of a failed prediction call
///
/// Every variant is recoverable: the session can be reset and the request
/// retried.
#[derive(Error, Debug)]
pub enum PredictError {
    /// Refused locally because the previous request was too recent
    #[error("Please wait {} more second(s) before analyzing another image", wait_seconds(.wait))]
    RateLimited {
        /// Remaining time until a request is admitted again
        wait: Duration,
    },

    /// Server answered 413
    #[error("File too large for the server. Please choose a smaller image.")]
    PayloadTooLarge,

    /// Server answered 400
    #[error("Invalid image format. Please upload a JPG, PNG, or WEBP image.")]
    InvalidFormat,

    /// No response was received
    #[error("Cannot connect to the prediction server. Please make sure it is running and try again.")]
    Unreachable(#[source] reqwest::Error),

    /// Any other failure (unexpected status, unreadable body)
    #[error("Oops! Our AI got confused by this image. Please try another traffic sign!")]
    Failed(String),
}

fn wait_seconds(wait: &Duration) -> u64 {
    let millis = wait.as_millis() as u64;
    (millis + 999) / 1000
}

/// Main error type for NeuraLens operations
#[derive(Error, Debug)]
pub enum NeuralensError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Selected file was rejected
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Prediction call failed
    #[error(transparent)]
    Predict(#[from] PredictError),

    /// Session action not allowed in the current state
    #[error("Cannot {action} while {state}")]
    InvalidTransition {
        /// Requested action
        action: &'static str,
        /// Current state name
        state: &'static str,
    },

    /// History persistence errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Image decoding/encoding errors
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Result type alias for NeuraLens operations
///
/// Uses `anyhow::Error` so callers can attach context while the typed
/// variants above stay reachable through `downcast_ref`.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_type_message() {
        let error = ValidationError::UnsupportedType {
            mime_type: "image/gif".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Please upload a valid image (JPG, PNG, WEBP)"
        );
    }

    #[test]
    fn test_too_large_message_reports_limit_in_mb() {
        let error = ValidationError::TooLarge {
            size: 11_000_000,
            max_bytes: 10_485_760,
        };
        assert_eq!(error.to_string(), "File too large. Maximum size is 10MB");
    }

    #[test]
    fn test_too_large_message_rounds_limit() {
        let error = ValidationError::TooLarge {
            size: 3_000_000,
            max_bytes: 2_500_000,
        };
        // 2.38 MiB rounds to 2
        assert_eq!(error.to_string(), "File too large. Maximum size is 2MB");
    }

    #[test]
    fn test_rate_limited_message_rounds_wait_up() {
        let error = PredictError::RateLimited {
            wait: Duration::from_millis(1200),
        };
        assert_eq!(
            error.to_string(),
            "Please wait 2 more second(s) before analyzing another image"
        );
    }

    #[test]
    fn test_predict_messages_are_distinct() {
        let messages = [
            PredictError::PayloadTooLarge.to_string(),
            PredictError::InvalidFormat.to_string(),
            PredictError::Failed("boom".to_string()).to_string(),
        ];
        assert!(messages[0].contains("too large"));
        assert!(messages[1].contains("Invalid image format"));
        assert!(messages[2].contains("try another"));
    }

    #[test]
    fn test_validation_error_is_transparent() {
        let error: NeuralensError = ValidationError::UnsupportedType {
            mime_type: "text/plain".to_string(),
        }
        .into();
        assert_eq!(
            error.to_string(),
            "Please upload a valid image (JPG, PNG, WEBP)"
        );
    }

    #[test]
    fn test_invalid_transition_display() {
        let error = NeuralensError::InvalidTransition {
            action: "predict",
            state: "idle",
        };
        assert_eq!(error.to_string(), "Cannot predict while idle");
    }

    #[test]
    fn test_config_error_display() {
        let error = NeuralensError::Config("invalid format".to_string());
        assert_eq!(error.to_string(), "Configuration error: invalid format");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: NeuralensError = io_error.into();
        assert!(matches!(error, NeuralensError::Io(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<NeuralensError>();
    }
}
