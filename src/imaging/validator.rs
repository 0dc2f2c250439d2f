//! Upload validation
//!
//! Checks the declared MIME type and byte size of a selected file before
//! anything is sent over the network.

use crate::config::UploadConfig;
use crate::error::ValidationError;

/// MIME types accepted for upload (exact, case-sensitive)
pub const ACCEPTED_MIME_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "image/webp"];

/// Validates candidate uploads against the configured limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageValidator {
    max_file_size: u64,
}

impl ImageValidator {
    /// Create a validator with the given inclusive size limit (bytes)
    pub fn new(max_file_size: u64) -> Self {
        Self { max_file_size }
    }

    /// Create a validator from upload configuration
    pub fn from_config(config: &UploadConfig) -> Self {
        Self::new(config.max_file_size)
    }

    /// Configured size limit in bytes
    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Check a candidate file
    ///
    /// The type is checked first, then the size. A file of exactly
    /// `max_file_size` bytes is accepted.
    ///
    /// # Errors
    ///
    /// Returns the `ValidationError` whose message is shown to the user
    ///
    /// # Examples
    ///
    /// ```
    /// use neuralens::imaging::ImageValidator;
    ///
    /// let validator = ImageValidator::new(1024);
    /// assert!(validator.validate("image/png", 1024).is_ok());
    /// assert!(validator.validate("image/gif", 10).is_err());
    /// ```
    pub fn validate(&self, mime_type: &str, size: u64) -> Result<(), ValidationError> {
        if !ACCEPTED_MIME_TYPES.contains(&mime_type) {
            return Err(ValidationError::UnsupportedType {
                mime_type: mime_type.to_string(),
            });
        }

        if size > self.max_file_size {
            return Err(ValidationError::TooLarge {
                size,
                max_bytes: self.max_file_size,
            });
        }

        Ok(())
    }
}

impl Default for ImageValidator {
    fn default() -> Self {
        Self::from_config(&UploadConfig::default())
    }
}
