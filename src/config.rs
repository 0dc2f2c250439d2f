//! Configuration management for NeuraLens
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{NeuralensError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure for NeuraLens
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Prediction endpoint settings
    #[serde(default)]
    pub api: ApiConfig,
    /// Upload validation and compression limits
    #[serde(default)]
    pub upload: UploadConfig,
    /// Prediction history persistence
    #[serde(default)]
    pub history: HistoryConfig,
    /// Session display behavior
    #[serde(default)]
    pub session: SessionConfig,
}

/// Prediction endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Server origin used to resolve a relative `base_path`
    #[serde(default = "default_api_host")]
    pub host: String,

    /// API base; either a path (`/api`) or an absolute URL
    ///
    /// The prediction endpoint is `<base>/predict`.
    #[serde(default = "default_api_base_path")]
    pub base_path: String,

    /// Transport timeout for the prediction call (seconds)
    #[serde(default = "default_api_timeout")]
    pub timeout_seconds: u64,

    /// Minimum interval between two prediction requests (milliseconds)
    #[serde(default = "default_min_request_interval_ms")]
    pub min_request_interval_ms: u64,

    /// Fill in a placeholder confidence in [0.7, 1.0) when the server omits one
    #[serde(default)]
    pub synthesize_missing_confidence: bool,
}

fn default_api_host() -> String {
    "http://localhost:8000".to_string()
}

fn default_api_base_path() -> String {
    "/api".to_string()
}

fn default_api_timeout() -> u64 {
    30
}

fn default_min_request_interval_ms() -> u64 {
    2000
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_api_host(),
            base_path: default_api_base_path(),
            timeout_seconds: default_api_timeout(),
            min_request_interval_ms: default_min_request_interval_ms(),
            synthesize_missing_confidence: false,
        }
    }
}

impl ApiConfig {
    /// Full URL of the prediction endpoint
    ///
    /// An absolute `base_path` is used as is; a relative one is joined onto
    /// `host`.
    ///
    /// # Errors
    ///
    /// Returns `NeuralensError::Config` if the resulting URL does not parse
    ///
    /// # Examples
    ///
    /// ```
    /// use neuralens::config::ApiConfig;
    ///
    /// let api = ApiConfig::default();
    /// assert_eq!(
    ///     api.predict_url().unwrap().as_str(),
    ///     "http://localhost:8000/api/predict"
    /// );
    /// ```
    pub fn predict_url(&self) -> Result<url::Url> {
        let base = self.base_path.trim_end_matches('/');
        let raw = if base.starts_with("http://") || base.starts_with("https://") {
            format!("{}/predict", base)
        } else {
            let host = self.host.trim_end_matches('/');
            let path = base.trim_start_matches('/');
            if path.is_empty() {
                format!("{}/predict", host)
            } else {
                format!("{}/{}/predict", host, path)
            }
        };

        url::Url::parse(&raw).map_err(|e| {
            NeuralensError::Config(format!("Invalid prediction endpoint {}: {}", raw, e)).into()
        })
    }

    /// Transport timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Minimum inter-request interval as a `Duration`
    pub fn min_request_interval(&self) -> Duration {
        Duration::from_millis(self.min_request_interval_ms)
    }
}

/// Upload limits and client-side compression settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Maximum accepted file size (bytes, inclusive)
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    /// Files strictly larger than this are re-encoded before upload (bytes)
    #[serde(default = "default_compression_threshold")]
    pub compression_threshold: u64,

    /// Longest edge of a re-encoded image (pixels)
    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,

    /// JPEG quality of a re-encoded image (1-100)
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

fn default_max_file_size() -> u64 {
    10_485_760 // 10 MB
}

fn default_compression_threshold() -> u64 {
    1_048_576 // 1 MB
}

fn default_max_dimension() -> u32 {
    800
}

fn default_jpeg_quality() -> u8 {
    80
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
            compression_threshold: default_compression_threshold(),
            max_dimension: default_max_dimension(),
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

/// Prediction history persistence settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Persist predictions at all
    #[serde(default = "default_history_enabled")]
    pub enabled: bool,

    /// Location of the history database (defaults to the platform data dir)
    #[serde(default)]
    pub db_path: Option<PathBuf>,
}

fn default_history_enabled() -> bool {
    true
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: default_history_enabled(),
            db_path: None,
        }
    }
}

/// Session display settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Confidence at or above which a result is celebrated
    #[serde(default = "default_celebration_threshold")]
    pub celebration_threshold: f64,

    /// How long the celebration stays on (milliseconds)
    #[serde(default = "default_celebration_ms")]
    pub celebration_ms: u64,
}

fn default_celebration_threshold() -> f64 {
    0.8
}

fn default_celebration_ms() -> u64 {
    3000
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            celebration_threshold: default_celebration_threshold(),
            celebration_ms: default_celebration_ms(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| NeuralensError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| NeuralensError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(host) = std::env::var("NEURALENS_API_HOST") {
            tracing::debug!(host = %host, "Env override: NEURALENS_API_HOST");
            self.api.host = host;
        }

        if let Ok(base) = std::env::var("NEURALENS_API_BASE") {
            tracing::debug!(base = %base, "Env override: NEURALENS_API_BASE");
            self.api.base_path = base;
        }

        if let Ok(max_size) = std::env::var("NEURALENS_MAX_FILE_SIZE") {
            match max_size.parse::<u64>() {
                Ok(v) => self.upload.max_file_size = v,
                Err(_) => tracing::warn!("Invalid NEURALENS_MAX_FILE_SIZE: {}", max_size),
            }
        }

        if let Ok(timeout) = std::env::var("NEURALENS_TIMEOUT_SECONDS") {
            match timeout.parse::<u64>() {
                Ok(v) => self.api.timeout_seconds = v,
                Err(_) => tracing::warn!("Invalid NEURALENS_TIMEOUT_SECONDS: {}", timeout),
            }
        }

        if let Ok(db_path) = std::env::var("NEURALENS_HISTORY_DB") {
            self.history.db_path = Some(PathBuf::from(db_path));
        }

        if let Ok(synthesize) = std::env::var("NEURALENS_SYNTHESIZE_CONFIDENCE") {
            match synthesize.parse::<bool>() {
                Ok(v) => self.api.synthesize_missing_confidence = v,
                Err(_) => tracing::warn!(
                    "Invalid value for NEURALENS_SYNTHESIZE_CONFIDENCE: {}",
                    synthesize
                ),
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(base) = &cli.api_base {
            self.api.base_path = base.clone();
        }

        if let Some(db_path) = &cli.history_db {
            self.history.db_path = Some(db_path.clone());
        }

        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns `NeuralensError::Config` describing the first invalid value
    pub fn validate(&self) -> Result<()> {
        if self.api.host.trim().is_empty() {
            return Err(NeuralensError::Config("api.host cannot be empty".to_string()).into());
        }

        if self.api.base_path.trim().is_empty() {
            return Err(
                NeuralensError::Config("api.base_path cannot be empty".to_string()).into(),
            );
        }

        self.api.predict_url()?;

        if self.api.timeout_seconds == 0 {
            return Err(NeuralensError::Config(
                "api.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.upload.max_file_size == 0 {
            return Err(NeuralensError::Config(
                "upload.max_file_size must be greater than 0".to_string(),
            )
            .into());
        }

        if self.upload.max_dimension == 0 {
            return Err(NeuralensError::Config(
                "upload.max_dimension must be greater than 0".to_string(),
            )
            .into());
        }

        if !(1..=100).contains(&self.upload.jpeg_quality) {
            return Err(NeuralensError::Config(
                "upload.jpeg_quality must be between 1 and 100".to_string(),
            )
            .into());
        }

        if !(0.0..=1.0).contains(&self.session.celebration_threshold) {
            return Err(NeuralensError::Config(
                "session.celebration_threshold must be between 0.0 and 1.0".to_string(),
            )
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_path, "/api");
        assert_eq!(config.api.min_request_interval_ms, 2000);
        assert_eq!(config.upload.max_file_size, 10_485_760);
        assert_eq!(config.upload.compression_threshold, 1_048_576);
        assert_eq!(config.upload.max_dimension, 800);
        assert_eq!(config.upload.jpeg_quality, 80);
        assert!(!config.api.synthesize_missing_confidence);
        assert!(config.history.enabled);
    }

    #[test]
    fn test_config_validation_success() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_predict_url_relative_base() {
        let api = ApiConfig {
            host: "http://example.test:9000/".to_string(),
            base_path: "/v1/".to_string(),
            ..ApiConfig::default()
        };
        assert_eq!(
            api.predict_url().unwrap().as_str(),
            "http://example.test:9000/v1/predict"
        );
    }

    #[test]
    fn test_predict_url_absolute_base_ignores_host() {
        let api = ApiConfig {
            base_path: "https://signs.example.com/api".to_string(),
            ..ApiConfig::default()
        };
        assert_eq!(
            api.predict_url().unwrap().as_str(),
            "https://signs.example.com/api/predict"
        );
    }

    #[test]
    fn test_predict_url_root_base() {
        let api = ApiConfig {
            base_path: "/".to_string(),
            ..ApiConfig::default()
        };
        assert_eq!(
            api.predict_url().unwrap().as_str(),
            "http://localhost:8000/predict"
        );
    }

    #[test]
    fn test_config_validation_empty_host() {
        let mut config = Config::default();
        config.api.host = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_max_file_size() {
        let mut config = Config::default();
        config.upload.max_file_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_invalid_quality() {
        let mut config = Config::default();
        config.upload.jpeg_quality = 0;
        assert!(config.validate().is_err());
        config.upload.jpeg_quality = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_invalid_celebration_threshold() {
        let mut config = Config::default();
        config.session.celebration_threshold = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_yaml() {
        let yaml = r#"
api:
  host: http://classifier:8080
  base_path: /signs
  synthesize_missing_confidence: true
upload:
  max_file_size: 5242880
history:
  enabled: false
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.api.host, "http://classifier:8080");
        assert_eq!(config.api.base_path, "/signs");
        assert_eq!(config.api.timeout_seconds, 30);
        assert!(config.api.synthesize_missing_confidence);
        assert_eq!(config.upload.max_file_size, 5_242_880);
        assert_eq!(config.upload.jpeg_quality, 80);
        assert!(!config.history.enabled);
        assert_eq!(config.session.celebration_ms, 3000);
    }

    #[test]
    fn test_load_nonexistent_file_uses_defaults() {
        let cli = crate::cli::Cli::default();
        let config = Config::load("/nonexistent/neuralens.yaml", &cli).unwrap();
        assert_eq!(config.api.host, "http://localhost:8000");
    }

    #[test]
    fn test_cli_overrides_take_precedence() {
        let cli = crate::cli::Cli {
            api_base: Some("http://127.0.0.1:5000".to_string()),
            history_db: Some(PathBuf::from("/tmp/neuralens-history")),
            ..crate::cli::Cli::default()
        };
        let mut config = Config::default();
        config.apply_cli_overrides(&cli);
        assert_eq!(config.api.base_path, "http://127.0.0.1:5000");
        assert_eq!(
            config.history.db_path,
            Some(PathBuf::from("/tmp/neuralens-history"))
        );
    }

    #[test]
    #[serial]
    fn test_apply_env_vars_overrides_limits() {
        std::env::set_var("NEURALENS_MAX_FILE_SIZE", "2097152");
        std::env::set_var("NEURALENS_API_BASE", "/v2");
        std::env::set_var("NEURALENS_SYNTHESIZE_CONFIDENCE", "true");

        let mut config = Config::default();
        config.apply_env_vars();

        std::env::remove_var("NEURALENS_MAX_FILE_SIZE");
        std::env::remove_var("NEURALENS_API_BASE");
        std::env::remove_var("NEURALENS_SYNTHESIZE_CONFIDENCE");

        assert_eq!(config.upload.max_file_size, 2_097_152);
        assert_eq!(config.api.base_path, "/v2");
        assert!(config.api.synthesize_missing_confidence);
    }

    #[test]
    #[serial]
    fn test_apply_env_vars_ignores_invalid_numbers() {
        std::env::set_var("NEURALENS_MAX_FILE_SIZE", "ten megabytes");

        let mut config = Config::default();
        config.apply_env_vars();

        std::env::remove_var("NEURALENS_MAX_FILE_SIZE");

        assert_eq!(config.upload.max_file_size, 10_485_760);
    }
}
