//! Prediction results and the wire format of `POST /predict`

use serde::{Deserialize, Deserializer, Serialize};

/// Outcome of a successful prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Predicted label
    pub label: String,
    /// Confidence in [0, 1]; `None` when the server did not report one
    pub confidence: Option<f64>,
    /// Round-trip time of the prediction call in seconds
    pub processing_time: Option<f64>,
    /// Numeric class reported by the server, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_id: Option<u32>,
}

impl PredictionResult {
    /// Confidence as a rounded percentage
    pub fn confidence_percent(&self) -> Option<u32> {
        self.confidence.map(|c| (c * 100.0).round() as u32)
    }

    /// Qualitative bucket of the confidence
    pub fn tier(&self) -> Option<ConfidenceTier> {
        self.confidence.map(ConfidenceTier::from_confidence)
    }
}

/// Qualitative confidence buckets used when rendering a result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceTier {
    /// 0.9 and above
    VeryHigh,
    /// 0.8 to 0.9
    High,
    /// 0.6 to 0.8
    Medium,
    /// 0.4 to 0.6
    Low,
    /// below 0.4
    VeryLow,
}

impl ConfidenceTier {
    /// Bucket a confidence in [0, 1]
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.9 {
            Self::VeryHigh
        } else if confidence >= 0.8 {
            Self::High
        } else if confidence >= 0.6 {
            Self::Medium
        } else if confidence >= 0.4 {
            Self::Low
        } else {
            Self::VeryLow
        }
    }

    /// Human-readable name
    pub fn label(&self) -> &'static str {
        match self {
            Self::VeryHigh => "Very High",
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
            Self::VeryLow => "Very Low",
        }
    }
}

/// Success body of `POST /predict`
///
/// Older servers send the label as `prediction`; when both keys are present
/// `label` wins.
#[derive(Debug, Deserialize)]
pub(crate) struct PredictResponse {
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    prediction: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default, deserialize_with = "lenient_class_id")]
    pub class_id: Option<u32>,
}

impl PredictResponse {
    /// Reported label, if the body carries one under either key
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref().or(self.prediction.as_deref())
    }
}

/// `class_id` is informational; a value of any other shape reads as absent
fn lenient_class_id<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_u64().and_then(|id| u32::try_from(id).ok()))
}
