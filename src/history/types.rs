//! Persisted form of one history entry

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// One past prediction as kept in the history list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Unique identifier; later entries sort after earlier ones
    pub id: Ulid,
    /// `data:` URL of the uploaded image
    pub image: String,
    /// Predicted label
    pub label: String,
    /// Confidence in [0, 1], absent when the server reported none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// When the prediction was recorded
    pub timestamp: DateTime<Utc>,
    /// Round-trip time of the prediction call in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_time: Option<f64>,
}
