//! Prediction history
//!
//! Keeps the most recent predictions, newest first, as one JSON list under
//! a fixed key of a [`KeyValueStore`]. Reads never fail: a missing,
//! corrupt, or unreachable store reads as an empty history. Writes are a
//! plain read-modify-write and are not coordinated between processes.

pub mod types;
pub use types::HistoryEntry;

use crate::config::HistoryConfig;
use crate::storage::{KeyValueStore, MemoryStore, SledStore};
use chrono::Utc;
use ulid::Ulid;

/// Key the history list is stored under
pub const HISTORY_KEY: &str = "trafficSignHistory";

/// Maximum number of entries kept
pub const HISTORY_CAPACITY: usize = 10;

/// Bounded, newest-first prediction history
pub struct HistoryStore {
    backend: Option<Box<dyn KeyValueStore>>,
}

impl HistoryStore {
    /// Create a history store on top of `backend`
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        Self {
            backend: Some(Box::new(backend)),
        }
    }

    /// A history kept only for the lifetime of this value
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    /// A history with no storage behind it
    ///
    /// `load` is always empty, `clear` does nothing, and `record` returns a
    /// list holding only the new entry.
    pub fn unavailable() -> Self {
        Self { backend: None }
    }

    /// Open the configured history
    ///
    /// Falls back to [`HistoryStore::unavailable`] when history is disabled
    /// or the database cannot be opened.
    pub fn open(config: &HistoryConfig) -> Self {
        if !config.enabled {
            tracing::debug!("Prediction history disabled");
            return Self::unavailable();
        }

        let opened = match &config.db_path {
            Some(path) => SledStore::open(path),
            None => SledStore::open_default(),
        };

        match opened {
            Ok(store) => Self::new(store),
            Err(e) => {
                tracing::warn!("Prediction history unavailable: {:#}", e);
                Self::unavailable()
            }
        }
    }

    /// Whether a storage backend is attached
    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    /// Record a prediction and return the updated history
    ///
    /// The new entry goes to the front, the list is cut to
    /// [`HISTORY_CAPACITY`] entries, persisted, and returned.
    ///
    /// # Arguments
    ///
    /// * `label` - Predicted label
    /// * `confidence` - Confidence in [0, 1], if known
    /// * `image` - `data:` URL of the classified image
    /// * `processing_time` - Duration of the prediction call in seconds
    ///
    /// # Examples
    ///
    /// ```
    /// use neuralens::history::HistoryStore;
    ///
    /// let history = HistoryStore::in_memory();
    /// let entries = history.record("Stop", Some(0.97), "data:image/png;base64,".to_string(), None);
    /// assert_eq!(entries.len(), 1);
    /// assert_eq!(history.load()[0].label, "Stop");
    /// ```
    pub fn record(
        &self,
        label: &str,
        confidence: Option<f64>,
        image: String,
        processing_time: Option<f64>,
    ) -> Vec<HistoryEntry> {
        let existing = self.load();

        let mut id = Ulid::new();
        if let Some(newest) = existing.first() {
            if id <= newest.id {
                id = newest.id.increment().unwrap_or(id);
            }
        }

        let entry = HistoryEntry {
            id,
            image,
            label: label.to_string(),
            confidence,
            timestamp: Utc::now(),
            processing_time,
        };

        let mut updated = Vec::with_capacity(HISTORY_CAPACITY);
        updated.push(entry);
        updated.extend(existing.into_iter().take(HISTORY_CAPACITY - 1));

        if let Some(backend) = &self.backend {
            let persisted = serde_json::to_vec(&updated)
                .map_err(anyhow::Error::from)
                .and_then(|json| backend.set(HISTORY_KEY, &json));
            if let Err(e) = persisted {
                tracing::warn!("Failed to persist prediction history: {:#}", e);
            }
        }

        updated
    }

    /// Read the history, newest first
    pub fn load(&self) -> Vec<HistoryEntry> {
        let Some(backend) = &self.backend else {
            return Vec::new();
        };

        let raw = match backend.get(HISTORY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to read prediction history: {:#}", e);
                return Vec::new();
            }
        };

        match serde_json::from_slice::<Vec<HistoryEntry>>(&raw) {
            Ok(mut entries) => {
                entries.truncate(HISTORY_CAPACITY);
                entries
            }
            Err(e) => {
                tracing::warn!("Ignoring corrupt prediction history: {}", e);
                Vec::new()
            }
        }
    }

    /// Erase the history
    pub fn clear(&self) {
        if let Some(backend) = &self.backend {
            if let Err(e) = backend.remove(HISTORY_KEY) {
                tracing::warn!("Failed to clear prediction history: {:#}", e);
            }
        }
    }
}

impl std::fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryStore")
            .field("available", &self.is_available())
            .finish()
    }
}
