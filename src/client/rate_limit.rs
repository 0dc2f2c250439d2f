//! Minimum-interval rate limiting for prediction requests

use crate::error::PredictError;
use std::time::{Duration, Instant};

/// Tracks when the last prediction request went out
///
/// A request is admitted only if at least `min_interval` has passed since
/// the previously admitted one.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    min_interval: Duration,
    last_request: Option<Instant>,
}

impl RateLimitState {
    /// Create a limiter that has not admitted any request yet
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: None,
        }
    }

    /// Admit a request now, or report how long to wait
    ///
    /// # Errors
    ///
    /// Returns `PredictError::RateLimited` with the remaining wait when the
    /// previous request was too recent. A refused request does not move the
    /// window.
    pub fn check_and_record(&mut self) -> Result<(), PredictError> {
        self.check_and_record_at(Instant::now())
    }

    /// Same as [`check_and_record`](Self::check_and_record) with an explicit clock reading
    pub fn check_and_record_at(&mut self, now: Instant) -> Result<(), PredictError> {
        if let Some(last) = self.last_request {
            let elapsed = now.saturating_duration_since(last);
            if elapsed < self.min_interval {
                return Err(PredictError::RateLimited {
                    wait: self.min_interval - elapsed,
                });
            }
        }

        self.last_request = Some(now);
        Ok(())
    }

    /// When the last admitted request went out
    pub fn last_request(&self) -> Option<Instant> {
        self.last_request
    }
}
