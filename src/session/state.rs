//! States of an interactive session

use std::fmt;

/// Where a session is in the select, predict, reset cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Nothing selected
    #[default]
    Idle,
    /// A valid image is selected and ready to send
    FileSelected,
    /// The prediction request is in flight
    Predicting,
    /// A prediction came back
    Resulted,
    /// Selection or prediction failed; the message is on the session
    Errored,
}

impl SessionState {
    /// Short lowercase name used in messages
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::FileSelected => "file selected",
            Self::Predicting => "predicting",
            Self::Resulted => "showing a result",
            Self::Errored => "showing an error",
        }
    }

    /// Whether `select` is allowed
    pub fn can_select(&self) -> bool {
        !matches!(self, Self::Predicting)
    }

    /// Whether `predict` is allowed
    pub fn can_predict(&self) -> bool {
        matches!(self, Self::FileSelected)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_idle() {
        assert_eq!(SessionState::default(), SessionState::Idle);
    }

    #[test]
    fn test_select_allowed_everywhere_but_predicting() {
        assert!(SessionState::Idle.can_select());
        assert!(SessionState::FileSelected.can_select());
        assert!(SessionState::Resulted.can_select());
        assert!(SessionState::Errored.can_select());
        assert!(!SessionState::Predicting.can_select());
    }

    #[test]
    fn test_predict_only_from_file_selected() {
        assert!(SessionState::FileSelected.can_predict());
        for state in [
            SessionState::Idle,
            SessionState::Predicting,
            SessionState::Resulted,
            SessionState::Errored,
        ] {
            assert!(!state.can_predict(), "{} should not predict", state);
        }
    }
}
