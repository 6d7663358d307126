use thiserror::Error;

use super::models::MatchStatus;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("Invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("Illegal transition from {from} to {to}")]
    IllegalTransition { from: MatchStatus, to: MatchStatus },

    #[error("Match {match_id} changed (expected version {expected}, found {actual}); refetch and retry")]
    StaleVersion {
        match_id: String,
        expected: i64,
        actual: i64,
    },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Store error: {0}")]
    Store(String),
}

impl MatchError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        MatchError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// True for the kinds a caller should surface as "refetch and retry"
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            MatchError::IllegalTransition { .. }
                | MatchError::StaleVersion { .. }
                | MatchError::Conflict(_)
        )
    }

    /// Only transient store failures are worth retrying automatically
    pub fn is_retryable(&self) -> bool {
        matches!(self, MatchError::Store(_))
    }
}
