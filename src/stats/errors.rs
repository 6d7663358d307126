use thiserror::Error;

use crate::matches::MatchError;

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Match(#[from] MatchError),
}

impl StatsError {
    pub fn is_retryable(&self) -> bool {
        match self {
            StatsError::Repository(_) => true,
            StatsError::Match(err) => err.is_retryable(),
            StatsError::Validation(_) => false,
        }
    }
}
