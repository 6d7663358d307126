// Public API - what other modules can use
pub use errors::MatchError;
pub use handlers::{
    create_match, get_match, get_match_audit, record_progress_score, transition_match,
};
pub use models::{
    Match, MatchStatus, NewMatch, ScorePair, ScoreUpdateRequest, TransitionRequest,
};
pub use repository::{InMemoryMatchRepository, MatchRepository, PostgresMatchRepository};
pub use service::{MatchService, MatchServiceBuilder};
pub use transition::TransitionPolicy;

// Internal modules
mod errors;
mod handlers;
pub mod models;
pub mod repository;
pub mod service;
mod transition;
