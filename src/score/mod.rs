// Public API - what other modules can use
pub use handlers::{validate_score, ValidateScoreRequest};
pub use models::{ScoreField, ScoreIssue, ScoreSide, ScoreValidation, ScoreWarning, Severity};
pub use validator::ScoreValidator;

// Internal modules
mod handlers;
mod models;
mod validator;

/// Scoring rules of the recorded game.
pub mod rules {
    /// The winner must reach at least this many points
    pub const MIN_WINNING_SCORE: i32 = 21;
    /// The winner must lead by at least this many points
    pub const MIN_WIN_MARGIN: i32 = 2;
    /// Any score above this is rejected outright
    pub const MAX_REASONABLE_SCORE: i32 = 50;
    /// Confidence every result starts at before heuristic penalties
    pub const BASE_CONFIDENCE: u8 = 100;
}

/// Tunable copy of [`rules`], mainly so tests and admin tooling can
/// validate against a variant rule set without touching the constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreRules {
    pub min_winning_score: i32,
    pub min_win_margin: i32,
    pub max_reasonable_score: i32,
}

impl Default for ScoreRules {
    fn default() -> Self {
        Self {
            min_winning_score: rules::MIN_WINNING_SCORE,
            min_win_margin: rules::MIN_WIN_MARGIN,
            max_reasonable_score: rules::MAX_REASONABLE_SCORE,
        }
    }
}
