use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of a submitted score pair won
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSide {
    First,
    Second,
}

/// The score field a validation issue refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreField {
    First,
    Second,
    Both,
}

impl fmt::Display for ScoreField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreField::First => write!(f, "player1_score"),
            ScoreField::Second => write!(f, "player2_score"),
            ScoreField::Both => write!(f, "scores"),
        }
    }
}

/// A rule violation that makes a score pair illegal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreIssue {
    pub field: ScoreField,
    pub message: String,
}

impl ScoreIssue {
    pub(super) fn new(field: ScoreField, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Confidence points deducted when a pattern of this severity matches
    pub fn penalty(self) -> u8 {
        match self {
            Severity::Low => 5,
            Severity::Medium => 15,
            Severity::High => 30,
        }
    }
}

/// A legal but statistically unusual pattern, advisory only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreWarning {
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreValidation {
    pub is_valid: bool,
    pub errors: Vec<ScoreIssue>,
    pub warnings: Vec<ScoreWarning>,
    /// Set only when the pair is valid
    pub winner: Option<ScoreSide>,
    pub confidence: u8,
}

impl ScoreValidation {
    /// First blocking issue, used when surfacing a single field-level reason
    pub fn first_error(&self) -> Option<&ScoreIssue> {
        self.errors.first()
    }
}
