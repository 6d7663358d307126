use serde::Serialize;

use crate::matches::{MatchStatus, ScorePair};

/// Events published after a match mutation is committed
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatchEvent {
    Transitioned {
        match_id: String,
        from: MatchStatus,
        to: MatchStatus,
        actor_id: String,
        version: i64,
    },
    ScoreUpdated {
        match_id: String,
        scores: ScorePair,
        actor_id: String,
        version: i64,
    },
}

impl MatchEvent {
    pub fn match_id(&self) -> &str {
        match self {
            MatchEvent::Transitioned { match_id, .. } => match_id,
            MatchEvent::ScoreUpdated { match_id, .. } => match_id,
        }
    }
}
