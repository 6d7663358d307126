use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum_macros::EnumIter;
use uuid::Uuid;

use crate::audit::AuditLog;

/// Lifecycle status of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
pub enum MatchStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "Scheduled",
            MatchStatus::InProgress => "InProgress",
            MatchStatus::Completed => "Completed",
            MatchStatus::Cancelled => "Cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, MatchStatus::Completed | MatchStatus::Cancelled)
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Scheduled" => Ok(MatchStatus::Scheduled),
            "InProgress" => Ok(MatchStatus::InProgress),
            "Completed" => Ok(MatchStatus::Completed),
            "Cancelled" => Ok(MatchStatus::Cancelled),
            other => Err(format!("unknown match status '{}'", other)),
        }
    }
}

/// Score snapshot in player1/player2 order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScorePair {
    pub player1: i32,
    pub player2: i32,
}

impl ScorePair {
    pub fn new(player1: i32, player2: i32) -> Self {
        Self { player1, player2 }
    }
}

/// A two-player scored contest
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    pub id: String,
    pub player1_id: String,
    pub player2_id: String,
    pub player1_score: i32,
    pub player2_score: i32,
    pub status: MatchStatus,
    pub winner_id: Option<String>,
    pub loser_id: Option<String>,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub completed_date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub created_by: String,
    pub last_updated_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Optimistic concurrency token, bumped by every stored write
    pub version: i64,
    pub score_update_history: AuditLog,
}

impl Match {
    /// Creates a new scheduled match with a generated ID
    pub fn new(request: NewMatch, created_by: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            player1_id: request.player1_id,
            player2_id: request.player2_id,
            player1_score: 0,
            player2_score: 0,
            status: MatchStatus::Scheduled,
            winner_id: None,
            loser_id: None,
            scheduled_date: request.scheduled_date,
            completed_date: None,
            location: request.location,
            notes: request.notes,
            created_by: created_by.to_string(),
            last_updated_by: created_by.to_string(),
            created_at: now,
            updated_at: now,
            version: 1,
            score_update_history: AuditLog::default(),
        }
    }

    pub fn is_participant(&self, player_id: &str) -> bool {
        self.player1_id == player_id || self.player2_id == player_id
    }

    pub fn scores(&self) -> ScorePair {
        ScorePair::new(self.player1_score, self.player2_score)
    }

    /// Winner and loser are both unset, or both set to distinct participants
    /// with the winner holding the strictly higher score.
    pub fn has_consistent_result(&self) -> bool {
        match (&self.winner_id, &self.loser_id) {
            (None, None) => true,
            (Some(winner), Some(loser)) => {
                let winner_score = self.score_of(winner);
                let loser_score = self.score_of(loser);
                winner != loser
                    && matches!((winner_score, loser_score), (Some(w), Some(l)) if w > l)
            }
            _ => false,
        }
    }

    fn score_of(&self, player_id: &str) -> Option<i32> {
        if player_id == self.player1_id {
            Some(self.player1_score)
        } else if player_id == self.player2_id {
            Some(self.player2_score)
        } else {
            None
        }
    }
}

/// Request to schedule a new match
#[derive(Debug, Clone, Deserialize)]
pub struct NewMatch {
    pub player1_id: String,
    pub player2_id: String,
    #[serde(default)]
    pub scheduled_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Payload for a status transition.
///
/// `expected_version` and `expected_status` are preconditions checked
/// against the stored record, never against a client-held copy.
#[derive(Debug, Clone, Deserialize)]
pub struct TransitionRequest {
    pub target_status: MatchStatus,
    #[serde(default)]
    pub scores: Option<ScorePair>,
    #[serde(default)]
    pub expected_version: Option<i64>,
    #[serde(default)]
    pub expected_status: Option<MatchStatus>,
}

impl TransitionRequest {
    pub fn to(target_status: MatchStatus) -> Self {
        Self {
            target_status,
            scores: None,
            expected_version: None,
            expected_status: None,
        }
    }

    pub fn with_scores(mut self, player1: i32, player2: i32) -> Self {
        self.scores = Some(ScorePair::new(player1, player2));
        self
    }

    pub fn expecting_version(mut self, version: i64) -> Self {
        self.expected_version = Some(version);
        self
    }

    pub fn expecting_status(mut self, status: MatchStatus) -> Self {
        self.expected_status = Some(status);
        self
    }
}

/// Interim score update for a match that is in progress
#[derive(Debug, Clone, Deserialize)]
pub struct ScoreUpdateRequest {
    pub scores: ScorePair,
    #[serde(default)]
    pub expected_version: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn new_match() -> Match {
        Match::new(
            NewMatch {
                player1_id: "alice".to_string(),
                player2_id: "bob".to_string(),
                scheduled_date: None,
                location: Some("court 3".to_string()),
                notes: None,
            },
            "alice",
        )
    }

    #[test]
    fn new_match_starts_scheduled_without_result() {
        let record = new_match();
        assert_eq!(record.status, MatchStatus::Scheduled);
        assert_eq!(record.scores(), ScorePair::new(0, 0));
        assert_eq!(record.version, 1);
        assert!(record.score_update_history.is_empty());
        assert!(record.has_consistent_result());
    }

    #[test]
    fn status_round_trips_through_text() {
        for status in MatchStatus::iter() {
            assert_eq!(status.as_str().parse::<MatchStatus>(), Ok(status));
        }
        assert!("Finished".parse::<MatchStatus>().is_err());
    }

    #[test]
    fn result_consistency_requires_higher_winner_score() {
        let mut record = new_match();
        record.player1_score = 21;
        record.player2_score = 15;
        record.winner_id = Some("alice".to_string());
        record.loser_id = Some("bob".to_string());
        assert!(record.has_consistent_result());

        record.winner_id = Some("bob".to_string());
        record.loser_id = Some("alice".to_string());
        assert!(!record.has_consistent_result());

        record.loser_id = None;
        assert!(!record.has_consistent_result());
    }

    #[test]
    fn participant_check() {
        let record = new_match();
        assert!(record.is_participant("alice"));
        assert!(record.is_participant("bob"));
        assert!(!record.is_participant("mallory"));
    }
}
