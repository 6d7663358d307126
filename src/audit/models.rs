use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::matches::{Match, MatchStatus, ScorePair};

/// One immutable record of a score or status change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub updated_by: String,
    pub previous_scores: ScorePair,
    pub new_scores: ScorePair,
    pub previous_status: MatchStatus,
    pub new_status: MatchStatus,
}

impl AuditEntry {
    /// Captures the before/after snapshot of a mutation
    pub fn between(before: &Match, after: &Match, updated_by: &str, at: DateTime<Utc>) -> Self {
        Self {
            timestamp: at,
            updated_by: updated_by.to_string(),
            previous_scores: before.scores(),
            new_scores: after.scores(),
            previous_status: before.status,
            new_status: after.status,
        }
    }
}

/// Insertion-ordered, append-only sequence of audit entries.
///
/// There is no way to edit or remove an entry through this type; the only
/// mutation is [`AuditLog::append`], which is crate-private so that nothing
/// outside the match lifecycle can write to a log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AuditLog {
    entries: Vec<AuditEntry>,
}

impl AuditLog {
    /// Rebuilds a log from entries already persisted, in stored order
    pub(crate) fn from_stored(entries: Vec<AuditEntry>) -> Self {
        Self { entries }
    }

    pub(crate) fn append(&mut self, entry: AuditEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &AuditEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&AuditEntry> {
        self.entries.last()
    }

    /// True when `base` is an unmodified prefix of this log
    pub(crate) fn extends(&self, base: &AuditLog) -> bool {
        self.entries.len() >= base.entries.len()
            && self.entries[..base.entries.len()] == base.entries[..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(by: &str, from: MatchStatus, to: MatchStatus) -> AuditEntry {
        AuditEntry {
            timestamp: Utc::now(),
            updated_by: by.to_string(),
            previous_scores: ScorePair::default(),
            new_scores: ScorePair::default(),
            previous_status: from,
            new_status: to,
        }
    }

    #[test]
    fn append_keeps_insertion_order() {
        let mut log = AuditLog::default();
        log.append(entry("alice", MatchStatus::Scheduled, MatchStatus::InProgress));
        log.append(entry("bob", MatchStatus::InProgress, MatchStatus::Completed));

        let authors: Vec<&str> = log.iter().map(|e| e.updated_by.as_str()).collect();
        assert_eq!(authors, vec!["alice", "bob"]);
        assert_eq!(log.last().unwrap().new_status, MatchStatus::Completed);
    }

    #[test]
    fn extends_detects_rewritten_history() {
        let mut base = AuditLog::default();
        base.append(entry("alice", MatchStatus::Scheduled, MatchStatus::InProgress));

        let mut grown = base.clone();
        grown.append(entry("bob", MatchStatus::InProgress, MatchStatus::Cancelled));
        assert!(grown.extends(&base));
        assert!(!base.extends(&grown));

        let rewritten = AuditLog::from_stored(vec![entry(
            "mallory",
            MatchStatus::Scheduled,
            MatchStatus::InProgress,
        )]);
        assert!(!rewritten.extends(&base));
    }
}
