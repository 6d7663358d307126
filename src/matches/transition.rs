use super::models::MatchStatus;

/// Legal edges of the match lifecycle.
///
/// `Completed` and `Cancelled` are terminal. The direct
/// `Scheduled -> Completed` edge exists only for importing results of
/// matches that were played before being recorded, and is off by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransitionPolicy {
    pub allow_direct_completion: bool,
}

impl TransitionPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_direct_completion(mut self, allowed: bool) -> Self {
        self.allow_direct_completion = allowed;
        self
    }

    pub fn is_allowed(&self, from: MatchStatus, to: MatchStatus) -> bool {
        use MatchStatus::*;

        match (from, to) {
            (Scheduled, InProgress) => true,
            (Scheduled, Cancelled) => true,
            (Scheduled, Completed) => self.allow_direct_completion,
            (InProgress, Completed) => true,
            (InProgress, Cancelled) => true,
            _ => false,
        }
    }

    pub fn allowed_targets(&self, from: MatchStatus) -> Vec<MatchStatus> {
        use strum::IntoEnumIterator;

        MatchStatus::iter()
            .filter(|to| self.is_allowed(from, *to))
            .collect()
    }
}
