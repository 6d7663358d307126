use std::sync::Arc;
use tracing::{debug, instrument};

use super::models::AuditEntry;
use crate::matches::{MatchError, MatchRepository};

/// Read-only view over the audit log of each match.
///
/// Entries are written only by `MatchService` as part of the same stored
/// write that commits the mutation they describe.
#[derive(Clone)]
pub struct AuditTrail {
    repository: Arc<dyn MatchRepository>,
}

impl AuditTrail {
    pub fn new(repository: Arc<dyn MatchRepository>) -> Self {
        Self { repository }
    }

    #[instrument(skip(self))]
    pub async fn read(&self, match_id: &str) -> Result<Vec<AuditEntry>, MatchError> {
        let record = self
            .repository
            .get_match(match_id)
            .await?
            .ok_or_else(|| MatchError::NotFound(format!("Match {} not found", match_id)))?;

        debug!(
            match_id = %match_id,
            entries = record.score_update_history.len(),
            "Audit trail read"
        );

        Ok(record.score_update_history.entries().to_vec())
    }
}
