use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};
use std::collections::{BTreeSet, HashMap};
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::{
    errors::MatchError,
    models::{Match, MatchStatus, ScorePair},
};
use crate::audit::{AuditEntry, AuditLog};

/// Record store for matches and their audit logs
#[async_trait]
pub trait MatchRepository: Send + Sync {
    async fn create_match(&self, record: &Match) -> Result<(), MatchError>;
    async fn get_match(&self, match_id: &str) -> Result<Option<Match>, MatchError>;

    /// Compare-and-swap write: succeeds only if the stored version still equals
    /// `expected_version`, and returns the stored record with its bumped version.
    /// The audit log of `record` must extend the stored one.
    async fn save_match(&self, record: &Match, expected_version: i64)
        -> Result<Match, MatchError>;

    /// Completed matches where the player is on either side. Implementations
    /// may return the same match more than once.
    async fn completed_matches_for_player(&self, player_id: &str)
        -> Result<Vec<Match>, MatchError>;

    async fn completed_match_count(&self, player_id: &str) -> Result<usize, MatchError>;

    async fn players_with_completed_matches(&self) -> Result<Vec<String>, MatchError>;
}

/// In-memory implementation of MatchRepository for development and testing
#[derive(Debug, Default)]
pub struct InMemoryMatchRepository {
    matches: RwLock<HashMap<String, Match>>,
}

impl InMemoryMatchRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an in-memory repository with pre-populated matches
    pub fn with_matches(matches: Vec<Match>) -> Self {
        let map = matches.into_iter().map(|m| (m.id.clone(), m)).collect();
        Self {
            matches: RwLock::new(map),
        }
    }
}

#[async_trait]
impl MatchRepository for InMemoryMatchRepository {
    #[instrument(skip(self, record))]
    async fn create_match(&self, record: &Match) -> Result<(), MatchError> {
        debug!(match_id = %record.id, "Creating match in memory");

        let mut matches = self.matches.write().await;
        if matches.contains_key(&record.id) {
            warn!(match_id = %record.id, "Match already exists in memory");
            return Err(MatchError::Conflict(format!(
                "Match {} already exists",
                record.id
            )));
        }
        matches.insert(record.id.clone(), record.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_match(&self, match_id: &str) -> Result<Option<Match>, MatchError> {
        let matches = self.matches.read().await;
        Ok(matches.get(match_id).cloned())
    }

    #[instrument(skip(self, record), fields(match_id = %record.id))]
    async fn save_match(
        &self,
        record: &Match,
        expected_version: i64,
    ) -> Result<Match, MatchError> {
        let mut matches = self.matches.write().await;

        let stored = matches
            .get(&record.id)
            .ok_or_else(|| MatchError::NotFound(format!("Match {} not found", record.id)))?;

        if stored.version != expected_version {
            debug!(
                expected = expected_version,
                actual = stored.version,
                "Version check failed"
            );
            return Err(MatchError::StaleVersion {
                match_id: record.id.clone(),
                expected: expected_version,
                actual: stored.version,
            });
        }

        if !record.score_update_history.extends(&stored.score_update_history) {
            warn!("Rejected write that rewrites audit history");
            return Err(MatchError::Conflict(
                "Audit history is append-only".to_string(),
            ));
        }

        let mut updated = record.clone();
        updated.version = expected_version + 1;
        matches.insert(updated.id.clone(), updated.clone());

        debug!(version = updated.version, "Match saved in memory");
        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn completed_matches_for_player(
        &self,
        player_id: &str,
    ) -> Result<Vec<Match>, MatchError> {
        let matches = self.matches.read().await;
        Ok(matches
            .values()
            .filter(|m| m.status == MatchStatus::Completed && m.is_participant(player_id))
            .cloned()
            .collect())
    }

    async fn completed_match_count(&self, player_id: &str) -> Result<usize, MatchError> {
        let matches = self.matches.read().await;
        Ok(matches
            .values()
            .filter(|m| m.status == MatchStatus::Completed && m.is_participant(player_id))
            .count())
    }

    #[instrument(skip(self))]
    async fn players_with_completed_matches(&self) -> Result<Vec<String>, MatchError> {
        let matches = self.matches.read().await;
        let players: BTreeSet<String> = matches
            .values()
            .filter(|m| m.status == MatchStatus::Completed)
            .flat_map(|m| [m.player1_id.clone(), m.player2_id.clone()])
            .collect();
        Ok(players.into_iter().collect())
    }
}

const MATCH_COLUMNS: &str = "id, player1_id, player2_id, player1_score, player2_score, status, \
     winner_id, loser_id, scheduled_date, completed_date, location, notes, created_by, \
     last_updated_by, created_at, updated_at, version";

const AUDIT_COLUMNS: &str = "recorded_at, updated_by, previous_player1_score, \
     previous_player2_score, new_player1_score, new_player2_score, previous_status, new_status";

/// PostgreSQL implementation of match repository
pub struct PostgresMatchRepository {
    pool: PgPool,
}

impl PostgresMatchRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_history(
        &self,
        match_ids: &[String],
    ) -> Result<HashMap<String, Vec<AuditEntry>>, MatchError> {
        let rows = sqlx::query(&format!(
            "SELECT match_id, {} FROM match_audit_entries \
             WHERE match_id = ANY($1) ORDER BY match_id, seq",
            AUDIT_COLUMNS
        ))
        .bind(match_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        let mut history: HashMap<String, Vec<AuditEntry>> = HashMap::new();
        for row in rows {
            let match_id: String = row.get("match_id");
            history
                .entry(match_id)
                .or_default()
                .push(audit_entry_from_row(&row)?);
        }
        Ok(history)
    }

    async fn hydrate(&self, rows: Vec<PgRow>) -> Result<Vec<Match>, MatchError> {
        let ids: Vec<String> = rows.iter().map(|row| row.get("id")).collect();
        let mut history = self.load_history(&ids).await?;

        rows.iter()
            .map(|row| {
                let id: String = row.get("id");
                let entries = history.remove(&id).unwrap_or_default();
                match_from_row(row, AuditLog::from_stored(entries))
            })
            .collect()
    }
}

#[async_trait]
impl MatchRepository for PostgresMatchRepository {
    #[instrument(skip(self, record))]
    async fn create_match(&self, record: &Match) -> Result<(), MatchError> {
        debug!(match_id = %record.id, "Creating match in database");

        sqlx::query(&format!(
            "INSERT INTO matches ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)",
            MATCH_COLUMNS
        ))
        .bind(&record.id)
        .bind(&record.player1_id)
        .bind(&record.player2_id)
        .bind(record.player1_score)
        .bind(record.player2_score)
        .bind(record.status.as_str())
        .bind(&record.winner_id)
        .bind(&record.loser_id)
        .bind(record.scheduled_date)
        .bind(record.completed_date)
        .bind(&record.location)
        .bind(&record.notes)
        .bind(&record.created_by)
        .bind(&record.last_updated_by)
        .bind(record.created_at)
        .bind(record.updated_at)
        .bind(record.version)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to create match in database");
            match e.as_database_error() {
                Some(db) if db.is_unique_violation() => {
                    MatchError::Conflict(format!("Match {} already exists", record.id))
                }
                _ => MatchError::Store(e.to_string()),
            }
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_match(&self, match_id: &str) -> Result<Option<Match>, MatchError> {
        let row = sqlx::query(&format!("SELECT {} FROM matches WHERE id = $1", MATCH_COLUMNS))
            .bind(match_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;

        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => {
                debug!(match_id = %match_id, "Match not found in database");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, record), fields(match_id = %record.id))]
    async fn save_match(
        &self,
        record: &Match,
        expected_version: i64,
    ) -> Result<Match, MatchError> {
        let mut tx = self.pool.begin().await.map_err(store_error)?;

        let result = sqlx::query(
            "UPDATE matches SET player1_score = $3, player2_score = $4, status = $5, \
             winner_id = $6, loser_id = $7, scheduled_date = $8, completed_date = $9, \
             location = $10, notes = $11, last_updated_by = $12, updated_at = $13, \
             version = version + 1 \
             WHERE id = $1 AND version = $2",
        )
        .bind(&record.id)
        .bind(expected_version)
        .bind(record.player1_score)
        .bind(record.player2_score)
        .bind(record.status.as_str())
        .bind(&record.winner_id)
        .bind(&record.loser_id)
        .bind(record.scheduled_date)
        .bind(record.completed_date)
        .bind(&record.location)
        .bind(&record.notes)
        .bind(&record.last_updated_by)
        .bind(record.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(store_error)?;

        if result.rows_affected() == 0 {
            let actual: Option<i64> = sqlx::query_scalar("SELECT version FROM matches WHERE id = $1")
                .bind(&record.id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(store_error)?;
            tx.rollback().await.map_err(store_error)?;

            return Err(match actual {
                Some(actual) => MatchError::StaleVersion {
                    match_id: record.id.clone(),
                    expected: expected_version,
                    actual,
                },
                None => MatchError::NotFound(format!("Match {} not found", record.id)),
            });
        }

        let stored_rows = sqlx::query(&format!(
            "SELECT {} FROM match_audit_entries WHERE match_id = $1 ORDER BY seq FOR UPDATE",
            AUDIT_COLUMNS
        ))
        .bind(&record.id)
        .fetch_all(&mut *tx)
        .await
        .map_err(store_error)?;

        let stored_history = AuditLog::from_stored(
            stored_rows
                .iter()
                .map(audit_entry_from_row)
                .collect::<Result<Vec<_>, _>>()?,
        );
        if !record.score_update_history.extends(&stored_history) {
            tx.rollback().await.map_err(store_error)?;
            warn!("Rejected write that rewrites audit history");
            return Err(MatchError::Conflict(
                "Audit history is append-only".to_string(),
            ));
        }

        let stored_entries = stored_history.len();
        for (seq, entry) in record
            .score_update_history
            .iter()
            .enumerate()
            .skip(stored_entries)
        {
            sqlx::query(
                "INSERT INTO match_audit_entries (match_id, seq, recorded_at, updated_by, \
                 previous_player1_score, previous_player2_score, new_player1_score, \
                 new_player2_score, previous_status, new_status) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
            )
            .bind(&record.id)
            .bind(seq as i32)
            .bind(entry.timestamp)
            .bind(&entry.updated_by)
            .bind(entry.previous_scores.player1)
            .bind(entry.previous_scores.player2)
            .bind(entry.new_scores.player1)
            .bind(entry.new_scores.player2)
            .bind(entry.previous_status.as_str())
            .bind(entry.new_status.as_str())
            .execute(&mut *tx)
            .await
            .map_err(store_error)?;
        }

        tx.commit().await.map_err(store_error)?;

        let mut updated = record.clone();
        updated.version = expected_version + 1;
        debug!(version = updated.version, "Match saved in database");
        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn completed_matches_for_player(
        &self,
        player_id: &str,
    ) -> Result<Vec<Match>, MatchError> {
        // Two indexed lookups rather than an OR; the caller dedupes by id.
        let mut rows = Vec::new();
        for column in ["player1_id", "player2_id"] {
            let side = sqlx::query(&format!(
                "SELECT {} FROM matches WHERE status = 'Completed' AND {} = $1",
                MATCH_COLUMNS, column
            ))
            .bind(player_id)
            .fetch_all(&self.pool)
            .await
            .map_err(store_error)?;
            rows.extend(side);
        }

        debug!(player_id = %player_id, rows = rows.len(), "Completed matches fetched");
        self.hydrate(rows).await
    }

    async fn completed_match_count(&self, player_id: &str) -> Result<usize, MatchError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM matches WHERE status = 'Completed' \
             AND (player1_id = $1 OR player2_id = $1)",
        )
        .bind(player_id)
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)?;
        Ok(count as usize)
    }

    #[instrument(skip(self))]
    async fn players_with_completed_matches(&self) -> Result<Vec<String>, MatchError> {
        sqlx::query_scalar(
            "SELECT player1_id FROM matches WHERE status = 'Completed' \
             UNION SELECT player2_id FROM matches WHERE status = 'Completed' \
             ORDER BY 1",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)
    }
}

fn store_error(e: sqlx::Error) -> MatchError {
    warn!(error = %e, "Match store operation failed");
    MatchError::Store(e.to_string())
}

fn parse_status(raw: String) -> Result<MatchStatus, MatchError> {
    raw.parse().map_err(MatchError::Store)
}

fn audit_entry_from_row(row: &PgRow) -> Result<AuditEntry, MatchError> {
    Ok(AuditEntry {
        timestamp: row.get("recorded_at"),
        updated_by: row.get("updated_by"),
        previous_scores: ScorePair::new(
            row.get("previous_player1_score"),
            row.get("previous_player2_score"),
        ),
        new_scores: ScorePair::new(row.get("new_player1_score"), row.get("new_player2_score")),
        previous_status: parse_status(row.get("previous_status"))?,
        new_status: parse_status(row.get("new_status"))?,
    })
}

fn match_from_row(row: &PgRow, history: AuditLog) -> Result<Match, MatchError> {
    Ok(Match {
        id: row.get("id"),
        player1_id: row.get("player1_id"),
        player2_id: row.get("player2_id"),
        player1_score: row.get("player1_score"),
        player2_score: row.get("player2_score"),
        status: parse_status(row.get("status"))?,
        winner_id: row.get("winner_id"),
        loser_id: row.get("loser_id"),
        scheduled_date: row.get("scheduled_date"),
        completed_date: row.get("completed_date"),
        location: row.get("location"),
        notes: row.get("notes"),
        created_by: row.get("created_by"),
        last_updated_by: row.get("last_updated_by"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        version: row.get("version"),
        score_update_history: history,
    })
}
