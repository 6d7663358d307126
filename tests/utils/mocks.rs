use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use matchbook::{
    matches::{InMemoryMatchRepository, Match, MatchError, MatchRepository},
    stats::{InMemoryStatsRepository, PlayerStats, StatsError, StatsRepository},
};

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// Match store that fails the first `failures` reads of completed matches
pub struct FlakyMatchRepository {
    inner: Arc<InMemoryMatchRepository>,
    remaining_failures: AtomicU32,
    calls: AtomicU32,
}

#[allow(dead_code)]
impl FlakyMatchRepository {
    pub fn new(inner: Arc<InMemoryMatchRepository>, failures: u32) -> Self {
        Self {
            inner,
            remaining_failures: AtomicU32::new(failures),
            calls: AtomicU32::new(0),
        }
    }

    pub fn completed_reads(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MatchRepository for FlakyMatchRepository {
    async fn create_match(&self, record: &Match) -> Result<(), MatchError> {
        self.inner.create_match(record).await
    }

    async fn get_match(&self, match_id: &str) -> Result<Option<Match>, MatchError> {
        self.inner.get_match(match_id).await
    }

    async fn save_match(&self, record: &Match, expected_version: i64) -> Result<Match, MatchError> {
        self.inner.save_match(record, expected_version).await
    }

    async fn completed_matches_for_player(
        &self,
        player_id: &str,
    ) -> Result<Vec<Match>, MatchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .remaining_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(MatchError::Store("connection reset".to_string()));
        }
        self.inner.completed_matches_for_player(player_id).await
    }

    async fn completed_match_count(&self, player_id: &str) -> Result<usize, MatchError> {
        self.inner.completed_match_count(player_id).await
    }

    async fn players_with_completed_matches(&self) -> Result<Vec<String>, MatchError> {
        self.inner.players_with_completed_matches().await
    }
}

/// Match store whose completed-match query returns every row twice, like a
/// two-sided lookup that does not dedupe
pub struct DuplicatingMatchRepository {
    inner: Arc<InMemoryMatchRepository>,
}

#[allow(dead_code)]
impl DuplicatingMatchRepository {
    pub fn new(inner: Arc<InMemoryMatchRepository>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl MatchRepository for DuplicatingMatchRepository {
    async fn create_match(&self, record: &Match) -> Result<(), MatchError> {
        self.inner.create_match(record).await
    }

    async fn get_match(&self, match_id: &str) -> Result<Option<Match>, MatchError> {
        self.inner.get_match(match_id).await
    }

    async fn save_match(&self, record: &Match, expected_version: i64) -> Result<Match, MatchError> {
        self.inner.save_match(record, expected_version).await
    }

    async fn completed_matches_for_player(
        &self,
        player_id: &str,
    ) -> Result<Vec<Match>, MatchError> {
        let matches = self.inner.completed_matches_for_player(player_id).await?;
        Ok(matches.iter().chain(matches.iter()).cloned().collect())
    }

    async fn completed_match_count(&self, player_id: &str) -> Result<usize, MatchError> {
        self.inner.completed_match_count(player_id).await
    }

    async fn players_with_completed_matches(&self) -> Result<Vec<String>, MatchError> {
        self.inner.players_with_completed_matches().await
    }
}

/// Stats store that refuses writes for selected players
pub struct FailingStatsRepository {
    inner: InMemoryStatsRepository,
    failing_players: HashSet<String>,
}

#[allow(dead_code)]
impl FailingStatsRepository {
    pub fn new(failing_players: &[&str]) -> Self {
        Self {
            inner: InMemoryStatsRepository::new(),
            failing_players: failing_players.iter().map(|p| p.to_string()).collect(),
        }
    }
}

#[async_trait]
impl StatsRepository for FailingStatsRepository {
    async fn save_player_stats(&self, stats: &PlayerStats) -> Result<(), StatsError> {
        if self.failing_players.contains(&stats.player_id) {
            return Err(StatsError::Validation(format!(
                "stats for {} rejected",
                stats.player_id
            )));
        }
        self.inner.save_player_stats(stats).await
    }

    async fn get_player_stats(&self, player_id: &str) -> Result<Option<PlayerStats>, StatsError> {
        self.inner.get_player_stats(player_id).await
    }
}
