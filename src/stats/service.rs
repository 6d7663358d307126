use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex as AsyncMutex, RwLock};
use tracing::{debug, info, instrument, warn};

use super::{
    aggregator::aggregate,
    models::{PlayerStats, ResyncOutcome},
    repository::StatsRepository,
    StatsError,
};
use crate::matches::MatchRepository;

/// Derives and caches per-player statistics from completed matches
pub struct StatsService {
    matches: Arc<dyn MatchRepository>,
    repository: Arc<dyn StatsRepository>,
    player_mutexes: Arc<RwLock<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

impl StatsService {
    pub fn new(matches: Arc<dyn MatchRepository>, repository: Arc<dyn StatsRepository>) -> Self {
        Self {
            matches,
            repository,
            player_mutexes: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Recomputes a player's stats from their full completed-match history
    /// and persists the result in one write.
    ///
    /// Resyncs for the same player run one at a time; a second caller waits
    /// for the first to finish and then computes against the newer state.
    #[instrument(skip(self))]
    pub async fn resync(&self, player_id: &str) -> Result<PlayerStats, StatsError> {
        if player_id.trim().is_empty() {
            return Err(StatsError::Validation("player id is required".to_string()));
        }

        let player_lock = self.player_lock(player_id).await;
        let result = {
            let _guard = player_lock.lock().await;
            self.recompute(player_id).await
        };
        self.release_player_lock(player_id, player_lock).await;

        result
    }

    async fn recompute(&self, player_id: &str) -> Result<PlayerStats, StatsError> {
        let matches = self.matches.completed_matches_for_player(player_id).await?;
        debug!(fetched = matches.len(), "Loaded completed matches");

        let stats = aggregate(player_id, &matches, Utc::now());
        self.repository.save_player_stats(&stats).await?;

        info!(
            games_played = stats.games_played,
            wins = stats.total_wins,
            win_streak = stats.win_streak,
            max_win_streak = stats.max_win_streak,
            "Player stats resynced"
        );

        Ok(stats)
    }

    /// Resyncs every player with at least one completed match. One player
    /// failing does not stop the others.
    #[instrument(skip(self))]
    pub async fn resync_all(&self) -> Result<Vec<ResyncOutcome>, StatsError> {
        let players = self.matches.players_with_completed_matches().await?;
        info!(players = players.len(), "Starting bulk stats resync");

        let outcomes = futures::future::join_all(players.iter().map(|player_id| async move {
            match self.resync(player_id).await {
                Ok(_) => ResyncOutcome {
                    player_id: player_id.clone(),
                    success: true,
                    error: None,
                },
                Err(err) => {
                    warn!(player_id = %player_id, error = %err, "Player resync failed");
                    ResyncOutcome {
                        player_id: player_id.clone(),
                        success: false,
                        error: Some(err.to_string()),
                    }
                }
            }
        }))
        .await;

        let failed = outcomes.iter().filter(|o| !o.success).count();
        info!(
            succeeded = outcomes.len() - failed,
            failed, "Bulk stats resync finished"
        );

        Ok(outcomes)
    }

    /// Cached stats if they cover every completed match, otherwise a fresh resync
    #[instrument(skip(self))]
    pub async fn get_or_resync(&self, player_id: &str) -> Result<PlayerStats, StatsError> {
        if let Some(cached) = self.repository.get_player_stats(player_id).await? {
            let current = self.matches.completed_match_count(player_id).await?;
            if cached.last_synced_match_count as usize == current {
                debug!("Serving cached player stats");
                return Ok(cached);
            }
            debug!(
                cached = cached.last_synced_match_count,
                current, "Cached player stats are stale"
            );
        }

        self.resync(player_id).await
    }

    pub async fn get_stats(&self, player_id: &str) -> Result<Option<PlayerStats>, StatsError> {
        self.repository.get_player_stats(player_id).await
    }

    async fn player_lock(&self, player_id: &str) -> Arc<AsyncMutex<()>> {
        {
            let guard = self.player_mutexes.read().await;
            if let Some(lock) = guard.get(player_id) {
                return lock.clone();
            }
        }

        let mut guard = self.player_mutexes.write().await;
        guard
            .entry(player_id.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    /// Forgets the player's lock once no other caller holds or waits on it.
    /// The map and `lock` account for two strong references.
    async fn release_player_lock(&self, player_id: &str, lock: Arc<AsyncMutex<()>>) {
        let mut guard = self.player_mutexes.write().await;
        let tracked = guard
            .get(player_id)
            .is_some_and(|held| Arc::ptr_eq(held, &lock));
        if tracked && Arc::strong_count(&lock) == 2 {
            guard.remove(player_id);
        }
    }

    #[cfg(test)]
    async fn tracked_player_locks(&self) -> usize {
        self.player_mutexes.read().await.len()
    }
}
