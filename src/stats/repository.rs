use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::{models::PlayerStats, StatsError};

/// Cache of the last computed statistics per player
#[async_trait]
pub trait StatsRepository: Send + Sync {
    /// Replaces the stored stats for the player in a single write
    async fn save_player_stats(&self, stats: &PlayerStats) -> Result<(), StatsError>;
    async fn get_player_stats(&self, player_id: &str) -> Result<Option<PlayerStats>, StatsError>;
}

#[derive(Debug, Default)]
pub struct InMemoryStatsRepository {
    players: RwLock<HashMap<String, PlayerStats>>,
}

impl InMemoryStatsRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StatsRepository for InMemoryStatsRepository {
    async fn save_player_stats(&self, stats: &PlayerStats) -> Result<(), StatsError> {
        let mut players = self.players.write().await;
        players.insert(stats.player_id.clone(), stats.clone());
        Ok(())
    }

    async fn get_player_stats(&self, player_id: &str) -> Result<Option<PlayerStats>, StatsError> {
        let players = self.players.read().await;
        Ok(players.get(player_id).cloned())
    }
}

/// PostgreSQL implementation of stats repository
pub struct PostgresStatsRepository {
    pool: PgPool,
}

impl PostgresStatsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatsRepository for PostgresStatsRepository {
    #[instrument(skip(self, stats), fields(player_id = %stats.player_id))]
    async fn save_player_stats(&self, stats: &PlayerStats) -> Result<(), StatsError> {
        sqlx::query(
            "INSERT INTO player_stats (player_id, games_played, total_wins, total_losses, \
             win_streak, max_win_streak, last_synced_at, last_synced_match_count) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT (player_id) DO UPDATE SET games_played = $2, total_wins = $3, \
             total_losses = $4, win_streak = $5, max_win_streak = $6, last_synced_at = $7, \
             last_synced_match_count = $8",
        )
        .bind(&stats.player_id)
        .bind(stats.games_played as i32)
        .bind(stats.total_wins as i32)
        .bind(stats.total_losses as i32)
        .bind(stats.win_streak as i32)
        .bind(stats.max_win_streak as i32)
        .bind(stats.last_synced_at)
        .bind(stats.last_synced_match_count as i32)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to save player stats");
            StatsError::Repository(e.to_string())
        })?;

        debug!("Player stats saved in database");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_player_stats(&self, player_id: &str) -> Result<Option<PlayerStats>, StatsError> {
        let row = sqlx::query(
            "SELECT player_id, games_played, total_wins, total_losses, win_streak, \
             max_win_streak, last_synced_at, last_synced_match_count \
             FROM player_stats WHERE player_id = $1",
        )
        .bind(player_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, player_id = %player_id, "Failed to fetch player stats");
            StatsError::Repository(e.to_string())
        })?;

        Ok(row.map(|row| PlayerStats {
            player_id: row.get("player_id"),
            games_played: row.get::<i32, _>("games_played") as u32,
            total_wins: row.get::<i32, _>("total_wins") as u32,
            total_losses: row.get::<i32, _>("total_losses") as u32,
            win_streak: row.get::<i32, _>("win_streak") as u32,
            max_win_streak: row.get::<i32, _>("max_win_streak") as u32,
            last_synced_at: row.get("last_synced_at"),
            last_synced_match_count: row.get::<i32, _>("last_synced_match_count") as u32,
        }))
    }
}
