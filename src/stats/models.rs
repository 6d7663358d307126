use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Cached aggregate of a player's completed matches.
///
/// Always reconstructable from match history; `last_synced_at` and
/// `last_synced_match_count` say how fresh the cached copy is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub player_id: String,
    pub games_played: u32,
    pub total_wins: u32,
    pub total_losses: u32,
    /// Streak as of the player's most recent completed match
    pub win_streak: u32,
    pub max_win_streak: u32,
    pub last_synced_at: DateTime<Utc>,
    pub last_synced_match_count: u32,
}

impl PlayerStats {
    pub fn empty(player_id: &str, synced_at: DateTime<Utc>) -> Self {
        Self {
            player_id: player_id.to_string(),
            games_played: 0,
            total_wins: 0,
            total_losses: 0,
            win_streak: 0,
            max_win_streak: 0,
            last_synced_at: synced_at,
            last_synced_match_count: 0,
        }
    }

    /// The derived numbers, without sync metadata
    pub fn record(&self) -> StatsRecord {
        StatsRecord {
            games_played: self.games_played,
            total_wins: self.total_wins,
            total_losses: self.total_losses,
            win_streak: self.win_streak,
            max_win_streak: self.max_win_streak,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsRecord {
    pub games_played: u32,
    pub total_wins: u32,
    pub total_losses: u32,
    pub win_streak: u32,
    pub max_win_streak: u32,
}

/// Per-player result of a bulk resync
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResyncOutcome {
    pub player_id: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
