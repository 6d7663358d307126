use chrono::{DateTime, Utc};
use std::collections::HashMap;

use super::models::PlayerStats;
use crate::matches::{Match, MatchStatus};

/// Completed matches of `player_id`, one per match id, oldest first.
///
/// Matches without a completion timestamp sort as the epoch; ties on the
/// timestamp are broken by match id so the order never depends on how the
/// store happened to return rows.
pub fn chronological_history<'a>(player_id: &str, matches: &'a [Match]) -> Vec<&'a Match> {
    let mut unique: HashMap<&str, &Match> = HashMap::new();
    for record in matches {
        if record.status == MatchStatus::Completed && record.is_participant(player_id) {
            unique.entry(record.id.as_str()).or_insert(record);
        }
    }

    let mut history: Vec<&Match> = unique.into_values().collect();
    history.sort_by(|a, b| {
        let a_date = a.completed_date.unwrap_or_default();
        let b_date = b.completed_date.unwrap_or_default();
        a_date.cmp(&b_date).then_with(|| a.id.cmp(&b.id))
    });
    history
}

/// Recomputes a player's statistics from their full match history.
///
/// This is the only place wins, losses and streaks are derived; nothing
/// updates them incrementally.
pub fn aggregate(player_id: &str, matches: &[Match], synced_at: DateTime<Utc>) -> PlayerStats {
    let history = chronological_history(player_id, matches);

    let mut stats = PlayerStats::empty(player_id, synced_at);
    let mut running_streak = 0u32;

    for record in &history {
        if record.winner_id.as_deref() == Some(player_id) {
            stats.total_wins += 1;
            running_streak += 1;
            stats.max_win_streak = stats.max_win_streak.max(running_streak);
        } else {
            running_streak = 0;
        }
    }

    stats.games_played = history.len() as u32;
    stats.total_losses = stats.games_played - stats.total_wins;
    stats.win_streak = running_streak;
    stats.last_synced_match_count = stats.games_played;
    stats
}
