use axum::{
    extract::{Path, State},
    Json,
};
use tracing::{info, instrument};

use super::models::{PlayerStats, ResyncOutcome};
use crate::shared::{AppError, AppState};

/// HTTP handler for reading a player's stats
///
/// GET /players/:player_id/stats
/// Serves the cached record, recomputing it first if it is stale
#[instrument(name = "get_player_stats", skip(state))]
pub async fn get_player_stats(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
) -> Result<Json<PlayerStats>, AppError> {
    let stats = state
        .retry
        .run("get_player_stats", || {
            state.stats_service.get_or_resync(&player_id)
        })
        .await?;

    Ok(Json(stats))
}

/// HTTP handler for forcing a resync of one player
///
/// POST /players/:player_id/stats/resync
#[instrument(name = "resync_player", skip(state))]
pub async fn resync_player(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
) -> Result<Json<PlayerStats>, AppError> {
    let stats = state
        .retry
        .run("resync_player", || state.stats_service.resync(&player_id))
        .await?;

    info!(player_id = %player_id, games_played = stats.games_played, "Player stats resynced");
    Ok(Json(stats))
}

/// HTTP handler for resyncing every player with completed matches
///
/// POST /stats/resync
/// Returns one outcome per player; individual failures do not fail the request
#[instrument(name = "resync_all", skip(state))]
pub async fn resync_all(
    State(state): State<AppState>,
) -> Result<Json<Vec<ResyncOutcome>>, AppError> {
    let outcomes = state
        .retry
        .run("resync_all", || state.stats_service.resync_all())
        .await?;

    Ok(Json(outcomes))
}
