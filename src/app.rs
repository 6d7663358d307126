use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{matches, score, shared::AppState, stats};

/// Builds the HTTP router over the given state
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "matchbook" }))
        .route("/matches", post(matches::create_match))
        .route("/matches/:match_id", get(matches::get_match))
        .route(
            "/matches/:match_id/transitions",
            post(matches::transition_match),
        )
        .route(
            "/matches/:match_id/scores",
            post(matches::record_progress_score),
        )
        .route("/matches/:match_id/audit", get(matches::get_match_audit))
        .route("/scores/validate", post(score::validate_score))
        .route(
            "/players/:player_id/stats",
            get(stats::handlers::get_player_stats),
        )
        .route(
            "/players/:player_id/stats/resync",
            post(stats::handlers::resync_player),
        )
        .route("/stats/resync", post(stats::handlers::resync_all))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
