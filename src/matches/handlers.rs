use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::{info, instrument};

use super::models::{Match, NewMatch, ScoreUpdateRequest, TransitionRequest};
use crate::audit::AuditEntry;
use crate::session::ActorContext;
use crate::shared::{AppError, AppState};

/// HTTP handler for scheduling a match
///
/// POST /matches
/// The acting player must be one of the two players
#[instrument(name = "create_match", skip(state, request))]
pub async fn create_match(
    State(state): State<AppState>,
    ctx: ActorContext,
    Json(request): Json<NewMatch>,
) -> Result<(StatusCode, Json<Match>), AppError> {
    let record = state.match_service.create_match(&ctx, request).await?;

    info!(match_id = %record.id, "Match created");
    Ok((StatusCode::CREATED, Json(record)))
}

/// HTTP handler for reading a match
///
/// GET /matches/:match_id
#[instrument(name = "get_match", skip(state))]
pub async fn get_match(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
) -> Result<Json<Match>, AppError> {
    let record = state
        .retry
        .run("get_match", || state.match_service.get_match(&match_id))
        .await?;

    Ok(Json(record))
}

/// HTTP handler for moving a match through its lifecycle
///
/// POST /matches/:match_id/transitions
/// Body: `{"target_status": "Completed", "scores": {"player1": 21, "player2": 15}}`
#[instrument(name = "transition_match", skip(state, request))]
pub async fn transition_match(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
    ctx: ActorContext,
    Json(request): Json<TransitionRequest>,
) -> Result<Json<Match>, AppError> {
    let record = state
        .retry
        .run("transition_match", || {
            state
                .match_service
                .apply_transition(&ctx, &match_id, request.clone())
        })
        .await?;

    Ok(Json(record))
}

/// HTTP handler for interim score updates
///
/// POST /matches/:match_id/scores
#[instrument(name = "record_progress_score", skip(state, request))]
pub async fn record_progress_score(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
    ctx: ActorContext,
    Json(request): Json<ScoreUpdateRequest>,
) -> Result<Json<Match>, AppError> {
    let record = state
        .retry
        .run("record_progress_score", || {
            state
                .match_service
                .record_progress_score(&ctx, &match_id, request.clone())
        })
        .await?;

    Ok(Json(record))
}

/// HTTP handler for the audit log of a match
///
/// GET /matches/:match_id/audit
#[instrument(name = "get_match_audit", skip(state))]
pub async fn get_match_audit(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
) -> Result<Json<Vec<AuditEntry>>, AppError> {
    let entries = state
        .retry
        .run("get_match_audit", || state.audit_trail.read(&match_id))
        .await?;

    Ok(Json(entries))
}
