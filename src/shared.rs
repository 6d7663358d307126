use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::audit::AuditTrail;
use crate::config::AppConfig;
use crate::event::EventBus;
use crate::matches::{MatchError, MatchRepository, MatchService};
use crate::retry::RetryPolicy;
use crate::score::ScoreValidator;
use crate::stats::{StatsError, StatsRepository, StatsService};

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub match_service: Arc<MatchService>,
    pub stats_service: Arc<StatsService>,
    pub audit_trail: AuditTrail,
    pub validator: ScoreValidator,
    pub event_bus: EventBus,
    pub retry: RetryPolicy,
}

impl AppState {
    /// Wires services over the given repositories
    pub fn new(
        match_repository: Arc<dyn MatchRepository>,
        stats_repository: Arc<dyn StatsRepository>,
        config: &AppConfig,
    ) -> Self {
        let event_bus = EventBus::new();
        let validator = ScoreValidator::new();
        let stats_service = Arc::new(StatsService::new(
            Arc::clone(&match_repository),
            stats_repository,
        ));
        let match_service = Arc::new(
            MatchService::builder(Arc::clone(&match_repository))
                .with_policy(config.transition_policy())
                .with_validator(validator)
                .with_stats_service(Arc::clone(&stats_service))
                .with_event_bus(event_bus.clone())
                .build(),
        );

        Self {
            match_service,
            stats_service,
            audit_trail: AuditTrail::new(match_repository),
            validator,
            event_bus,
            retry: config.retry_policy(),
        }
    }
}

/// Wraps an already formatted message; the category travels in `kind`
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unavailable(String),
}

impl From<MatchError> for AppError {
    fn from(err: MatchError) -> Self {
        let message = err.to_string();
        match err {
            MatchError::Validation { .. } => AppError::Validation(message),
            MatchError::IllegalTransition { .. }
            | MatchError::StaleVersion { .. }
            | MatchError::Conflict(_) => AppError::Conflict(message),
            MatchError::Unauthorized(_) => AppError::Forbidden(message),
            MatchError::NotFound(_) => AppError::NotFound(message),
            MatchError::Store(_) => AppError::Unavailable(message),
        }
    }
}

impl From<StatsError> for AppError {
    fn from(err: StatsError) -> Self {
        match err {
            StatsError::Match(inner) => inner.into(),
            StatsError::Validation(msg) => AppError::Validation(msg),
            StatsError::Repository(msg) => AppError::Unavailable(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind) = match &self {
            AppError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation"),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "authorization"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "transient_store"),
        };

        let body = Json(json!({
            "error": self.to_string(),
            "kind": kind,
        }));

        (status, body).into_response()
    }
}
