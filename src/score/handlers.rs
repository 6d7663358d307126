use axum::{extract::State, Json};
use serde::Deserialize;
use tracing::instrument;

use super::models::ScoreValidation;
use crate::shared::AppState;

#[derive(Debug, Deserialize)]
pub struct ValidateScoreRequest {
    pub score_a: i32,
    pub score_b: i32,
}

/// HTTP handler for checking a score pair without recording it
///
/// POST /scores/validate
/// Always 200; rule violations are reported in the body
#[instrument(name = "validate_score", skip(state))]
pub async fn validate_score(
    State(state): State<AppState>,
    Json(request): Json<ValidateScoreRequest>,
) -> Json<ScoreValidation> {
    Json(state.validator.validate(request.score_a, request.score_b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::{ScoreSide, Severity};
    use crate::shared::test_utils::AppStateBuilder;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        routing::post,
        Router,
    };
    use tower::ServiceExt; // for `oneshot`

    async fn validate(score_a: i32, score_b: i32) -> ScoreValidation {
        let app = Router::new()
            .route("/scores/validate", post(validate_score))
            .with_state(AppStateBuilder::new().build());

        let request = Request::builder()
            .method("POST")
            .uri("/scores/validate")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                serde_json::json!({"score_a": score_a, "score_b": score_b}).to_string(),
            ))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_validate_reports_winner_and_warnings() {
        let result = validate(15, 21).await;
        assert!(result.is_valid);
        assert_eq!(result.winner, Some(ScoreSide::Second));
        assert_eq!(result.confidence, 100);

        let shutout = validate(21, 0).await;
        assert!(shutout
            .warnings
            .iter()
            .any(|w| w.severity == Severity::High));
    }

    #[tokio::test]
    async fn test_validate_reports_errors_in_body() {
        let result = validate(20, 18).await;
        assert!(!result.is_valid);
        assert!(result.winner.is_none());
        assert!(!result.errors.is_empty());
    }
}
