use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tracing::warn;

use crate::shared::AppError;

pub const ACTOR_HEADER: &str = "x-actor-id";
pub const SESSION_HEADER: &str = "x-session-id";

/// Identity of whoever is invoking an operation.
///
/// Passed explicitly into every operation that needs to know the actor;
/// there is no ambient "current user".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorContext {
    pub actor_id: String,
    pub session_id: Option<String>,
}

impl ActorContext {
    pub fn new(actor_id: impl Into<String>) -> Self {
        Self {
            actor_id: actor_id.into(),
            session_id: None,
        }
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

/// Reads the actor from request headers set by the upstream identity layer
#[async_trait]
impl<S> FromRequestParts<S> for ActorContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let actor_id = parts
            .headers
            .get(ACTOR_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                warn!("Missing actor header in request");
                AppError::Unauthorized("Missing actor identity".to_string())
            })?;

        let mut context = ActorContext::new(actor_id);
        if let Some(session_id) = parts
            .headers
            .get(SESSION_HEADER)
            .and_then(|value| value.to_str().ok())
        {
            context = context.with_session(session_id);
        }

        Ok(context)
    }
}
