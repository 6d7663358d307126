use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use super::{
    errors::MatchError,
    models::{Match, MatchStatus, NewMatch, ScoreUpdateRequest, TransitionRequest},
    repository::MatchRepository,
    transition::TransitionPolicy,
};
use crate::{
    audit::AuditEntry,
    event::{EventBus, MatchEvent},
    score::ScoreValidator,
    session::ActorContext,
    stats::StatsService,
};

/// Owns the lifecycle of match records.
///
/// Every mutation is a read of the authoritative record, a pure transform,
/// and a compare-and-swap write against the version that was read. Losing a
/// race surfaces as a conflict; nothing is merged.
pub struct MatchService {
    repository: Arc<dyn MatchRepository>,
    validator: ScoreValidator,
    policy: TransitionPolicy,
    stats_service: Option<Arc<StatsService>>,
    event_bus: Option<EventBus>,
}

impl MatchService {
    pub fn builder(repository: Arc<dyn MatchRepository>) -> MatchServiceBuilder {
        MatchServiceBuilder::new(repository)
    }

    /// Schedules a new match on behalf of one of its two players
    #[instrument(skip(self, request), fields(actor_id = %ctx.actor_id))]
    pub async fn create_match(
        &self,
        ctx: &ActorContext,
        request: NewMatch,
    ) -> Result<Match, MatchError> {
        if request.player1_id.trim().is_empty() {
            return Err(MatchError::validation("player1_id", "player is required"));
        }
        if request.player2_id.trim().is_empty() {
            return Err(MatchError::validation("player2_id", "player is required"));
        }
        if request.player1_id == request.player2_id {
            return Err(MatchError::validation(
                "player2_id",
                "a match needs two different players",
            ));
        }
        if ctx.actor_id != request.player1_id && ctx.actor_id != request.player2_id {
            warn!("Non-participant tried to create a match");
            return Err(MatchError::Unauthorized(format!(
                "{} is not a player in this match",
                ctx.actor_id
            )));
        }

        let record = Match::new(request, &ctx.actor_id);
        self.repository.create_match(&record).await?;

        info!(match_id = %record.id, "Match scheduled");

        Ok(record)
    }

    #[instrument(skip(self))]
    pub async fn get_match(&self, match_id: &str) -> Result<Match, MatchError> {
        self.load(match_id).await
    }

    /// Moves a match to `request.target_status`.
    ///
    /// Completing a match validates the final scores, assigns winner and
    /// loser, stamps the completion date and then resyncs both players'
    /// stats. Stats failures after the commit are logged, not returned:
    /// the match result stands and stats can be resynced later.
    #[instrument(
        skip(self, request),
        fields(actor_id = %ctx.actor_id, target = %request.target_status)
    )]
    pub async fn apply_transition(
        &self,
        ctx: &ActorContext,
        match_id: &str,
        request: TransitionRequest,
    ) -> Result<Match, MatchError> {
        let current = self.load(match_id).await?;
        self.check_preconditions(&current, request.expected_version, request.expected_status)?;

        let from = current.status;
        let to = request.target_status;

        if !self.policy.is_allowed(from, to) {
            warn!(from = %from, to = %to, "Rejected illegal transition");
            return Err(MatchError::IllegalTransition { from, to });
        }

        self.require_participant(&current, ctx)?;

        let now = Utc::now();
        let mut next = current.clone();
        next.status = to;

        if to == MatchStatus::Completed {
            let scores = request
                .scores
                .ok_or_else(|| MatchError::validation("scores", "final scores are required"))?;

            let validation = self.validator.validate(scores.player1, scores.player2);
            if let Some(issue) = validation.first_error() {
                debug!(reason = %issue.message, "Final score rejected");
                return Err(MatchError::validation(
                    issue.field.to_string(),
                    issue.message.clone(),
                ));
            }
            if !validation.warnings.is_empty() {
                info!(
                    confidence = validation.confidence,
                    warnings = validation.warnings.len(),
                    "Final score accepted with review warnings"
                );
            }

            let (winner, loser) = if scores.player1 > scores.player2 {
                (&current.player1_id, &current.player2_id)
            } else {
                (&current.player2_id, &current.player1_id)
            };

            next.player1_score = scores.player1;
            next.player2_score = scores.player2;
            next.winner_id = Some(winner.clone());
            next.loser_id = Some(loser.clone());
            next.completed_date = Some(now);
        }

        next.last_updated_by = ctx.actor_id.clone();
        next.updated_at = now;
        next.score_update_history
            .append(AuditEntry::between(&current, &next, &ctx.actor_id, now));

        let saved = self.commit(&next, current.version).await?;

        info!(
            match_id = %saved.id,
            from = %from,
            to = %to,
            version = saved.version,
            "Match transition committed"
        );

        self.publish(MatchEvent::Transitioned {
            match_id: saved.id.clone(),
            from,
            to,
            actor_id: ctx.actor_id.clone(),
            version: saved.version,
        });

        if to == MatchStatus::Completed {
            self.resync_participants(&saved).await;
        }

        Ok(saved)
    }

    /// Records interim scores on a match that is in progress
    #[instrument(skip(self, request), fields(actor_id = %ctx.actor_id))]
    pub async fn record_progress_score(
        &self,
        ctx: &ActorContext,
        match_id: &str,
        request: ScoreUpdateRequest,
    ) -> Result<Match, MatchError> {
        let current = self.load(match_id).await?;
        self.check_preconditions(&current, request.expected_version, None)?;

        if current.status != MatchStatus::InProgress {
            return Err(MatchError::Conflict(format!(
                "Scores can only be updated while InProgress (match is {})",
                current.status
            )));
        }

        self.require_participant(&current, ctx)?;

        let ceiling = self.validator.rules().max_reasonable_score;
        for (field, score) in [
            ("player1_score", request.scores.player1),
            ("player2_score", request.scores.player2),
        ] {
            if score < 0 {
                return Err(MatchError::validation(
                    field,
                    "score must be a non-negative integer",
                ));
            }
            if score > ceiling {
                return Err(MatchError::validation(
                    field,
                    format!("score above {} is unreasonable", ceiling),
                ));
            }
        }

        if current.scores() == request.scores {
            debug!("Score unchanged, nothing to record");
            return Ok(current);
        }

        let now = Utc::now();
        let mut next = current.clone();
        next.player1_score = request.scores.player1;
        next.player2_score = request.scores.player2;
        next.last_updated_by = ctx.actor_id.clone();
        next.updated_at = now;
        next.score_update_history
            .append(AuditEntry::between(&current, &next, &ctx.actor_id, now));

        let saved = self.commit(&next, current.version).await?;

        debug!(match_id = %saved.id, version = saved.version, "Progress score recorded");

        self.publish(MatchEvent::ScoreUpdated {
            match_id: saved.id.clone(),
            scores: saved.scores(),
            actor_id: ctx.actor_id.clone(),
            version: saved.version,
        });

        Ok(saved)
    }

    async fn load(&self, match_id: &str) -> Result<Match, MatchError> {
        self.repository
            .get_match(match_id)
            .await?
            .ok_or_else(|| MatchError::NotFound(format!("Match {} not found", match_id)))
    }

    fn check_preconditions(
        &self,
        current: &Match,
        expected_version: Option<i64>,
        expected_status: Option<MatchStatus>,
    ) -> Result<(), MatchError> {
        if let Some(expected) = expected_version {
            if expected != current.version {
                warn!(expected, actual = current.version, "Stale version precondition");
                return Err(MatchError::StaleVersion {
                    match_id: current.id.clone(),
                    expected,
                    actual: current.version,
                });
            }
        }

        if let Some(expected) = expected_status {
            if expected != current.status {
                warn!(expected = %expected, actual = %current.status, "Stale status precondition");
                return Err(MatchError::Conflict(format!(
                    "Expected match {} to be {} but it is {}",
                    current.id, expected, current.status
                )));
            }
        }

        Ok(())
    }

    fn require_participant(&self, record: &Match, ctx: &ActorContext) -> Result<(), MatchError> {
        if record.is_participant(&ctx.actor_id) {
            Ok(())
        } else {
            warn!(match_id = %record.id, "Actor is not a participant");
            Err(MatchError::Unauthorized(format!(
                "{} is not a participant of match {}",
                ctx.actor_id, record.id
            )))
        }
    }

    async fn commit(&self, next: &Match, expected_version: i64) -> Result<Match, MatchError> {
        self.repository
            .save_match(next, expected_version)
            .await
            .map_err(|err| {
                if err.is_conflict() {
                    warn!(error = %err, "Lost concurrent write");
                }
                err
            })
    }

    async fn resync_participants(&self, record: &Match) {
        let Some(stats_service) = &self.stats_service else {
            return;
        };

        for player_id in [&record.player1_id, &record.player2_id] {
            if let Err(err) = stats_service.resync(player_id).await {
                error!(
                    ?err,
                    match_id = %record.id,
                    player_id = %player_id,
                    "Failed to resync stats after match completion"
                );
            }
        }
    }

    fn publish(&self, event: MatchEvent) {
        if let Some(bus) = &self.event_bus {
            bus.emit(event);
        }
    }
}

pub struct MatchServiceBuilder {
    repository: Arc<dyn MatchRepository>,
    validator: ScoreValidator,
    policy: TransitionPolicy,
    stats_service: Option<Arc<StatsService>>,
    event_bus: Option<EventBus>,
}

impl MatchServiceBuilder {
    fn new(repository: Arc<dyn MatchRepository>) -> Self {
        Self {
            repository,
            validator: ScoreValidator::new(),
            policy: TransitionPolicy::new(),
            stats_service: None,
            event_bus: None,
        }
    }

    pub fn with_validator(mut self, validator: ScoreValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_policy(mut self, policy: TransitionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_stats_service(mut self, stats_service: Arc<StatsService>) -> Self {
        self.stats_service = Some(stats_service);
        self
    }

    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn build(self) -> MatchService {
        MatchService {
            repository: self.repository,
            validator: self.validator,
            policy: self.policy,
            stats_service: self.stats_service,
            event_bus: self.event_bus,
        }
    }
}
