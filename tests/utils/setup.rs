use std::sync::Arc;

use matchbook::{
    audit::AuditTrail,
    event::EventBus,
    matches::{InMemoryMatchRepository, MatchRepository, MatchService, TransitionPolicy},
    stats::{InMemoryStatsRepository, StatsRepository, StatsService},
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub match_service: Arc<MatchService>,
    pub stats_service: Arc<StatsService>,
    pub match_repository: Arc<dyn MatchRepository>,
    pub stats_repository: Arc<dyn StatsRepository>,
    pub audit_trail: AuditTrail,
    pub event_bus: EventBus,
}

pub struct TestSetupBuilder {
    match_repository: Option<Arc<dyn MatchRepository>>,
    stats_repository: Option<Arc<dyn StatsRepository>>,
    policy: TransitionPolicy,
}

#[allow(dead_code)]
impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            match_repository: None,
            stats_repository: None,
            policy: TransitionPolicy::new(),
        }
    }

    pub fn with_match_repository(mut self, repo: Arc<dyn MatchRepository>) -> Self {
        self.match_repository = Some(repo);
        self
    }

    pub fn with_stats_repository(mut self, repo: Arc<dyn StatsRepository>) -> Self {
        self.stats_repository = Some(repo);
        self
    }

    pub fn with_direct_completion(mut self) -> Self {
        self.policy = self.policy.with_direct_completion(true);
        self
    }

    pub fn build(self) -> TestSetup {
        let match_repository = self
            .match_repository
            .unwrap_or_else(|| Arc::new(InMemoryMatchRepository::new()));
        let stats_repository = self
            .stats_repository
            .unwrap_or_else(|| Arc::new(InMemoryStatsRepository::new()));
        let event_bus = EventBus::new();

        let stats_service = Arc::new(StatsService::new(
            Arc::clone(&match_repository),
            Arc::clone(&stats_repository),
        ));
        let match_service = Arc::new(
            MatchService::builder(Arc::clone(&match_repository))
                .with_policy(self.policy)
                .with_stats_service(Arc::clone(&stats_service))
                .with_event_bus(event_bus.clone())
                .build(),
        );

        TestSetup {
            match_service,
            stats_service,
            audit_trail: AuditTrail::new(Arc::clone(&match_repository)),
            match_repository,
            stats_repository,
            event_bus,
        }
    }
}
