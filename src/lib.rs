// Library crate for the match record service
// This file exposes the public API for the binary and integration tests

pub mod app;
pub mod audit;
pub mod config;
pub mod db;
pub mod event;
pub mod matches;
pub mod retry;
pub mod score;
pub mod session;
pub mod shared;
pub mod stats;

// Re-export commonly used types for easier access in tests
pub use audit::{AuditEntry, AuditTrail};
pub use config::AppConfig;
pub use event::{EventBus, MatchEvent, Subscription, SubscriptionManager};
pub use matches::{
    InMemoryMatchRepository, Match, MatchError, MatchRepository, MatchService, MatchStatus,
    ScorePair, TransitionPolicy, TransitionRequest,
};
pub use retry::RetryPolicy;
pub use score::{ScoreValidation, ScoreValidator};
pub use session::ActorContext;
pub use shared::{AppError, AppState};
pub use stats::{InMemoryStatsRepository, PlayerStats, StatsError, StatsRepository, StatsService};
