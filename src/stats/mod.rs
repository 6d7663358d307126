pub mod aggregator;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

mod errors;

pub use aggregator::{aggregate, chronological_history};
pub use errors::StatsError;
pub use models::*;
pub use repository::{InMemoryStatsRepository, PostgresStatsRepository, StatsRepository};
pub use service::StatsService;
