use matchbook::{
    app,
    config::AppConfig,
    db,
    matches::{InMemoryMatchRepository, MatchRepository, PostgresMatchRepository},
    shared::AppState,
    stats::{InMemoryStatsRepository, PostgresStatsRepository, StatsRepository},
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "matchbook=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting match record server");

    let config = AppConfig::from_env();

    let match_repository: Arc<dyn MatchRepository>;
    let stats_repository: Arc<dyn StatsRepository>;
    match &config.database_url {
        Some(database_url) => {
            let pool = db::connect(database_url).await?;
            info!("Using PostgreSQL repositories");
            match_repository = Arc::new(PostgresMatchRepository::new(pool.clone()));
            stats_repository = Arc::new(PostgresStatsRepository::new(pool));
        }
        None => {
            warn!("DATABASE_URL not set, records will not survive a restart");
            match_repository = Arc::new(InMemoryMatchRepository::new());
            stats_repository = Arc::new(InMemoryStatsRepository::new());
        }
    }

    if config.allow_direct_completion {
        info!("Direct Scheduled -> Completed transitions are enabled");
    }

    let app_state = AppState::new(match_repository, stats_repository, &config);
    let app = app::router(app_state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Server running on http://{}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
