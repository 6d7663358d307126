use sqlx::{Executor, PgPool};
use tracing::{info, instrument};

const SCHEMA: &str = include_str!("../migrations/0001_init.sql");

/// Connects to PostgreSQL and makes sure the schema exists
#[instrument(skip(database_url))]
pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let pool = PgPool::connect(database_url).await?;
    ensure_schema(&pool).await?;
    Ok(pool)
}

/// Applies the idempotent schema script
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    pool.execute(SCHEMA).await?;
    info!("Database schema ready");
    Ok(())
}
