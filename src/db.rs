use crate::config::Config;
use crate::errors::AppError;
use backoff::{future::retry, ExponentialBackoffBuilder};
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing;

/// Connects to Postgres, retrying with exponential backoff while the
/// database is still coming up.
pub async fn create_pool(config: &Config, database_url: &str) -> Result<PgPool, AppError> {
    let backoff = ExponentialBackoffBuilder::new()
        .with_initial_interval(config.db_retry_initial)
        .with_max_elapsed_time(Some(config.db_connect_timeout))
        .build();
    let max_connections = config.db_max_connections;

    tracing::info!(max_connections, "Connecting to Postgres...");
    let pool = retry(backoff, move || async move {
        PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Postgres not reachable yet, retrying");
                backoff::Error::transient(e)
            })
    })
    .await
    .map_err(|e| AppError::InitError(format!("Could not connect to Postgres: {}", e)))?;

    tracing::info!("Postgres connection pool ready");
    Ok(pool)
}
