use crate::error::DbError;
use configuration::StorageSettings;
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::env;
use tracing::info;

/// Establishes a connection pool to the PostgreSQL database.
///
/// The URL comes from the storage settings, or from `DATABASE_URL` (loaded
/// from `.env` when present) when the settings leave it unset. The pool can
/// be shared across the entire application.
pub async fn connect(settings: &StorageSettings) -> Result<PgPool, DbError> {
    let database_url = match &settings.database_url {
        Some(url) => url.clone(),
        None => {
            dotenvy::dotenv().ok();
            env::var("DATABASE_URL").map_err(|_e| {
                DbError::ConnectionConfigError("DATABASE_URL must be set.".to_string())
            })?
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.acquire_timeout())
        .connect(&database_url)
        .await
        .map_err(DbError::from_read)?;

    info!(max_connections = settings.max_connections, "database pool ready");
    Ok(pool)
}

/// Applies the embedded migrations so the schema is up-to-date before the
/// first request is served.
pub async fn run_migrations(pool: &PgPool) -> Result<(), DbError> {
    // Use a relative path from the crate root
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("database migrations applied");
    Ok(())
}
