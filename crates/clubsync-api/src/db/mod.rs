//! # Database Persistence Layer
//!
//! Optional Postgres persistence via SQLx. When `DATABASE_URL` is set every
//! committed change is written through to the database and the in-memory
//! stores are hydrated from it on startup. When absent, the service runs
//! from memory (and the snapshot file, if one is configured).
//!
//! Each module covers one table with the same three operations:
//! `upsert`, `delete` and `load_all`. Writes are generic over
//! [`sqlx::PgExecutor`] so [`crate::persist`] can run a group of them in
//! one transaction. Enum-like columns are stored as their snake_case names;
//! an unrecognized value on the read path is logged and replaced by a
//! conservative fallback rather than failing the whole hydration.

pub mod attendance;
pub mod clubs;
pub mod events;
pub mod hours;
pub mod join_requests;
pub mod members;
pub mod notes;
pub mod tasks;
pub mod users;

use sqlx::postgres::{PgPool, PgPoolOptions};

/// Initialize the database connection pool and run migrations.
///
/// Returns `None` if no URL is configured (in-memory mode).
/// Returns `Err` if the URL is set but the connection or migration fails.
pub async fn init_pool(url: Option<&str>) -> Result<Option<PgPool>, sqlx::Error> {
    let url = match url {
        Some(url) => url,
        None => {
            tracing::warn!(
                "DATABASE_URL not set: Postgres persistence disabled. \
                 Data survives restarts only if CLUBSYNC_SNAPSHOT_PATH is set."
            );
            return Ok(None);
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(url)
        .await?;

    tracing::info!("Connected to PostgreSQL");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(Some(pool))
}

/// Parse a stored enum name, logging and falling back when it is unknown.
pub(crate) fn decode_name<T>(
    table: &'static str,
    id: uuid::Uuid,
    column: &'static str,
    value: &str,
    parse: impl FnOnce(&str) -> Option<T>,
    fallback: T,
) -> T {
    parse(value).unwrap_or_else(|| {
        tracing::error!(
            table,
            %id,
            column,
            value,
            "unrecognized value in database, using fallback; investigate possible data corruption"
        );
        fallback
    })
}
