//! # Database Persistence Layer
//!
//! Postgres persistence via SQLx, one module per table.
//!
//! ## Architecture
//!
//! The database is **optional**: when `DATABASE_URL` is set, the pool is
//! constructed at startup and injected into `AppState`; when absent, the
//! API starts without one and data routes answer 503. There is no ambient
//! global connection — everything flows through the injected pool.
//!
//! Uniqueness (account email/username, GoTo and Trip titles per creator,
//! discount codes, access keys) is enforced by unique indexes and surfaced
//! to callers as duplicate-key errors — never pre-checked-then-inserted.

pub mod accounts;
pub mod discounts;
pub mod gotos;
pub mod package_access;
pub mod purchases;
pub mod refunds;
pub mod trips;

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};

/// Connection attempts before giving up at startup.
const CONNECT_ATTEMPTS: u32 = 3;

/// Initial delay between connection attempts; doubles each retry.
const CONNECT_BACKOFF: Duration = Duration::from_millis(500);

/// Initialize the database connection pool and run migrations.
///
/// Returns `None` if `DATABASE_URL` is not set (data routes answer 503).
/// Returns `Err` if the URL is set but the connection fails after the
/// bounded retries, or if migrations fail.
pub async fn init_pool() -> Result<Option<PgPool>, sqlx::Error> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            tracing::warn!("DATABASE_URL not set — data routes will answer 503");
            return Ok(None);
        }
    };

    let mut backoff = CONNECT_BACKOFF;
    let mut last_err = None;
    for attempt in 1..=CONNECT_ATTEMPTS {
        match PgPoolOptions::new()
            .max_connections(20)
            .min_connections(2)
            .acquire_timeout(Duration::from_secs(5))
            .connect(&url)
            .await
        {
            Ok(pool) => {
                tracing::info!("Connected to PostgreSQL");
                sqlx::migrate!("./migrations").run(&pool).await?;
                tracing::info!("Database migrations applied");
                return Ok(Some(pool));
            }
            Err(e) => {
                tracing::warn!(attempt, error = %e, "database connection failed");
                last_err = Some(e);
                if attempt < CONNECT_ATTEMPTS {
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                }
            }
        }
    }

    Err(last_err.expect("at least one connection attempt was made"))
}
