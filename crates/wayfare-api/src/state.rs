//! # Application State
//!
//! The dependency-injected state carried by every handler: configuration,
//! the Postgres pool, the object-storage client, and a shared HTTP client
//! for the payment-provider exchange.
//!
//! Every external dependency is optional. When one is not configured the
//! routes that need it answer 503 rather than panicking — the service
//! starts, health liveness stays green, and readiness reports the gap.
//! This is also what lets the integration tests drive the full router
//! without Postgres or S3.

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::storage::Storage;

/// Shared application state. Cheap to clone; handed to axum via
/// `with_state`.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub db_pool: Option<PgPool>,
    pub storage: Option<Storage>,
    /// Shared HTTP client for the payment-provider token exchange.
    pub http: reqwest::Client,
}

impl AppState {
    /// State for tests: test config, no database, no storage.
    pub fn new() -> Self {
        Self::with_config(AppConfig::for_tests(), None, None)
    }

    /// Assemble state from explicit dependencies.
    pub fn with_config(config: AppConfig, db_pool: Option<PgPool>, storage: Option<Storage>) -> Self {
        Self {
            config,
            db_pool,
            storage,
            http: reqwest::Client::new(),
        }
    }

    /// The database pool, or a 503 when `DATABASE_URL` was not configured.
    pub fn db(&self) -> Result<&PgPool, crate::error::AppError> {
        self.db_pool
            .as_ref()
            .ok_or_else(|| crate::error::AppError::service_unavailable("database not configured"))
    }

    /// The storage client, or a 503 when the media bucket was not
    /// configured.
    pub fn media(&self) -> Result<&Storage, crate::error::AppError> {
        self.storage
            .as_ref()
            .ok_or_else(|| crate::error::AppError::service_unavailable("media storage not configured"))
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
