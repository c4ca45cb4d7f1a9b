//! # wayfare-api — Axum API Service for the Wayfare Storefront
//!
//! Creators publish Trips and GoTos, buyers purchase access, and gated
//! content is reachable through a session-based access check or an
//! emailed package-access key.
//!
//! ## API Surface
//!
//! | Prefix                | Module                      | Domain              |
//! |-----------------------|-----------------------------|---------------------|
//! | `/v1/auth/*`          | [`routes::auth`]            | Signup / signin     |
//! | `/v1/accounts/*`      | [`routes::accounts`]        | Account profiles    |
//! | `/v1/trips/*`         | [`routes::trips`]           | Trips               |
//! | `/v1/gotos/*`         | [`routes::gotos`]           | GoTos               |
//! | `/v1/purchases/*`     | [`routes::purchases`]       | Checkout            |
//! | `/v1/webhooks/payment`| [`routes::purchases`]       | Payment confirmation|
//! | `/v1/refunds/*`       | [`routes::refunds`]         | Refunds             |
//! | `/v1/discounts/*`     | [`routes::discounts`]       | Discount codes      |
//! | `/v1/access/*`        | [`routes::package_access`]  | Access keys         |
//! | `/v1/media/*`         | [`routes::media`]           | Object storage      |
//! | `/v1/connect/*`       | [`routes::connect`]         | Payment connect     |
//!
//! ## Authorization
//!
//! There is no request-intercepting auth middleware: each protected
//! handler pulls the session through an extractor and invokes the
//! explicit [`auth::authorize`] policy function, keeping the allow/deny
//! decision decoupled from HTTP mechanics. Public routes (signup/signin,
//! launched-content reads, access-key verification, the media proxy,
//! health probes, the OpenAPI spec) simply never invoke it.

pub mod access;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod keygen;
pub mod models;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod storage;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Assemble the full application router.
///
/// Body size limit: 2 MiB for JSON routes. The media upload route
/// overrides with its own larger route-level limit.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::auth::router())
        .merge(routes::accounts::router())
        .merge(routes::trips::router())
        .merge(routes::gotos::router())
        .merge(routes::purchases::router())
        .merge(routes::refunds::router())
        .merge(routes::discounts::router())
        .merge(routes::package_access::router())
        .merge(routes::media::router())
        .merge(routes::connect::router())
        .merge(openapi::router())
        .layer(DefaultBodyLimit::max(2 * 1024 * 1024));

    Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness))
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — verifies the service can reach its database.
///
/// Returns 200 "ready", or 503 with a diagnostic message when the
/// database is configured but unreachable. A deployment without a
/// database is reported ready — data routes answer 503 individually.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    if let Some(pool) = &state.db_pool {
        if let Err(e) = sqlx::query("SELECT 1").execute(pool).await {
            tracing::warn!("Database health check failed: {e}");
            return (StatusCode::SERVICE_UNAVAILABLE, "database unreachable").into_response();
        }
    }
    (StatusCode::OK, "ready").into_response()
}
