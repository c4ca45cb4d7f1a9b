//! # Payment-Provider Connect Flow
//!
//! The OAuth connect flow that links a creator to their payment-provider
//! account: an authorize URL for the connect button, the callback that
//! exchanges the authorization code for an account id, and a disconnect
//! route that clears the linkage.
//!
//! The provider is opaque to this module — endpoints and credentials come
//! entirely from [`crate::config::ConnectConfig`].

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{authorize, Requirement, SessionIdentity};
use crate::config::ConnectConfig;
use crate::db;
use crate::error::AppError;
use crate::state::AppState;

/// The authorize URL for the connect button.
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthorizeUrlResponse {
    pub url: String,
}

/// Callback query parameters from the provider redirect.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct CallbackQuery {
    pub code: Option<String>,
    /// Provider-reported error (e.g. the creator denied access).
    pub error: Option<String>,
}

/// Provider token-endpoint response. Field name follows the Stripe
/// Connect OAuth shape.
#[derive(Debug, Deserialize)]
struct TokenExchangeResponse {
    stripe_user_id: String,
}

/// The linked payment account.
#[derive(Debug, Serialize, ToSchema)]
pub struct ConnectedResponse {
    pub payment_account_id: String,
}

/// Build the connect router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/connect/authorize", get(authorize_url))
        .route("/v1/connect/callback", get(callback))
        .route("/v1/connect", axum::routing::delete(disconnect))
}

fn connect_config(state: &AppState) -> Result<&ConnectConfig, AppError> {
    state
        .config
        .connect
        .as_ref()
        .ok_or_else(|| AppError::service_unavailable("payment connect not configured"))
}

/// GET /v1/connect/authorize — The provider authorize URL for the
/// connect button.
#[utoipa::path(
    get,
    path = "/v1/connect/authorize",
    responses(
        (status = 200, description = "Authorize URL", body = AuthorizeUrlResponse),
        (status = 503, description = "Connect not configured", body = crate::error::ErrorBody),
    ),
    tag = "connect"
)]
pub(crate) async fn authorize_url(
    State(state): State<AppState>,
    session: SessionIdentity,
) -> Result<Json<AuthorizeUrlResponse>, AppError> {
    let identity = authorize(Some(session), Requirement::Creator)?;
    let config = connect_config(&state)?;

    let url = format!(
        "{}?response_type=code&client_id={}&scope=read_write&redirect_uri={}&state={}",
        config.authorize_url, config.client_id, config.redirect_uri, identity.account_id
    );
    Ok(Json(AuthorizeUrlResponse { url }))
}

/// GET /v1/connect/callback — Exchange the authorization code for an
/// account id and persist it on the creator.
#[utoipa::path(
    get,
    path = "/v1/connect/callback",
    params(CallbackQuery),
    responses(
        (status = 200, description = "Account linked", body = ConnectedResponse),
        (status = 400, description = "Provider denied or code missing", body = crate::error::ErrorBody),
        (status = 503, description = "Connect not configured", body = crate::error::ErrorBody),
    ),
    tag = "connect"
)]
pub(crate) async fn callback(
    State(state): State<AppState>,
    session: SessionIdentity,
    Query(query): Query<CallbackQuery>,
) -> Result<Json<ConnectedResponse>, AppError> {
    let identity = authorize(Some(session), Requirement::Creator)?;
    let config = connect_config(&state)?;

    if let Some(error) = query.error {
        return Err(AppError::Validation(format!(
            "provider rejected the connect attempt: {error}"
        )));
    }
    let code = query
        .code
        .ok_or_else(|| AppError::Validation("code is required".to_string()))?;

    let response = state
        .http
        .post(&config.token_url)
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code.as_str()),
            ("client_secret", config.client_secret.expose()),
        ])
        .send()
        .await
        .map_err(|e| AppError::Internal(format!("token exchange request failed: {e}")))?;

    if !response.status().is_success() {
        let status = response.status();
        tracing::error!(%status, "token exchange rejected");
        return Err(AppError::Validation(
            "authorization code was rejected by the provider".to_string(),
        ));
    }

    let exchanged: TokenExchangeResponse = response
        .json()
        .await
        .map_err(|e| AppError::Internal(format!("token exchange response malformed: {e}")))?;

    let pool = state.db()?;
    if !db::accounts::set_payment_account(
        pool,
        identity.account_id,
        Some(&exchanged.stripe_user_id),
    )
    .await?
    {
        return Err(AppError::not_found(format!(
            "account {} not found",
            identity.account_id
        )));
    }

    tracing::info!(account_id = %identity.account_id, "payment account linked");
    Ok(Json(ConnectedResponse {
        payment_account_id: exchanged.stripe_user_id,
    }))
}

/// DELETE /v1/connect — Clear the payment-account linkage.
#[utoipa::path(
    delete,
    path = "/v1/connect",
    responses(
        (status = 200, description = "Linkage cleared"),
    ),
    tag = "connect"
)]
pub(crate) async fn disconnect(
    State(state): State<AppState>,
    session: SessionIdentity,
) -> Result<Json<serde_json::Value>, AppError> {
    let identity = authorize(Some(session), Requirement::Creator)?;
    let pool = state.db()?;

    if !db::accounts::set_payment_account(pool, identity.account_id, None).await? {
        return Err(AppError::not_found(format!(
            "account {} not found",
            identity.account_id
        )));
    }

    tracing::info!(account_id = %identity.account_id, "payment account unlinked");
    Ok(Json(serde_json::json!({ "disconnected": true })))
}
