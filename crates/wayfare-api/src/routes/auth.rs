//! # Signup and Signin
//!
//! Creates accounts and issues session tokens. Signin failures are one
//! indistinguishable 401 — the response never reveals whether the email
//! or the password was wrong.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use wayfare_core::{AccountId, AccountKind};

use crate::auth::{issue_session_token, SessionIdentity};
use crate::db;
use crate::error::AppError;
use crate::extractors::{extract_validated_json, require_field, Validate};
use crate::models::AccountRecord;
use crate::state::AppState;

/// Request to create an account.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SignupRequest {
    /// "creator" or "user".
    pub kind: String,
    pub name: String,
    pub email: String,
    pub username: String,
    pub password: String,
}

impl Validate for SignupRequest {
    fn validate(&self) -> Result<(), String> {
        require_field(&self.kind, "kind")?;
        require_field(&self.name, "name")?;
        require_field(&self.email, "email")?;
        require_field(&self.username, "username")?;
        if !self.email.contains('@') {
            return Err("email is malformed".to_string());
        }
        if self.username.len() > 64 {
            return Err("username must not exceed 64 characters".to_string());
        }
        if self.password.len() < 8 {
            return Err("password must be at least 8 characters".to_string());
        }
        Ok(())
    }
}

/// Request to sign in to an existing account.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

impl Validate for SigninRequest {
    fn validate(&self) -> Result<(), String> {
        require_field(&self.email, "email")?;
        require_field(&self.password, "password")
    }
}

/// A session token plus the account it belongs to.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub token: String,
    pub account: AccountRecord,
}

/// Build the auth router (public routes).
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/auth/signup", post(signup))
        .route("/v1/auth/signin", post(signin))
}

/// POST /v1/auth/signup — Create an account and issue a session token.
#[utoipa::path(
    post,
    path = "/v1/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = SessionResponse),
        (status = 400, description = "Validation failed", body = crate::error::ErrorBody),
        (status = 409, description = "Email or username taken", body = crate::error::ErrorBody),
    ),
    tag = "auth"
)]
pub(crate) async fn signup(
    State(state): State<AppState>,
    body: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(axum::http::StatusCode, Json<SessionResponse>), AppError> {
    let req = extract_validated_json(body)?;
    let pool = state.db()?;

    let kind = AccountKind::parse(&req.kind)?;
    let password_hash = bcrypt::hash(&req.password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))?;

    let account = db::accounts::insert(
        pool,
        &db::accounts::NewAccount {
            id: AccountId::new(),
            kind,
            name: &req.name,
            email: &req.email,
            username: &req.username,
            password_hash: Some(&password_hash),
        },
    )
    .await
    .map_err(|e| match AppError::from(e) {
        AppError::Conflict(_) => {
            AppError::Conflict("an account with this email or username already exists".to_string())
        }
        other => other,
    })?;

    let identity = SessionIdentity {
        account_id: account.id,
        kind,
        needs_type_selection: false,
    };
    let token = issue_session_token(identity, &state.config.jwt_secret, state.config.session_ttl_hours)
        .map_err(|e| AppError::Internal(format!("token issuance failed: {e}")))?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(SessionResponse { token, account }),
    ))
}

/// POST /v1/auth/signin — Exchange credentials for a session token.
#[utoipa::path(
    post,
    path = "/v1/auth/signin",
    request_body = SigninRequest,
    responses(
        (status = 200, description = "Signed in", body = SessionResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorBody),
    ),
    tag = "auth"
)]
pub(crate) async fn signin(
    State(state): State<AppState>,
    body: Result<Json<SigninRequest>, JsonRejection>,
) -> Result<Json<SessionResponse>, AppError> {
    let req = extract_validated_json(body)?;
    let pool = state.db()?;

    // One denial for every failure mode below.
    let invalid = || AppError::Unauthorized("invalid credentials".to_string());

    let credentials = db::accounts::fetch_credentials(pool, &req.email)
        .await?
        .ok_or_else(invalid)?;

    let password_hash = credentials.password_hash.ok_or_else(invalid)?;
    let verified = bcrypt::verify(&req.password, &password_hash)
        .map_err(|e| AppError::Internal(format!("password verification failed: {e}")))?;
    if !verified {
        return Err(invalid());
    }

    let account = db::accounts::get_by_id(pool, credentials.id)
        .await?
        .ok_or_else(invalid)?;

    let identity = SessionIdentity {
        account_id: credentials.id,
        kind: credentials.kind,
        needs_type_selection: false,
    };
    let token = issue_session_token(identity, &state.config.jwt_secret, state.config.session_ttl_hours)
        .map_err(|e| AppError::Internal(format!("token issuance failed: {e}")))?;

    Ok(Json(SessionResponse { token, account }))
}
