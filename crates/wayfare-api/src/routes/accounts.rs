//! # Account Profile API
//!
//! Profile reads and self-service updates. Accounts are never
//! hard-deleted, so there is no DELETE route.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use wayfare_core::AccountId;

use crate::auth::{authorize, Requirement, SessionIdentity};
use crate::db;
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::models::AccountRecord;
use crate::routes::Pagination;
use crate::state::AppState;

/// Profile fields an account holder may change.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateAccountRequest {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub brand_color: Option<String>,
}

impl Validate for UpdateAccountRequest {
    fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err("name must not be empty".to_string());
            }
            if name.len() > 255 {
                return Err("name must not exceed 255 characters".to_string());
            }
        }
        if let Some(color) = &self.brand_color {
            let valid = color.len() == 7
                && color.starts_with('#')
                && color[1..].chars().all(|c| c.is_ascii_hexdigit());
            if !valid {
                return Err("brand_color must be a #rrggbb hex color".to_string());
            }
        }
        Ok(())
    }
}

/// Build the accounts router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/accounts", get(list_accounts))
        .route("/v1/accounts/:id", get(get_account).put(update_account))
}

/// GET /v1/accounts — List accounts.
#[utoipa::path(
    get,
    path = "/v1/accounts",
    params(Pagination),
    responses(
        (status = 200, description = "Accounts", body = [AccountRecord]),
    ),
    tag = "accounts"
)]
pub(crate) async fn list_accounts(
    State(state): State<AppState>,
    session: SessionIdentity,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<AccountRecord>>, AppError> {
    authorize(Some(session), Requirement::AnyAccount)?;
    let pool = state.db()?;
    let (limit, offset) = pagination.clamp();
    Ok(Json(db::accounts::list(pool, limit, offset).await?))
}

/// GET /v1/accounts/:id — Get an account profile.
#[utoipa::path(
    get,
    path = "/v1/accounts/{id}",
    params(("id" = Uuid, Path, description = "Account ID")),
    responses(
        (status = 200, description = "Account found", body = AccountRecord),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "accounts"
)]
pub(crate) async fn get_account(
    State(state): State<AppState>,
    session: SessionIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<AccountRecord>, AppError> {
    authorize(Some(session), Requirement::AnyAccount)?;
    let pool = state.db()?;
    let account = db::accounts::get_by_id(pool, AccountId::from_uuid(id))
        .await?
        .ok_or_else(|| AppError::not_found(format!("account {id} not found")))?;
    Ok(Json(account))
}

/// PUT /v1/accounts/:id — Update one's own profile.
#[utoipa::path(
    put,
    path = "/v1/accounts/{id}",
    params(("id" = Uuid, Path, description = "Account ID")),
    request_body = UpdateAccountRequest,
    responses(
        (status = 200, description = "Account updated", body = AccountRecord),
        (status = 403, description = "Not your account", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "accounts"
)]
pub(crate) async fn update_account(
    State(state): State<AppState>,
    session: SessionIdentity,
    Path(id): Path<Uuid>,
    body: Result<Json<UpdateAccountRequest>, JsonRejection>,
) -> Result<Json<AccountRecord>, AppError> {
    let identity = authorize(Some(session), Requirement::AnyAccount)?;
    let req = extract_validated_json(body)?;
    let id = AccountId::from_uuid(id);
    if identity.account_id != id {
        return Err(AppError::Forbidden(
            "you can only update your own account".to_string(),
        ));
    }

    let pool = state.db()?;
    let account = db::accounts::update_profile(
        pool,
        id,
        &db::accounts::AccountPatch {
            name: req.name.as_deref(),
            bio: req.bio.as_deref(),
            brand_color: req.brand_color.as_deref(),
        },
    )
    .await?
    .ok_or_else(|| AppError::not_found(format!("account {id} not found")))?;

    Ok(Json(account))
}
