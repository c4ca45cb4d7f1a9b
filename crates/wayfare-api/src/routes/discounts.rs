//! # Discount API
//!
//! Discount-code CRUD for creators. Codes are globally unique; the
//! unique index backs the duplicate-code 409.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use wayfare_core::DiscountId;

use crate::auth::{authorize, Requirement, SessionIdentity};
use crate::db;
use crate::error::AppError;
use crate::extractors::{extract_validated_json, require_field, Validate};
use crate::models::DiscountRecord;
use crate::routes::Pagination;
use crate::state::AppState;

/// Request to create a discount.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateDiscountRequest {
    pub code: String,
    pub percent_off: i32,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_uses: Option<i32>,
}

impl Validate for CreateDiscountRequest {
    fn validate(&self) -> Result<(), String> {
        require_field(&self.code, "code")?;
        if self.code.len() > 64 {
            return Err("code must not exceed 64 characters".to_string());
        }
        if !(1..=100).contains(&self.percent_off) {
            return Err("percent_off must be between 1 and 100".to_string());
        }
        if let Some(max_uses) = self.max_uses {
            if max_uses < 1 {
                return Err("max_uses must be positive".to_string());
            }
        }
        Ok(())
    }
}

/// Fields a creator may change on an existing discount.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateDiscountRequest {
    pub percent_off: Option<i32>,
    pub is_active: Option<bool>,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_uses: Option<i32>,
}

impl Validate for UpdateDiscountRequest {
    fn validate(&self) -> Result<(), String> {
        if let Some(percent_off) = self.percent_off {
            if !(1..=100).contains(&percent_off) {
                return Err("percent_off must be between 1 and 100".to_string());
            }
        }
        if let Some(max_uses) = self.max_uses {
            if max_uses < 1 {
                return Err("max_uses must be positive".to_string());
            }
        }
        Ok(())
    }
}

/// Build the discounts router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/discounts", get(list_discounts).post(create_discount))
        .route(
            "/v1/discounts/:id",
            get(get_discount).put(update_discount).delete(delete_discount),
        )
}

/// POST /v1/discounts — Create a discount code.
#[utoipa::path(
    post,
    path = "/v1/discounts",
    request_body = CreateDiscountRequest,
    responses(
        (status = 201, description = "Discount created", body = DiscountRecord),
        (status = 409, description = "Code already in use", body = crate::error::ErrorBody),
    ),
    tag = "discounts"
)]
pub(crate) async fn create_discount(
    State(state): State<AppState>,
    session: SessionIdentity,
    body: Result<Json<CreateDiscountRequest>, JsonRejection>,
) -> Result<(axum::http::StatusCode, Json<DiscountRecord>), AppError> {
    let identity = authorize(Some(session), Requirement::Creator)?;
    let req = extract_validated_json(body)?;
    let pool = state.db()?;

    let record = DiscountRecord {
        id: DiscountId::new(),
        creator_id: identity.account_id,
        code: req.code,
        percent_off: req.percent_off,
        is_active: true,
        expires_at: req.expires_at,
        max_uses: req.max_uses,
        use_count: 0,
        created_at: Utc::now(),
    };

    db::discounts::insert(pool, &record).await.map_err(|e| {
        match AppError::from(e) {
            AppError::Conflict(_) => {
                AppError::Conflict("this discount code is already in use".to_string())
            }
            other => other,
        }
    })?;

    Ok((axum::http::StatusCode::CREATED, Json(record)))
}

/// GET /v1/discounts — List the caller's discounts.
#[utoipa::path(
    get,
    path = "/v1/discounts",
    params(Pagination),
    responses(
        (status = 200, description = "Discounts", body = [DiscountRecord]),
    ),
    tag = "discounts"
)]
pub(crate) async fn list_discounts(
    State(state): State<AppState>,
    session: SessionIdentity,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<DiscountRecord>>, AppError> {
    let identity = authorize(Some(session), Requirement::Creator)?;
    let pool = state.db()?;
    let (limit, offset) = pagination.clamp();
    let discounts =
        db::discounts::list_for_creator(pool, identity.account_id, limit, offset).await?;
    Ok(Json(discounts))
}

/// GET /v1/discounts/:id — Get a discount (owner only).
#[utoipa::path(
    get,
    path = "/v1/discounts/{id}",
    params(("id" = Uuid, Path, description = "Discount ID")),
    responses(
        (status = 200, description = "Discount found", body = DiscountRecord),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "discounts"
)]
pub(crate) async fn get_discount(
    State(state): State<AppState>,
    session: SessionIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<DiscountRecord>, AppError> {
    let identity = authorize(Some(session), Requirement::Creator)?;
    let pool = state.db()?;
    let id = DiscountId::from_uuid(id);

    let discount = db::discounts::get_by_id(pool, id)
        .await?
        .filter(|d| d.creator_id == identity.account_id)
        .ok_or_else(|| AppError::not_found(format!("discount {id} not found")))?;

    Ok(Json(discount))
}

/// PUT /v1/discounts/:id — Update a discount (owner only).
#[utoipa::path(
    put,
    path = "/v1/discounts/{id}",
    params(("id" = Uuid, Path, description = "Discount ID")),
    request_body = UpdateDiscountRequest,
    responses(
        (status = 200, description = "Discount updated", body = DiscountRecord),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "discounts"
)]
pub(crate) async fn update_discount(
    State(state): State<AppState>,
    session: SessionIdentity,
    Path(id): Path<Uuid>,
    body: Result<Json<UpdateDiscountRequest>, JsonRejection>,
) -> Result<Json<DiscountRecord>, AppError> {
    let identity = authorize(Some(session), Requirement::Creator)?;
    let req = extract_validated_json(body)?;
    let pool = state.db()?;
    let id = DiscountId::from_uuid(id);

    // Ownership check before the write.
    db::discounts::get_by_id(pool, id)
        .await?
        .filter(|d| d.creator_id == identity.account_id)
        .ok_or_else(|| AppError::not_found(format!("discount {id} not found")))?;

    let discount = db::discounts::update(
        pool,
        id,
        &db::discounts::DiscountPatch {
            percent_off: req.percent_off,
            is_active: req.is_active,
            expires_at: req.expires_at,
            max_uses: req.max_uses,
        },
    )
    .await?
    .ok_or_else(|| AppError::not_found(format!("discount {id} not found")))?;

    Ok(Json(discount))
}

/// DELETE /v1/discounts/:id — Delete a discount (owner only).
#[utoipa::path(
    delete,
    path = "/v1/discounts/{id}",
    params(("id" = Uuid, Path, description = "Discount ID")),
    responses(
        (status = 200, description = "Discount deleted"),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "discounts"
)]
pub(crate) async fn delete_discount(
    State(state): State<AppState>,
    session: SessionIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let identity = authorize(Some(session), Requirement::Creator)?;
    let pool = state.db()?;
    let id = DiscountId::from_uuid(id);

    db::discounts::get_by_id(pool, id)
        .await?
        .filter(|d| d.creator_id == identity.account_id)
        .ok_or_else(|| AppError::not_found(format!("discount {id} not found")))?;

    if !db::discounts::delete(pool, id).await? {
        return Err(AppError::not_found(format!("discount {id} not found")));
    }
    Ok(Json(serde_json::json!({ "deleted": true })))
}
