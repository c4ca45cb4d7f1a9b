//! # Purchase API
//!
//! Checkout initiation, purchase views, and the payment provider's
//! confirmation webhook. A purchase is born `pending`; only the webhook
//! moves it to `completed` or `failed`, and the legality of every status
//! write is checked against the core lifecycle first.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use wayfare_core::{AccountId, ContentId, ContentType, PurchaseId, PurchaseStatus};

use crate::auth::{authorize, Requirement, SessionIdentity};
use crate::db;
use crate::error::AppError;
use crate::extractors::{extract_validated_json, require_field, Validate};
use crate::models::PurchaseRecord;
use crate::routes::Pagination;
use crate::state::AppState;

/// Request to initiate a checkout.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePurchaseRequest {
    pub content_id: Uuid,
    /// "trip" or "goto".
    pub content_type: String,
    /// Optional discount code to apply.
    pub discount_code: Option<String>,
}

impl Validate for CreatePurchaseRequest {
    fn validate(&self) -> Result<(), String> {
        require_field(&self.content_type, "content_type")?;
        ContentType::parse(&self.content_type).map_err(|e| e.to_string())?;
        Ok(())
    }
}

/// Payment-provider webhook payload.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PaymentWebhookRequest {
    pub purchase_id: Uuid,
    /// "completed" or "failed".
    pub outcome: String,
    /// Order reference at the provider.
    pub provider_order_id: Option<String>,
}

impl Validate for PaymentWebhookRequest {
    fn validate(&self) -> Result<(), String> {
        require_field(&self.outcome, "outcome")?;
        match self.outcome.as_str() {
            "completed" | "failed" => Ok(()),
            other => Err(format!("outcome must be completed or failed, got {other}")),
        }
    }
}

/// Build the purchases router. The webhook route is public but
/// authenticated by the shared secret.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/purchases", get(list_purchases).post(create_purchase))
        .route("/v1/purchases/:id", get(get_purchase))
        .route("/v1/webhooks/payment", post(payment_webhook))
}

/// POST /v1/purchases — Initiate a checkout.
///
/// Prices the purchase from the content record, applies an optional
/// redeemable discount, and stores a `pending` purchase.
#[utoipa::path(
    post,
    path = "/v1/purchases",
    request_body = CreatePurchaseRequest,
    responses(
        (status = 201, description = "Purchase created", body = PurchaseRecord),
        (status = 400, description = "Validation failed", body = crate::error::ErrorBody),
        (status = 404, description = "Content not found", body = crate::error::ErrorBody),
    ),
    tag = "purchases"
)]
pub(crate) async fn create_purchase(
    State(state): State<AppState>,
    session: SessionIdentity,
    body: Result<Json<CreatePurchaseRequest>, JsonRejection>,
) -> Result<(axum::http::StatusCode, Json<PurchaseRecord>), AppError> {
    let identity = authorize(Some(session), Requirement::User)?;
    let req = extract_validated_json(body)?;
    let pool = state.db()?;

    let content_type = ContentType::parse(&req.content_type)?;
    let content_id = ContentId::from_uuid(req.content_id);

    // Price from the stored content, never from the request.
    let (price_cents, currency) = match content_type {
        ContentType::Trip => {
            let trip = db::trips::get_by_id(pool, content_id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("trip {content_id} not found")))?;
            (trip.price_cents, trip.currency)
        }
        ContentType::GoTo => {
            let goto = db::gotos::get_by_id(pool, content_id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("goto {content_id} not found")))?;
            (goto.price_cents, goto.currency)
        }
    };

    let mut amount_cents = price_cents;
    let mut applied_code = None;
    if let Some(code) = &req.discount_code {
        let discount = db::discounts::get_by_code(pool, code)
            .await?
            .filter(|d| d.is_redeemable(Utc::now()))
            .ok_or_else(|| {
                AppError::Validation("discount code is invalid or no longer redeemable".to_string())
            })?;
        amount_cents = discount.apply_to(amount_cents);
        db::discounts::increment_use_count(pool, discount.id).await?;
        applied_code = Some(discount.code);
    }

    let now = Utc::now();
    let record = PurchaseRecord {
        id: PurchaseId::new(),
        buyer_id: identity.account_id,
        content_id,
        content_type,
        status: PurchaseStatus::Pending,
        amount_cents,
        currency,
        discount_code: applied_code,
        provider_order_id: None,
        created_at: now,
        updated_at: now,
    };
    db::purchases::insert(pool, &record).await?;

    Ok((axum::http::StatusCode::CREATED, Json(record)))
}

/// GET /v1/purchases — List the caller's purchases.
#[utoipa::path(
    get,
    path = "/v1/purchases",
    params(Pagination),
    responses(
        (status = 200, description = "Purchases", body = [PurchaseRecord]),
    ),
    tag = "purchases"
)]
pub(crate) async fn list_purchases(
    State(state): State<AppState>,
    session: SessionIdentity,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<PurchaseRecord>>, AppError> {
    let identity = authorize(Some(session), Requirement::AnyAccount)?;
    let pool = state.db()?;
    let (limit, offset) = pagination.clamp();
    let purchases =
        db::purchases::list_for_buyer(pool, identity.account_id, limit, offset).await?;
    Ok(Json(purchases))
}

/// GET /v1/purchases/:id — Get a purchase.
///
/// Visible to the buyer and to the creator of the purchased content.
#[utoipa::path(
    get,
    path = "/v1/purchases/{id}",
    params(("id" = Uuid, Path, description = "Purchase ID")),
    responses(
        (status = 200, description = "Purchase found", body = PurchaseRecord),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "purchases"
)]
pub(crate) async fn get_purchase(
    State(state): State<AppState>,
    session: SessionIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<PurchaseRecord>, AppError> {
    let identity = authorize(Some(session), Requirement::AnyAccount)?;
    let pool = state.db()?;
    let id = PurchaseId::from_uuid(id);

    let purchase = db::purchases::get_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("purchase {id} not found")))?;

    if purchase.buyer_id != identity.account_id
        && !is_content_creator(&state, &purchase, identity.account_id).await?
    {
        // 404 rather than 403 to avoid leaking purchase ids.
        return Err(AppError::not_found(format!("purchase {id} not found")));
    }

    Ok(Json(purchase))
}

/// Whether `account` created the content this purchase is for.
pub(crate) async fn is_content_creator(
    state: &AppState,
    purchase: &PurchaseRecord,
    account: AccountId,
) -> Result<bool, AppError> {
    let pool = state.db()?;
    let owner = match purchase.content_type {
        ContentType::Trip => db::trips::owner_of(pool, purchase.content_id).await?,
        ContentType::GoTo => db::gotos::owner_of(pool, purchase.content_id).await?,
    };
    Ok(owner == Some(account))
}

/// POST /v1/webhooks/payment — Payment provider confirmation.
///
/// Authenticated by the `x-webhook-secret` header. Moves a pending
/// purchase to its outcome; an illegal transition (e.g. re-delivered
/// confirmation for a refunded purchase) is a 409.
#[utoipa::path(
    post,
    path = "/v1/webhooks/payment",
    request_body = PaymentWebhookRequest,
    responses(
        (status = 200, description = "Purchase updated", body = PurchaseRecord),
        (status = 401, description = "Bad webhook secret", body = crate::error::ErrorBody),
        (status = 404, description = "Unknown purchase", body = crate::error::ErrorBody),
        (status = 409, description = "Illegal transition", body = crate::error::ErrorBody),
    ),
    tag = "purchases"
)]
pub(crate) async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<PaymentWebhookRequest>, JsonRejection>,
) -> Result<Json<PurchaseRecord>, AppError> {
    let configured = state
        .config
        .webhook_secret
        .as_ref()
        .ok_or_else(|| AppError::service_unavailable("payment webhook not configured"))?;

    let presented = headers
        .get("x-webhook-secret")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if presented != configured.expose() {
        return Err(AppError::Unauthorized("invalid webhook secret".to_string()));
    }

    let req = extract_validated_json(body)?;
    let pool = state.db()?;
    let id = PurchaseId::from_uuid(req.purchase_id);

    let purchase = db::purchases::get_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("purchase {id} not found")))?;

    let target = match req.outcome.as_str() {
        "completed" => PurchaseStatus::Completed,
        _ => PurchaseStatus::Failed,
    };
    let next = purchase.status.transition_to(id, target)?;

    if !db::purchases::set_status(pool, id, next, req.provider_order_id.as_deref()).await? {
        return Err(AppError::not_found(format!("purchase {id} not found")));
    }

    tracing::info!(purchase_id = %id, status = %next, "payment webhook applied");

    let updated = db::purchases::get_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::Internal("purchase vanished after update".to_string()))?;
    Ok(Json(updated))
}
