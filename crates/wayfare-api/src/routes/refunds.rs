//! # Refund API
//!
//! Buyers request refunds against completed purchases; the creator of
//! the purchased content processes or rejects them. Processing flips the
//! purchase to `refunded`, with the legality of that move checked by the
//! core lifecycle.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use wayfare_core::{ContentType, PurchaseStatus, RefundId, RefundStatus};

use crate::auth::{authorize, Requirement, SessionIdentity};
use crate::db;
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::models::RefundRecord;
use crate::state::AppState;

/// Request to open a refund.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRefundRequest {
    pub purchase_id: Uuid,
    pub reason: Option<String>,
}

impl Validate for CreateRefundRequest {
    fn validate(&self) -> Result<(), String> {
        if let Some(reason) = &self.reason {
            if reason.len() > 2000 {
                return Err("reason must not exceed 2000 characters".to_string());
            }
        }
        Ok(())
    }
}

/// Decision on a refund request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ProcessRefundRequest {
    /// true to process (refund the purchase), false to reject.
    pub approve: bool,
}

impl Validate for ProcessRefundRequest {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Build the refunds router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/refunds", post(create_refund))
        .route("/v1/refunds/:id", get(get_refund))
        .route("/v1/refunds/:id/process", post(process_refund))
}

/// POST /v1/refunds — Request a refund for one's own completed purchase.
#[utoipa::path(
    post,
    path = "/v1/refunds",
    request_body = CreateRefundRequest,
    responses(
        (status = 201, description = "Refund requested", body = RefundRecord),
        (status = 404, description = "Purchase not found", body = crate::error::ErrorBody),
        (status = 409, description = "Purchase not refundable", body = crate::error::ErrorBody),
    ),
    tag = "refunds"
)]
pub(crate) async fn create_refund(
    State(state): State<AppState>,
    session: SessionIdentity,
    body: Result<Json<CreateRefundRequest>, JsonRejection>,
) -> Result<(axum::http::StatusCode, Json<RefundRecord>), AppError> {
    let identity = authorize(Some(session), Requirement::User)?;
    let req = extract_validated_json(body)?;
    let pool = state.db()?;

    let purchase_id = wayfare_core::PurchaseId::from_uuid(req.purchase_id);
    let purchase = db::purchases::get_by_id(pool, purchase_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("purchase {purchase_id} not found")))?;

    if purchase.buyer_id != identity.account_id {
        return Err(AppError::not_found(format!(
            "purchase {purchase_id} not found"
        )));
    }
    // Only a completed purchase can move to refunded; reject early with
    // the same conflict the transition check would raise.
    if !purchase
        .status
        .can_transition_to(PurchaseStatus::Refunded)
    {
        return Err(AppError::Conflict(format!(
            "purchase {purchase_id} is {} and cannot be refunded",
            purchase.status
        )));
    }

    let now = Utc::now();
    let record = RefundRecord {
        id: RefundId::new(),
        purchase_id,
        reason: req.reason,
        status: RefundStatus::Requested,
        created_at: now,
        updated_at: now,
    };
    db::refunds::insert(pool, &record).await?;

    Ok((axum::http::StatusCode::CREATED, Json(record)))
}

/// GET /v1/refunds/:id — Get a refund request.
#[utoipa::path(
    get,
    path = "/v1/refunds/{id}",
    params(("id" = Uuid, Path, description = "Refund ID")),
    responses(
        (status = 200, description = "Refund found", body = RefundRecord),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "refunds"
)]
pub(crate) async fn get_refund(
    State(state): State<AppState>,
    session: SessionIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<RefundRecord>, AppError> {
    authorize(Some(session), Requirement::AnyAccount)?;
    let pool = state.db()?;
    let id = RefundId::from_uuid(id);
    let refund = db::refunds::get_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("refund {id} not found")))?;
    Ok(Json(refund))
}

/// POST /v1/refunds/:id/process — Process or reject a refund (creator of
/// the purchased content only).
#[utoipa::path(
    post,
    path = "/v1/refunds/{id}/process",
    params(("id" = Uuid, Path, description = "Refund ID")),
    request_body = ProcessRefundRequest,
    responses(
        (status = 200, description = "Refund decided", body = RefundRecord),
        (status = 403, description = "Not the content creator", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 409, description = "Already decided or purchase not refundable", body = crate::error::ErrorBody),
    ),
    tag = "refunds"
)]
pub(crate) async fn process_refund(
    State(state): State<AppState>,
    session: SessionIdentity,
    Path(id): Path<Uuid>,
    body: Result<Json<ProcessRefundRequest>, JsonRejection>,
) -> Result<Json<RefundRecord>, AppError> {
    let identity = authorize(Some(session), Requirement::Creator)?;
    let req = extract_validated_json(body)?;
    let pool = state.db()?;
    let id = RefundId::from_uuid(id);

    let refund = db::refunds::get_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("refund {id} not found")))?;

    if refund.status != RefundStatus::Requested {
        return Err(AppError::Conflict(format!(
            "refund {id} has already been {}",
            refund.status
        )));
    }

    let purchase = db::purchases::get_by_id(pool, refund.purchase_id)
        .await?
        .ok_or_else(|| {
            AppError::Internal(format!("refund {id} references a missing purchase"))
        })?;

    let owner = match purchase.content_type {
        ContentType::Trip => db::trips::owner_of(pool, purchase.content_id).await?,
        ContentType::GoTo => db::gotos::owner_of(pool, purchase.content_id).await?,
    };
    if owner != Some(identity.account_id) {
        return Err(AppError::Forbidden(
            "only the content creator can process this refund".to_string(),
        ));
    }

    if req.approve {
        let next = purchase
            .status
            .transition_to(purchase.id, PurchaseStatus::Refunded)?;
        db::purchases::set_status(pool, purchase.id, next, None).await?;
        db::refunds::set_status(pool, id, RefundStatus::Processed).await?;
        tracing::info!(refund_id = %id, purchase_id = %purchase.id, "refund processed");
    } else {
        db::refunds::set_status(pool, id, RefundStatus::Rejected).await?;
        tracing::info!(refund_id = %id, "refund rejected");
    }

    let updated = db::refunds::get_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::Internal("refund vanished after update".to_string()))?;
    Ok(Json(updated))
}
