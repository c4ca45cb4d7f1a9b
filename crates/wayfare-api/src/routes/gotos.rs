//! # GoTo API
//!
//! GoTo CRUD plus the access-gated content endpoint. Mirrors the trip
//! surface; only the metadata shape differs.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use wayfare_core::{AccountId, ContentId, ContentStatus, ContentType};

use crate::access::{may_view, ContentRef};
use crate::auth::{authorize, MaybeSession, Requirement, SessionIdentity};
use crate::db;
use crate::error::AppError;
use crate::extractors::{extract_validated_json, require_field, Validate};
use crate::models::GoToRecord;
use crate::routes::Pagination;
use crate::state::AppState;

/// Duplicate-title message surfaced on the (creator_id, title) unique
/// index.
const DUPLICATE_TITLE: &str =
    "You already have a GoTo with this title. Please choose a different title.";

/// Request to create a GoTo.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateGoToRequest {
    /// Owning creator. Accepted as-given: referential integrity against
    /// accounts is not enforced by the write path.
    pub creator_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub content: serde_json::Value,
    #[serde(default)]
    pub price_cents: i64,
    pub currency: Option<String>,
}

impl Validate for CreateGoToRequest {
    fn validate(&self) -> Result<(), String> {
        require_field(&self.title, "title")?;
        if self.title.len() > 255 {
            return Err("title must not exceed 255 characters".to_string());
        }
        if self.price_cents < 0 {
            return Err("price_cents must not be negative".to_string());
        }
        Ok(())
    }
}

/// Fields a creator may change on an existing GoTo.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateGoToRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub content: Option<serde_json::Value>,
    pub price_cents: Option<i64>,
    pub currency: Option<String>,
    /// "draft" or "launch"; launching is what makes a GoTo public.
    pub status: Option<String>,
}

impl Validate for UpdateGoToRequest {
    fn validate(&self) -> Result<(), String> {
        if let Some(title) = &self.title {
            require_field(title, "title")?;
            if title.len() > 255 {
                return Err("title must not exceed 255 characters".to_string());
            }
        }
        if let Some(price) = self.price_cents {
            if price < 0 {
                return Err("price_cents must not be negative".to_string());
            }
        }
        if let Some(status) = &self.status {
            ContentStatus::parse(status).map_err(|e| e.to_string())?;
        }
        Ok(())
    }
}

/// Public view of a GoTo: everything except the gated content payload.
#[derive(Debug, Serialize, ToSchema)]
pub struct GoToSummary {
    #[schema(value_type = uuid::Uuid)]
    pub id: ContentId,
    #[schema(value_type = uuid::Uuid)]
    pub creator_id: AccountId,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub price_cents: i64,
    pub currency: String,
    #[schema(value_type = String)]
    pub status: ContentStatus,
    pub average_rating: Option<f64>,
    pub rating_count: i64,
    pub created_at: chrono::DateTime<Utc>,
}

impl From<GoToRecord> for GoToSummary {
    fn from(record: GoToRecord) -> Self {
        let average_rating = (record.rating_count > 0)
            .then(|| record.rating_sum as f64 / record.rating_count as f64);
        Self {
            id: record.id,
            creator_id: record.creator_id,
            title: record.title,
            description: record.description,
            category: record.category,
            location: record.location,
            price_cents: record.price_cents,
            currency: record.currency,
            status: record.status,
            average_rating,
            rating_count: record.rating_count,
            created_at: record.created_at,
        }
    }
}

/// The gated payload, delivered after an access check.
#[derive(Debug, Serialize, ToSchema)]
pub struct GoToContentResponse {
    #[schema(value_type = uuid::Uuid)]
    pub id: ContentId,
    pub title: String,
    pub content: serde_json::Value,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ListGoTosQuery {
    /// Restrict to one creator's GoTos.
    pub creator_id: Option<Uuid>,
    /// Page size; clamped to 100.
    pub limit: Option<i64>,
    /// Offset into the result set.
    pub offset: Option<i64>,
}

/// Build the GoTos router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/gotos", get(list_gotos).post(create_goto))
        .route(
            "/v1/gotos/:id",
            get(get_goto).put(update_goto).delete(delete_goto),
        )
        .route("/v1/gotos/:id/content", get(get_goto_content))
}

/// POST /v1/gotos — Create a GoTo (draft).
#[utoipa::path(
    post,
    path = "/v1/gotos",
    request_body = CreateGoToRequest,
    responses(
        (status = 201, description = "GoTo created", body = GoToSummary),
        (status = 400, description = "Validation failed", body = crate::error::ErrorBody),
        (status = 409, description = "Duplicate title", body = crate::error::ErrorBody),
    ),
    tag = "gotos"
)]
pub(crate) async fn create_goto(
    State(state): State<AppState>,
    session: SessionIdentity,
    body: Result<Json<CreateGoToRequest>, JsonRejection>,
) -> Result<(axum::http::StatusCode, Json<GoToSummary>), AppError> {
    authorize(Some(session), Requirement::Creator)?;
    let req = extract_validated_json(body)?;
    let pool = state.db()?;

    let now = Utc::now();
    let record = GoToRecord {
        id: ContentId::new(),
        creator_id: AccountId::from_uuid(req.creator_id),
        title: req.title,
        description: req.description,
        category: req.category,
        location: req.location,
        content: req.content,
        price_cents: req.price_cents,
        currency: req.currency.unwrap_or_else(|| "USD".to_string()),
        status: ContentStatus::Draft,
        rating_sum: 0,
        rating_count: 0,
        created_at: now,
        updated_at: now,
    };

    db::gotos::insert(pool, &record).await.map_err(|e| {
        match AppError::from(e) {
            AppError::Conflict(_) => AppError::Conflict(DUPLICATE_TITLE.to_string()),
            other => other,
        }
    })?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(GoToSummary::from(record)),
    ))
}

/// GET /v1/gotos — List launched GoTos.
#[utoipa::path(
    get,
    path = "/v1/gotos",
    params(ListGoTosQuery),
    responses(
        (status = 200, description = "Launched GoTos", body = [GoToSummary]),
    ),
    tag = "gotos"
)]
pub(crate) async fn list_gotos(
    State(state): State<AppState>,
    Query(query): Query<ListGoTosQuery>,
) -> Result<Json<Vec<GoToSummary>>, AppError> {
    let pool = state.db()?;
    let (limit, offset) = Pagination {
        limit: query.limit,
        offset: query.offset,
    }
    .clamp();
    let gotos = db::gotos::list_launched(
        pool,
        query.creator_id.map(AccountId::from_uuid),
        limit,
        offset,
    )
    .await?;
    Ok(Json(gotos.into_iter().map(GoToSummary::from).collect()))
}

/// GET /v1/gotos/:id — Get GoTo metadata.
///
/// Drafts are 404 to everyone but their owner, indistinguishable from a
/// missing GoTo.
#[utoipa::path(
    get,
    path = "/v1/gotos/{id}",
    params(("id" = Uuid, Path, description = "GoTo ID")),
    responses(
        (status = 200, description = "GoTo found", body = GoToSummary),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "gotos"
)]
pub(crate) async fn get_goto(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
    Path(id): Path<Uuid>,
) -> Result<Json<GoToSummary>, AppError> {
    let pool = state.db()?;
    let id = ContentId::from_uuid(id);
    let goto = db::gotos::get_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("goto {id} not found")))?;

    let is_owner = session.is_some_and(|s| s.account_id == goto.creator_id);
    if !goto.status.is_public() && !is_owner {
        return Err(AppError::not_found(format!("goto {id} not found")));
    }

    Ok(Json(GoToSummary::from(goto)))
}

/// PUT /v1/gotos/:id — Update a GoTo (owner only).
#[utoipa::path(
    put,
    path = "/v1/gotos/{id}",
    params(("id" = Uuid, Path, description = "GoTo ID")),
    request_body = UpdateGoToRequest,
    responses(
        (status = 200, description = "GoTo updated", body = GoToSummary),
        (status = 403, description = "Not the owner", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 409, description = "Duplicate title", body = crate::error::ErrorBody),
    ),
    tag = "gotos"
)]
pub(crate) async fn update_goto(
    State(state): State<AppState>,
    session: SessionIdentity,
    Path(id): Path<Uuid>,
    body: Result<Json<UpdateGoToRequest>, JsonRejection>,
) -> Result<Json<GoToSummary>, AppError> {
    let identity = authorize(Some(session), Requirement::Creator)?;
    let req = extract_validated_json(body)?;
    let pool = state.db()?;
    let id = ContentId::from_uuid(id);

    let owner = db::gotos::owner_of(pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("goto {id} not found")))?;
    if owner != identity.account_id {
        return Err(AppError::Forbidden(
            "you can only update your own GoTos".to_string(),
        ));
    }

    let status = match &req.status {
        Some(raw) => Some(ContentStatus::parse(raw)?),
        None => None,
    };

    let goto = db::gotos::update(
        pool,
        id,
        &db::gotos::GoToPatch {
            title: req.title.as_deref(),
            description: req.description.as_deref(),
            category: req.category.as_deref(),
            location: req.location.as_deref(),
            content: req.content.as_ref(),
            price_cents: req.price_cents,
            currency: req.currency.as_deref(),
            status,
        },
    )
    .await
    .map_err(|e| match AppError::from(e) {
        AppError::Conflict(_) => AppError::Conflict(DUPLICATE_TITLE.to_string()),
        other => other,
    })?
    .ok_or_else(|| AppError::not_found(format!("goto {id} not found")))?;

    Ok(Json(GoToSummary::from(goto)))
}

/// DELETE /v1/gotos/:id — Delete a GoTo (owner only).
#[utoipa::path(
    delete,
    path = "/v1/gotos/{id}",
    params(("id" = Uuid, Path, description = "GoTo ID")),
    responses(
        (status = 200, description = "GoTo deleted"),
        (status = 403, description = "Not the owner", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "gotos"
)]
pub(crate) async fn delete_goto(
    State(state): State<AppState>,
    session: SessionIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let identity = authorize(Some(session), Requirement::Creator)?;
    let pool = state.db()?;
    let id = ContentId::from_uuid(id);

    let owner = db::gotos::owner_of(pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("goto {id} not found")))?;
    if owner != identity.account_id {
        return Err(AppError::Forbidden(
            "you can only delete your own GoTos".to_string(),
        ));
    }

    if !db::gotos::delete(pool, id).await? {
        return Err(AppError::not_found(format!("goto {id} not found")));
    }
    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// GET /v1/gotos/:id/content — The gated payload, after an access check.
#[utoipa::path(
    get,
    path = "/v1/gotos/{id}/content",
    params(("id" = Uuid, Path, description = "GoTo ID")),
    responses(
        (status = 200, description = "Gated content", body = GoToContentResponse),
        (status = 401, description = "No session", body = crate::error::ErrorBody),
        (status = 403, description = "No purchase and not the owner", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "gotos"
)]
pub(crate) async fn get_goto_content(
    State(state): State<AppState>,
    session: SessionIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<GoToContentResponse>, AppError> {
    let identity = authorize(Some(session), Requirement::AnyAccount)?;
    let pool = state.db()?;
    let id = ContentId::from_uuid(id);

    let goto = db::gotos::get_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("goto {id} not found")))?;

    let decision = may_view(
        pool,
        ContentRef {
            id,
            content_type: ContentType::GoTo,
        },
        identity.account_id,
    )
    .await;

    if !decision.is_allowed() {
        return Err(AppError::Forbidden(
            "you do not have access to this content".to_string(),
        ));
    }

    Ok(Json(GoToContentResponse {
        id: goto.id,
        title: goto.title,
        content: goto.content,
    }))
}
