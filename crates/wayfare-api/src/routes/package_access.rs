//! # Package-Access API
//!
//! Issues and verifies the emailed access keys that deliver purchased
//! content to buyers without accounts.
//!
//! Verification failures are one generic 403: wrong key, wrong email,
//! wrong package, expired, deactivated, and never-existed all produce the
//! same response, so the endpoint cannot be used to enumerate keys or
//! learn which field was wrong. Lookup errors take the same path — the
//! check fails closed.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{delete, post};
use axum::{Json, Router};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use wayfare_core::{
    normalize_email, AccessGrant, AccountId, ContentId, ContentType, GrantId,
};

use crate::auth::{authorize, Requirement, SessionIdentity};
use crate::db;
use crate::error::AppError;
use crate::extractors::{extract_validated_json, require_field, Validate};
use crate::keygen::{generate_access_key, MAX_KEY_ATTEMPTS};
use crate::state::AppState;

/// Default grant lifetime when the issuance request does not set one.
const DEFAULT_GRANT_TTL_DAYS: i64 = 30;

/// Request to issue an access grant.
#[derive(Debug, Deserialize, ToSchema)]
pub struct IssueGrantRequest {
    pub email: String,
    pub package_id: Uuid,
    /// "trip" or "goto".
    pub package_type: String,
    pub creator_id: Uuid,
    /// Explicit expiry; `null` with `no_expiry` unset gets the 30-day
    /// default.
    pub expires_at: Option<DateTime<Utc>>,
    /// Issue a grant with no time bound.
    #[serde(default)]
    pub no_expiry: bool,
}

impl Validate for IssueGrantRequest {
    fn validate(&self) -> Result<(), String> {
        require_field(&self.email, "email")?;
        if !self.email.contains('@') {
            return Err("email is malformed".to_string());
        }
        require_field(&self.package_type, "package_type")?;
        ContentType::parse(&self.package_type).map_err(|e| e.to_string())?;
        Ok(())
    }
}

/// Request to verify an access key.
#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyAccessRequest {
    pub email: String,
    pub access_key: String,
    pub package_id: Uuid,
}

impl Validate for VerifyAccessRequest {
    fn validate(&self) -> Result<(), String> {
        require_field(&self.email, "email")?;
        require_field(&self.access_key, "access_key")
    }
}

/// The issued grant, key included. The key is only ever returned here.
#[derive(Debug, Serialize, ToSchema)]
pub struct IssuedGrantResponse {
    #[schema(value_type = uuid::Uuid)]
    pub id: GrantId,
    pub email: String,
    pub access_key: String,
    #[schema(value_type = uuid::Uuid)]
    pub package_id: ContentId,
    #[schema(value_type = String)]
    pub package_type: ContentType,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Grant summary returned on successful verification. Never includes the
/// key.
#[derive(Debug, Serialize, ToSchema)]
pub struct GrantSummaryResponse {
    #[schema(value_type = uuid::Uuid)]
    pub package_id: ContentId,
    #[schema(value_type = String)]
    pub package_type: ContentType,
    #[schema(value_type = uuid::Uuid)]
    pub creator_id: AccountId,
    pub expires_at: Option<DateTime<Utc>>,
    pub verified_at: DateTime<Utc>,
}

/// Build the package-access router. Issuance and deactivation require a
/// creator session; verification is public.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/access/grants", post(issue_grant))
        .route("/v1/access/grants/:id", delete(deactivate_grant))
        .route("/v1/access/verify", post(verify_access))
}

/// POST /v1/access/grants — Issue an access grant.
///
/// Generates an unguessable key and inserts the grant; a key collision
/// (unique-index violation) regenerates, bounded by
/// [`MAX_KEY_ATTEMPTS`].
#[utoipa::path(
    post,
    path = "/v1/access/grants",
    request_body = IssueGrantRequest,
    responses(
        (status = 201, description = "Grant issued", body = IssuedGrantResponse),
        (status = 400, description = "Validation failed", body = crate::error::ErrorBody),
    ),
    tag = "package_access"
)]
pub(crate) async fn issue_grant(
    State(state): State<AppState>,
    session: SessionIdentity,
    body: Result<Json<IssueGrantRequest>, JsonRejection>,
) -> Result<(axum::http::StatusCode, Json<IssuedGrantResponse>), AppError> {
    authorize(Some(session), Requirement::Creator)?;
    let req = extract_validated_json(body)?;
    let pool = state.db()?;

    let package_type = ContentType::parse(&req.package_type)?;
    let expires_at = if req.no_expiry {
        None
    } else {
        Some(
            req.expires_at
                .unwrap_or_else(|| Utc::now() + Duration::days(DEFAULT_GRANT_TTL_DAYS)),
        )
    };

    for attempt in 1..=MAX_KEY_ATTEMPTS {
        let grant = AccessGrant {
            id: GrantId::new(),
            email: normalize_email(&req.email),
            access_key: generate_access_key(),
            package_id: ContentId::from_uuid(req.package_id),
            package_type,
            creator_id: AccountId::from_uuid(req.creator_id),
            expires_at,
            last_accessed_at: None,
            is_active: true,
            created_at: Utc::now(),
        };

        match db::package_access::insert(pool, &grant).await {
            Ok(()) => {
                return Ok((
                    axum::http::StatusCode::CREATED,
                    Json(IssuedGrantResponse {
                        id: grant.id,
                        email: grant.email,
                        access_key: grant.access_key,
                        package_id: grant.package_id,
                        package_type: grant.package_type,
                        expires_at: grant.expires_at,
                    }),
                ));
            }
            Err(e) => match AppError::from(e) {
                AppError::Conflict(_) => {
                    tracing::warn!(attempt, "access key collision, regenerating");
                    continue;
                }
                other => return Err(other),
            },
        }
    }

    Err(AppError::Internal(format!(
        "access key space exhausted after {MAX_KEY_ATTEMPTS} attempts"
    )))
}

/// POST /v1/access/verify — Verify an access key.
///
/// Valid grants get `last_accessed_at` stamped and a summary back; every
/// failure mode is the same 403.
#[utoipa::path(
    post,
    path = "/v1/access/verify",
    request_body = VerifyAccessRequest,
    responses(
        (status = 200, description = "Grant valid", body = GrantSummaryResponse),
        (status = 403, description = "Invalid or expired access key", body = crate::error::ErrorBody),
    ),
    tag = "package_access"
)]
pub(crate) async fn verify_access(
    State(state): State<AppState>,
    body: Result<Json<VerifyAccessRequest>, JsonRejection>,
) -> Result<Json<GrantSummaryResponse>, AppError> {
    let req = extract_validated_json(body)?;
    let pool = state.db()?;

    // One denial for every failure mode below.
    let denied = || AppError::Forbidden("invalid or expired access key".to_string());
    let now = Utc::now();

    let grant = match db::package_access::get_by_key(pool, &req.access_key).await {
        Ok(grant) => grant,
        Err(e) => {
            tracing::warn!(error = %e, "grant lookup failed during verification, denying");
            return Err(denied());
        }
    };
    let grant = grant.ok_or_else(denied)?;

    if !grant.matches(&req.email, &req.access_key, ContentId::from_uuid(req.package_id), now) {
        return Err(denied());
    }

    if let Err(e) = db::package_access::touch_last_accessed(pool, grant.id, now).await {
        // The grant is valid; a failed timestamp update should not deny
        // the buyer their content.
        tracing::warn!(grant_id = %grant.id, error = %e, "failed to update last_accessed_at");
    }

    Ok(Json(GrantSummaryResponse {
        package_id: grant.package_id,
        package_type: grant.package_type,
        creator_id: grant.creator_id,
        expires_at: grant.expires_at,
        verified_at: now,
    }))
}

/// DELETE /v1/access/grants/:id — Deactivate a grant (issuing creator
/// only).
#[utoipa::path(
    delete,
    path = "/v1/access/grants/{id}",
    params(("id" = Uuid, Path, description = "Grant ID")),
    responses(
        (status = 200, description = "Grant deactivated"),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "package_access"
)]
pub(crate) async fn deactivate_grant(
    State(state): State<AppState>,
    session: SessionIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let identity = authorize(Some(session), Requirement::Creator)?;
    let pool = state.db()?;
    let id = GrantId::from_uuid(id);

    // 404 rather than 403 for grants the caller does not own, so grant
    // ids cannot be probed.
    db::package_access::get_by_id(pool, id)
        .await?
        .filter(|g| g.creator_id == identity.account_id)
        .ok_or_else(|| AppError::not_found(format!("grant {id} not found")))?;

    if !db::package_access::deactivate(pool, id).await? {
        return Err(AppError::not_found(format!("grant {id} not found")));
    }
    Ok(Json(serde_json::json!({ "deactivated": true })))
}
