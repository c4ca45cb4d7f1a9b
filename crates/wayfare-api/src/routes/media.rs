//! # Media API
//!
//! Upload/delete against the object-storage backend, plus the public
//! streaming proxy. Uploads get a random key and return the public URL;
//! the proxy streams stored objects back with permissive CORS and a
//! one-year cache directive.

use axum::extract::{Multipart, Path, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::{authorize, Requirement, SessionIdentity};
use crate::error::AppError;
use crate::state::AppState;
use crate::storage::Storage;

/// Uploads are capped well below the router-wide body limit so one file
/// cannot monopolize a worker.
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Response to a successful upload.
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    pub key: String,
    pub url: String,
}

/// Build the media router. Upload and delete require a creator session;
/// the proxy is public.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/media",
            axum::routing::post(upload)
                .layer(axum::extract::DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/v1/media/:key", get(proxy_media).delete(delete_media))
}

/// POST /v1/media — Upload a file (multipart field `file`).
#[utoipa::path(
    post,
    path = "/v1/media",
    responses(
        (status = 201, description = "File stored", body = UploadResponse),
        (status = 400, description = "No file field", body = crate::error::ErrorBody),
        (status = 503, description = "Storage not configured", body = crate::error::ErrorBody),
    ),
    tag = "media"
)]
pub(crate) async fn upload(
    State(state): State<AppState>,
    session: SessionIdentity,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    authorize(Some(session), Requirement::Creator)?;
    let storage = state.media()?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().map(str::to_owned);
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("failed to read upload: {e}")))?
            .to_vec();

        let key = Storage::random_key(filename.as_deref());
        let url = storage
            .put(&key, &content_type, bytes)
            .await
            .map_err(AppError::Internal)?;

        tracing::info!(key = %key, content_type = %content_type, "media uploaded");
        return Ok((StatusCode::CREATED, Json(UploadResponse { key, url })));
    }

    Err(AppError::Validation(
        "multipart field 'file' is required".to_string(),
    ))
}

/// DELETE /v1/media/:key — Delete a stored object.
#[utoipa::path(
    delete,
    path = "/v1/media/{key}",
    params(("key" = String, Path, description = "Object key")),
    responses(
        (status = 200, description = "Object deleted"),
        (status = 503, description = "Storage not configured", body = crate::error::ErrorBody),
    ),
    tag = "media"
)]
pub(crate) async fn delete_media(
    State(state): State<AppState>,
    session: SessionIdentity,
    Path(key): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    authorize(Some(session), Requirement::Creator)?;
    let storage = state.media()?;
    storage.delete(&key).await.map_err(AppError::Internal)?;
    tracing::info!(key = %key, "media deleted");
    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// GET /v1/media/:key — Public streaming proxy.
///
/// Serves any stored object with permissive CORS and a one-year
/// immutable cache directive; object keys are unguessable, which is the
/// only access control this route has.
#[utoipa::path(
    get,
    path = "/v1/media/{key}",
    params(("key" = String, Path, description = "Object key")),
    responses(
        (status = 200, description = "Object bytes"),
        (status = 404, description = "No such object", body = crate::error::ErrorBody),
        (status = 503, description = "Storage not configured", body = crate::error::ErrorBody),
    ),
    tag = "media"
)]
pub(crate) async fn proxy_media(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let storage = state.media()?;
    let object = storage
        .get(&key)
        .await
        .map_err(AppError::Internal)?
        .ok_or_else(|| AppError::not_found(format!("object {key} not found")))?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&object.content_type)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
    );
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("public, max-age=31536000, immutable"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );

    Ok((StatusCode::OK, headers, object.bytes))
}
