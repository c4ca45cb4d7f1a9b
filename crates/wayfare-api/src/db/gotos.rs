//! GoTo persistence operations.
//!
//! All functions take a `&PgPool` and operate on the `gotos` table.
//! The (creator_id, title) unique index backs the duplicate-title 409.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use wayfare_core::{AccountId, ContentId, ContentStatus};

use crate::models::GoToRecord;

const COLUMNS: &str = "id, creator_id, title, description, category, location, content,
     price_cents, currency, status, rating_sum, rating_count, created_at, updated_at";

/// Insert a new GoTo record.
pub async fn insert(pool: &PgPool, record: &GoToRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO gotos (id, creator_id, title, description, category, location, content,
         price_cents, currency, status, rating_sum, rating_count, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
    )
    .bind(record.id.as_uuid())
    .bind(record.creator_id.as_uuid())
    .bind(&record.title)
    .bind(&record.description)
    .bind(&record.category)
    .bind(&record.location)
    .bind(&record.content)
    .bind(record.price_cents)
    .bind(&record.currency)
    .bind(record.status.as_str())
    .bind(record.rating_sum)
    .bind(record.rating_count)
    .bind(record.created_at)
    .bind(record.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Fetch a GoTo by id.
pub async fn get_by_id(pool: &PgPool, id: ContentId) -> Result<Option<GoToRecord>, sqlx::Error> {
    let row = sqlx::query_as::<_, GoToRow>(&format!(
        "SELECT {COLUMNS} FROM gotos WHERE id = $1"
    ))
    .bind(id.as_uuid())
    .fetch_optional(pool)
    .await?;

    Ok(row.map(GoToRow::into_record))
}

/// List launched GoTos, optionally filtered by creator, newest first.
pub async fn list_launched(
    pool: &PgPool,
    creator_id: Option<AccountId>,
    limit: i64,
    offset: i64,
) -> Result<Vec<GoToRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, GoToRow>(&format!(
        "SELECT {COLUMNS} FROM gotos
         WHERE status = 'launch' AND ($1::uuid IS NULL OR creator_id = $1)
         ORDER BY created_at DESC LIMIT $2 OFFSET $3"
    ))
    .bind(creator_id.map(|c| *c.as_uuid()))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(GoToRow::into_record).collect())
}

/// Fields a creator may change on an existing GoTo.
pub struct GoToPatch<'a> {
    pub title: Option<&'a str>,
    pub description: Option<&'a str>,
    pub category: Option<&'a str>,
    pub location: Option<&'a str>,
    pub content: Option<&'a serde_json::Value>,
    pub price_cents: Option<i64>,
    pub currency: Option<&'a str>,
    pub status: Option<ContentStatus>,
}

/// Update a GoTo. Returns the updated record, or `None` when it does not
/// exist.
pub async fn update(
    pool: &PgPool,
    id: ContentId,
    patch: &GoToPatch<'_>,
) -> Result<Option<GoToRecord>, sqlx::Error> {
    let row = sqlx::query_as::<_, GoToRow>(&format!(
        "UPDATE gotos
         SET title = COALESCE($2, title),
             description = COALESCE($3, description),
             category = COALESCE($4, category),
             location = COALESCE($5, location),
             content = COALESCE($6, content),
             price_cents = COALESCE($7, price_cents),
             currency = COALESCE($8, currency),
             status = COALESCE($9, status),
             updated_at = $10
         WHERE id = $1
         RETURNING {COLUMNS}"
    ))
    .bind(id.as_uuid())
    .bind(patch.title)
    .bind(patch.description)
    .bind(patch.category)
    .bind(patch.location)
    .bind(patch.content)
    .bind(patch.price_cents)
    .bind(patch.currency)
    .bind(patch.status.map(|s| s.as_str()))
    .bind(Utc::now())
    .fetch_optional(pool)
    .await?;

    Ok(row.map(GoToRow::into_record))
}

/// Delete a GoTo. Returns whether a row was removed.
pub async fn delete(pool: &PgPool, id: ContentId) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM gotos WHERE id = $1")
        .bind(id.as_uuid())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Owning creator of a GoTo, for the access-control check.
pub async fn owner_of(pool: &PgPool, id: ContentId) -> Result<Option<AccountId>, sqlx::Error> {
    let row: Option<(Uuid,)> = sqlx::query_as("SELECT creator_id FROM gotos WHERE id = $1")
        .bind(id.as_uuid())
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|(creator_id,)| AccountId::from_uuid(creator_id)))
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct GoToRow {
    id: Uuid,
    creator_id: Uuid,
    title: String,
    description: Option<String>,
    category: Option<String>,
    location: Option<String>,
    content: serde_json::Value,
    price_cents: i64,
    currency: String,
    status: String,
    rating_sum: i64,
    rating_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl GoToRow {
    fn into_record(self) -> GoToRecord {
        let status = match ContentStatus::parse(&self.status) {
            Ok(status) => status,
            Err(_) => {
                tracing::warn!(goto_id = %self.id, status = %self.status, "unknown goto status in database, defaulting to draft");
                ContentStatus::Draft
            }
        };
        GoToRecord {
            id: ContentId::from_uuid(self.id),
            creator_id: AccountId::from_uuid(self.creator_id),
            title: self.title,
            description: self.description,
            category: self.category,
            location: self.location,
            content: self.content,
            price_cents: self.price_cents,
            currency: self.currency,
            status,
            rating_sum: self.rating_sum,
            rating_count: self.rating_count,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
