//! Trip persistence operations.
//!
//! All functions take a `&PgPool` and operate on the `trips` table.
//! The (creator_id, title) unique index backs the duplicate-title 409.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use wayfare_core::{AccountId, ContentId, ContentStatus};

use crate::models::TripRecord;

const COLUMNS: &str = "id, creator_id, title, description, destination, starts_on, ends_on,
     itinerary, price_cents, currency, status, rating_sum, rating_count,
     created_at, updated_at";

/// Insert a new trip record.
pub async fn insert(pool: &PgPool, record: &TripRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO trips (id, creator_id, title, description, destination, starts_on, ends_on,
         itinerary, price_cents, currency, status, rating_sum, rating_count, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)",
    )
    .bind(record.id.as_uuid())
    .bind(record.creator_id.as_uuid())
    .bind(&record.title)
    .bind(&record.description)
    .bind(&record.destination)
    .bind(record.starts_on)
    .bind(record.ends_on)
    .bind(&record.itinerary)
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

/// Fetch a trip by id.
pub async fn get_by_id(pool: &PgPool, id: ContentId) -> Result<Option<TripRecord>, sqlx::Error> {
    let row = sqlx::query_as::<_, TripRow>(&format!(
        "SELECT {COLUMNS} FROM trips WHERE id = $1"
    ))
    .bind(id.as_uuid())
    .fetch_optional(pool)
    .await?;

    Ok(row.map(TripRow::into_record))
}

/// List launched trips, optionally filtered by creator, newest first.
pub async fn list_launched(
    pool: &PgPool,
    creator_id: Option<AccountId>,
    limit: i64,
    offset: i64,
) -> Result<Vec<TripRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, TripRow>(&format!(
        "SELECT {COLUMNS} FROM trips
         WHERE status = 'launch' AND ($1::uuid IS NULL OR creator_id = $1)
         ORDER BY created_at DESC LIMIT $2 OFFSET $3"
    ))
    .bind(creator_id.map(|c| *c.as_uuid()))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(TripRow::into_record).collect())
}

/// Fields a creator may change on an existing trip.
pub struct TripPatch<'a> {
    pub title: Option<&'a str>,
    pub description: Option<&'a str>,
    pub destination: Option<&'a str>,
    pub starts_on: Option<NaiveDate>,
    pub ends_on: Option<NaiveDate>,
    pub itinerary: Option<&'a serde_json::Value>,
    pub price_cents: Option<i64>,
    pub currency: Option<&'a str>,
    pub status: Option<ContentStatus>,
}

/// Update a trip. Returns the updated record, or `None` when the trip
/// does not exist.
pub async fn update(
    pool: &PgPool,
    id: ContentId,
    patch: &TripPatch<'_>,
) -> Result<Option<TripRecord>, sqlx::Error> {
    let row = sqlx::query_as::<_, TripRow>(&format!(
        "UPDATE trips
         SET title = COALESCE($2, title),
             description = COALESCE($3, description),
             destination = COALESCE($4, destination),
             starts_on = COALESCE($5, starts_on),
             ends_on = COALESCE($6, ends_on),
             itinerary = COALESCE($7, itinerary),
             price_cents = COALESCE($8, price_cents),
             currency = COALESCE($9, currency),
             status = COALESCE($10, status),
             updated_at = $11
         WHERE id = $1
         RETURNING {COLUMNS}"
    ))
    .bind(id.as_uuid())
    .bind(patch.title)
    .bind(patch.description)
    .bind(patch.destination)
    .bind(patch.starts_on)
    .bind(patch.ends_on)
    .bind(patch.itinerary)
    .bind(patch.price_cents)
    .bind(patch.currency)
    .bind(patch.status.map(|s| s.as_str()))
    .bind(Utc::now())
    .fetch_optional(pool)
    .await?;

    Ok(row.map(TripRow::into_record))
}

/// Delete a trip. Returns whether a row was removed.
pub async fn delete(pool: &PgPool, id: ContentId) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM trips WHERE id = $1")
        .bind(id.as_uuid())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Owning creator of a trip, for the access-control check.
pub async fn owner_of(pool: &PgPool, id: ContentId) -> Result<Option<AccountId>, sqlx::Error> {
    let row: Option<(Uuid,)> = sqlx::query_as("SELECT creator_id FROM trips WHERE id = $1")
        .bind(id.as_uuid())
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|(creator_id,)| AccountId::from_uuid(creator_id)))
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct TripRow {
    id: Uuid,
    creator_id: Uuid,
    title: String,
    description: Option<String>,
    destination: Option<String>,
    starts_on: Option<NaiveDate>,
    ends_on: Option<NaiveDate>,
    itinerary: serde_json::Value,
    price_cents: i64,
    currency: String,
    status: String,
    rating_sum: i64,
    rating_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TripRow {
    fn into_record(self) -> TripRecord {
        let status = match ContentStatus::parse(&self.status) {
            Ok(status) => status,
            Err(_) => {
                tracing::warn!(trip_id = %self.id, status = %self.status, "unknown trip status in database, defaulting to draft");
                ContentStatus::Draft
            }
        };
        TripRecord {
            id: ContentId::from_uuid(self.id),
            creator_id: AccountId::from_uuid(self.creator_id),
            title: self.title,
            description: self.description,
            destination: self.destination,
            starts_on: self.starts_on,
            ends_on: self.ends_on,
            itinerary: self.itinerary,
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
