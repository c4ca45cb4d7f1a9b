//! Discount persistence operations.
//!
//! All functions take a `&PgPool` and operate on the `discounts` table.
//! The unique index on `code` backs the duplicate-code 409.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use wayfare_core::{AccountId, DiscountId};

use crate::models::DiscountRecord;

const COLUMNS: &str = "id, creator_id, code, percent_off, is_active, expires_at, max_uses,
     use_count, created_at";

/// Insert a new discount record.
pub async fn insert(pool: &PgPool, record: &DiscountRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO discounts (id, creator_id, code, percent_off, is_active, expires_at,
         max_uses, use_count, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(record.id.as_uuid())
    .bind(record.creator_id.as_uuid())
    .bind(&record.code)
    .bind(record.percent_off)
    .bind(record.is_active)
    .bind(record.expires_at)
    .bind(record.max_uses)
    .bind(record.use_count)
    .bind(record.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Fetch a discount by id.
pub async fn get_by_id(
    pool: &PgPool,
    id: DiscountId,
) -> Result<Option<DiscountRecord>, sqlx::Error> {
    let row = sqlx::query_as::<_, DiscountRow>(&format!(
        "SELECT {COLUMNS} FROM discounts WHERE id = $1"
    ))
    .bind(id.as_uuid())
    .fetch_optional(pool)
    .await?;

    Ok(row.map(DiscountRow::into_record))
}

/// Fetch a discount by its code.
pub async fn get_by_code(
    pool: &PgPool,
    code: &str,
) -> Result<Option<DiscountRecord>, sqlx::Error> {
    let row = sqlx::query_as::<_, DiscountRow>(&format!(
        "SELECT {COLUMNS} FROM discounts WHERE code = $1"
    ))
    .bind(code)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(DiscountRow::into_record))
}

/// List a creator's discounts, newest first.
pub async fn list_for_creator(
    pool: &PgPool,
    creator_id: AccountId,
    limit: i64,
    offset: i64,
) -> Result<Vec<DiscountRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, DiscountRow>(&format!(
        "SELECT {COLUMNS} FROM discounts
         WHERE creator_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3"
    ))
    .bind(creator_id.as_uuid())
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(DiscountRow::into_record).collect())
}

/// Fields a creator may change on an existing discount.
pub struct DiscountPatch {
    pub percent_off: Option<i32>,
    pub is_active: Option<bool>,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_uses: Option<i32>,
}

/// Update a discount. Returns the updated record, or `None` when it does
/// not exist.
pub async fn update(
    pool: &PgPool,
    id: DiscountId,
    patch: &DiscountPatch,
) -> Result<Option<DiscountRecord>, sqlx::Error> {
    let row = sqlx::query_as::<_, DiscountRow>(&format!(
        "UPDATE discounts
         SET percent_off = COALESCE($2, percent_off),
             is_active = COALESCE($3, is_active),
             expires_at = COALESCE($4, expires_at),
             max_uses = COALESCE($5, max_uses)
         WHERE id = $1
         RETURNING {COLUMNS}"
    ))
    .bind(id.as_uuid())
    .bind(patch.percent_off)
    .bind(patch.is_active)
    .bind(patch.expires_at)
    .bind(patch.max_uses)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(DiscountRow::into_record))
}

/// Delete a discount. Returns whether a row was removed.
pub async fn delete(pool: &PgPool, id: DiscountId) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM discounts WHERE id = $1")
        .bind(id.as_uuid())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Count one redemption against a discount.
pub async fn increment_use_count(pool: &PgPool, id: DiscountId) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE discounts SET use_count = use_count + 1 WHERE id = $1")
        .bind(id.as_uuid())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct DiscountRow {
    id: Uuid,
    creator_id: Uuid,
    code: String,
    percent_off: i32,
    is_active: bool,
    expires_at: Option<DateTime<Utc>>,
    max_uses: Option<i32>,
    use_count: i32,
    created_at: DateTime<Utc>,
}

impl DiscountRow {
    fn into_record(self) -> DiscountRecord {
        DiscountRecord {
            id: DiscountId::from_uuid(self.id),
            creator_id: AccountId::from_uuid(self.creator_id),
            code: self.code,
            percent_off: self.percent_off,
            is_active: self.is_active,
            expires_at: self.expires_at,
            max_uses: self.max_uses,
            use_count: self.use_count,
            created_at: self.created_at,
        }
    }
}
