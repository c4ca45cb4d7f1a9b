//! Purchase persistence operations.
//!
//! All functions take a `&PgPool` and operate on the `purchases` table.
//! Status strings are owned by [`wayfare_core::PurchaseStatus`]; transition
//! legality is checked by callers before a status write.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use wayfare_core::{AccountId, ContentId, ContentType, PurchaseId, PurchaseStatus};

use crate::models::PurchaseRecord;

const COLUMNS: &str = "id, buyer_id, content_id, content_type, status, amount_cents, currency,
     discount_code, provider_order_id, created_at, updated_at";

/// Insert a new purchase record.
pub async fn insert(pool: &PgPool, record: &PurchaseRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO purchases (id, buyer_id, content_id, content_type, status, amount_cents,
         currency, discount_code, provider_order_id, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
    )
    .bind(record.id.as_uuid())
    .bind(record.buyer_id.as_uuid())
    .bind(record.content_id.as_uuid())
    .bind(record.content_type.as_str())
    .bind(record.status.as_str())
    .bind(record.amount_cents)
    .bind(&record.currency)
    .bind(&record.discount_code)
    .bind(&record.provider_order_id)
    .bind(record.created_at)
    .bind(record.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Fetch a purchase by id.
pub async fn get_by_id(
    pool: &PgPool,
    id: PurchaseId,
) -> Result<Option<PurchaseRecord>, sqlx::Error> {
    let row = sqlx::query_as::<_, PurchaseRow>(&format!(
        "SELECT {COLUMNS} FROM purchases WHERE id = $1"
    ))
    .bind(id.as_uuid())
    .fetch_optional(pool)
    .await?;

    Ok(row.map(PurchaseRow::into_record))
}

/// List a buyer's purchases, newest first.
pub async fn list_for_buyer(
    pool: &PgPool,
    buyer_id: AccountId,
    limit: i64,
    offset: i64,
) -> Result<Vec<PurchaseRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, PurchaseRow>(&format!(
        "SELECT {COLUMNS} FROM purchases
         WHERE buyer_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3"
    ))
    .bind(buyer_id.as_uuid())
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(PurchaseRow::into_record).collect())
}

/// Whether a completed purchase exists for (buyer, content). This is the
/// purchase half of the access-control check.
pub async fn completed_exists(
    pool: &PgPool,
    buyer_id: AccountId,
    content_id: ContentId,
    content_type: ContentType,
) -> Result<bool, sqlx::Error> {
    let row: Option<(i32,)> = sqlx::query_as(
        "SELECT 1 FROM purchases
         WHERE buyer_id = $1 AND content_id = $2 AND content_type = $3 AND status = 'completed'
         LIMIT 1",
    )
    .bind(buyer_id.as_uuid())
    .bind(content_id.as_uuid())
    .bind(content_type.as_str())
    .fetch_optional(pool)
    .await?;

    Ok(row.is_some())
}

/// Update a purchase's status (and optionally the provider order
/// reference). Returns whether a row was updated.
pub async fn set_status(
    pool: &PgPool,
    id: PurchaseId,
    status: PurchaseStatus,
    provider_order_id: Option<&str>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE purchases
         SET status = $2, provider_order_id = COALESCE($3, provider_order_id), updated_at = $4
         WHERE id = $1",
    )
    .bind(id.as_uuid())
    .bind(status.as_str())
    .bind(provider_order_id)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct PurchaseRow {
    id: Uuid,
    buyer_id: Uuid,
    content_id: Uuid,
    content_type: String,
    status: String,
    amount_cents: i64,
    currency: String,
    discount_code: Option<String>,
    provider_order_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PurchaseRow {
    fn into_record(self) -> PurchaseRecord {
        let content_type = match ContentType::parse(&self.content_type) {
            Ok(ty) => ty,
            Err(_) => {
                tracing::warn!(purchase_id = %self.id, content_type = %self.content_type, "unknown content type in database, defaulting to trip");
                ContentType::Trip
            }
        };
        let status = match PurchaseStatus::parse(&self.status) {
            Ok(status) => status,
            Err(_) => {
                // Fail toward the non-access-granting state.
                tracing::warn!(purchase_id = %self.id, status = %self.status, "unknown purchase status in database, defaulting to failed");
                PurchaseStatus::Failed
            }
        };
        PurchaseRecord {
            id: PurchaseId::from_uuid(self.id),
            buyer_id: AccountId::from_uuid(self.buyer_id),
            content_id: ContentId::from_uuid(self.content_id),
            content_type,
            status,
            amount_cents: self.amount_cents,
            currency: self.currency,
            discount_code: self.discount_code,
            provider_order_id: self.provider_order_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
