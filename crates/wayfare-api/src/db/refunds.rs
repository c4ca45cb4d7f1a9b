//! Refund persistence operations.
//!
//! All functions take a `&PgPool` and operate on the `refunds` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use wayfare_core::{PurchaseId, RefundId, RefundStatus};

use crate::models::RefundRecord;

const COLUMNS: &str = "id, purchase_id, reason, status, created_at, updated_at";

/// Insert a new refund request.
pub async fn insert(pool: &PgPool, record: &RefundRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO refunds (id, purchase_id, reason, status, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(record.id.as_uuid())
    .bind(record.purchase_id.as_uuid())
    .bind(&record.reason)
    .bind(record.status.as_str())
    .bind(record.created_at)
    .bind(record.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Fetch a refund by id.
pub async fn get_by_id(pool: &PgPool, id: RefundId) -> Result<Option<RefundRecord>, sqlx::Error> {
    let row = sqlx::query_as::<_, RefundRow>(&format!(
        "SELECT {COLUMNS} FROM refunds WHERE id = $1"
    ))
    .bind(id.as_uuid())
    .fetch_optional(pool)
    .await?;

    Ok(row.map(RefundRow::into_record))
}

/// Update a refund's status. Returns whether a row was updated.
pub async fn set_status(
    pool: &PgPool,
    id: RefundId,
    status: RefundStatus,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE refunds SET status = $2, updated_at = $3 WHERE id = $1")
        .bind(id.as_uuid())
        .bind(status.as_str())
        .bind(Utc::now())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct RefundRow {
    id: Uuid,
    purchase_id: Uuid,
    reason: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl RefundRow {
    fn into_record(self) -> RefundRecord {
        let status = match RefundStatus::parse(&self.status) {
            Ok(status) => status,
            Err(_) => {
                tracing::warn!(refund_id = %self.id, status = %self.status, "unknown refund status in database, defaulting to requested");
                RefundStatus::Requested
            }
        };
        RefundRecord {
            id: RefundId::from_uuid(self.id),
            purchase_id: PurchaseId::from_uuid(self.purchase_id),
            reason: self.reason,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
