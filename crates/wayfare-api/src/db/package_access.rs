//! Package-access grant persistence operations.
//!
//! All functions take a `&PgPool` and operate on the
//! `package_access_grants` table. The unique index on `access_key` is the
//! collision check behind key issuance: the insert fails with a unique
//! violation and the caller regenerates.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use wayfare_core::{AccessGrant, AccountId, ContentId, ContentType, GrantId};

const COLUMNS: &str = "id, email, access_key, package_id, package_type, creator_id, expires_at,
     last_accessed_at, is_active, created_at";

/// Insert a new grant. A key collision surfaces as a unique violation.
pub async fn insert(pool: &PgPool, grant: &AccessGrant) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO package_access_grants (id, email, access_key, package_id, package_type,
         creator_id, expires_at, last_accessed_at, is_active, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(grant.id.as_uuid())
    .bind(&grant.email)
    .bind(&grant.access_key)
    .bind(grant.package_id.as_uuid())
    .bind(grant.package_type.as_str())
    .bind(grant.creator_id.as_uuid())
    .bind(grant.expires_at)
    .bind(grant.last_accessed_at)
    .bind(grant.is_active)
    .bind(grant.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Fetch a grant by its access key.
///
/// Verification fetches by key alone and leaves the full
/// (email, key, package) match to [`AccessGrant::matches`], so every
/// failure mode takes the same code path.
pub async fn get_by_key(pool: &PgPool, access_key: &str) -> Result<Option<AccessGrant>, sqlx::Error> {
    let row = sqlx::query_as::<_, GrantRow>(&format!(
        "SELECT {COLUMNS} FROM package_access_grants WHERE access_key = $1"
    ))
    .bind(access_key)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(GrantRow::into_grant))
}

/// Fetch a grant by id.
pub async fn get_by_id(pool: &PgPool, id: GrantId) -> Result<Option<AccessGrant>, sqlx::Error> {
    let row = sqlx::query_as::<_, GrantRow>(&format!(
        "SELECT {COLUMNS} FROM package_access_grants WHERE id = $1"
    ))
    .bind(id.as_uuid())
    .fetch_optional(pool)
    .await?;

    Ok(row.map(GrantRow::into_grant))
}

/// Record a successful verification.
pub async fn touch_last_accessed(
    pool: &PgPool,
    id: GrantId,
    now: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("UPDATE package_access_grants SET last_accessed_at = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(now)
            .execute(pool)
            .await?;

    Ok(result.rows_affected() > 0)
}

/// Deactivate a grant. Returns whether a row was updated.
pub async fn deactivate(pool: &PgPool, id: GrantId) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE package_access_grants SET is_active = false WHERE id = $1")
        .bind(id.as_uuid())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct GrantRow {
    id: Uuid,
    email: String,
    access_key: String,
    package_id: Uuid,
    package_type: String,
    creator_id: Uuid,
    expires_at: Option<DateTime<Utc>>,
    last_accessed_at: Option<DateTime<Utc>>,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl GrantRow {
    fn into_grant(self) -> AccessGrant {
        let package_type = match ContentType::parse(&self.package_type) {
            Ok(ty) => ty,
            Err(_) => {
                tracing::warn!(grant_id = %self.id, package_type = %self.package_type, "unknown package type in database, defaulting to trip");
                ContentType::Trip
            }
        };
        AccessGrant {
            id: GrantId::from_uuid(self.id),
            email: self.email,
            access_key: self.access_key,
            package_id: ContentId::from_uuid(self.package_id),
            package_type,
            creator_id: AccountId::from_uuid(self.creator_id),
            expires_at: self.expires_at,
            last_accessed_at: self.last_accessed_at,
            is_active: self.is_active,
            created_at: self.created_at,
        }
    }
}
