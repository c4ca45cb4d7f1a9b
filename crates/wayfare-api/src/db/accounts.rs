//! Account persistence operations.
//!
//! All functions take a `&PgPool` and operate on the `accounts` table.
//! Emails are stored lowercase; callers normalize before writing.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use wayfare_core::{normalize_email, AccountId, AccountKind};

use crate::models::AccountRecord;

/// Parameters for creating an account.
pub struct NewAccount<'a> {
    pub id: AccountId,
    pub kind: AccountKind,
    pub name: &'a str,
    pub email: &'a str,
    pub username: &'a str,
    pub password_hash: Option<&'a str>,
}

/// Insert a new account. A duplicate email or username surfaces as a
/// unique violation.
pub async fn insert(pool: &PgPool, account: &NewAccount<'_>) -> Result<AccountRecord, sqlx::Error> {
    let now = Utc::now();
    let row = sqlx::query_as::<_, AccountRow>(
        "INSERT INTO accounts (id, kind, name, email, username, password_hash, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
         RETURNING id, kind, name, email, username, bio, brand_color, payment_account_id,
                   created_at, updated_at",
    )
    .bind(account.id.as_uuid())
    .bind(account.kind.as_str())
    .bind(account.name)
    .bind(normalize_email(account.email))
    .bind(account.username)
    .bind(account.password_hash)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(row.into_record())
}

/// Fetch an account by id.
pub async fn get_by_id(pool: &PgPool, id: AccountId) -> Result<Option<AccountRecord>, sqlx::Error> {
    let row = sqlx::query_as::<_, AccountRow>(
        "SELECT id, kind, name, email, username, bio, brand_color, payment_account_id,
                created_at, updated_at
         FROM accounts WHERE id = $1",
    )
    .bind(id.as_uuid())
    .fetch_optional(pool)
    .await?;

    Ok(row.map(AccountRow::into_record))
}

/// List accounts with pagination.
pub async fn list(
    pool: &PgPool,
    limit: i64,
    offset: i64,
) -> Result<Vec<AccountRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, AccountRow>(
        "SELECT id, kind, name, email, username, bio, brand_color, payment_account_id,
                created_at, updated_at
         FROM accounts ORDER BY created_at DESC LIMIT $1 OFFSET $2",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(AccountRow::into_record).collect())
}

/// Credentials for sign-in, looked up by normalized email.
pub struct Credentials {
    pub id: AccountId,
    pub kind: AccountKind,
    pub password_hash: Option<String>,
}

/// Fetch sign-in credentials by email. The password hash never travels
/// through [`AccountRecord`].
pub async fn fetch_credentials(
    pool: &PgPool,
    email: &str,
) -> Result<Option<Credentials>, sqlx::Error> {
    let row: Option<(Uuid, String, Option<String>)> =
        sqlx::query_as("SELECT id, kind, password_hash FROM accounts WHERE email = $1")
            .bind(normalize_email(email))
            .fetch_optional(pool)
            .await?;

    Ok(row.and_then(|(id, kind, password_hash)| {
        let kind = match AccountKind::parse(&kind) {
            Ok(kind) => kind,
            Err(_) => {
                tracing::warn!(account_id = %id, kind, "skipping account row with unknown kind");
                return None;
            }
        };
        Some(Credentials {
            id: AccountId::from_uuid(id),
            kind,
            password_hash,
        })
    }))
}

/// Profile fields a caller may update on their own account.
pub struct AccountPatch<'a> {
    pub name: Option<&'a str>,
    pub bio: Option<&'a str>,
    pub brand_color: Option<&'a str>,
}

/// Update profile fields. Returns the updated record, or `None` when the
/// account does not exist.
pub async fn update_profile(
    pool: &PgPool,
    id: AccountId,
    patch: &AccountPatch<'_>,
) -> Result<Option<AccountRecord>, sqlx::Error> {
    let row = sqlx::query_as::<_, AccountRow>(
        "UPDATE accounts
         SET name = COALESCE($2, name),
             bio = COALESCE($3, bio),
             brand_color = COALESCE($4, brand_color),
             updated_at = $5
         WHERE id = $1
         RETURNING id, kind, name, email, username, bio, brand_color, payment_account_id,
                   created_at, updated_at",
    )
    .bind(id.as_uuid())
    .bind(patch.name)
    .bind(patch.bio)
    .bind(patch.brand_color)
    .bind(Utc::now())
    .fetch_optional(pool)
    .await?;

    Ok(row.map(AccountRow::into_record))
}

/// Set or clear the linked payment-provider account id.
pub async fn set_payment_account(
    pool: &PgPool,
    id: AccountId,
    payment_account_id: Option<&str>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE accounts SET payment_account_id = $2, updated_at = $3 WHERE id = $1",
    )
    .bind(id.as_uuid())
    .bind(payment_account_id)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    kind: String,
    name: String,
    email: String,
    username: String,
    bio: Option<String>,
    brand_color: Option<String>,
    payment_account_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AccountRow {
    fn into_record(self) -> AccountRecord {
        let kind = match AccountKind::parse(&self.kind) {
            Ok(kind) => kind,
            Err(_) => {
                // The column is constrained to known values; a mismatch
                // means a bad manual write. Surface as user rather than
                // dropping the row from listings.
                tracing::warn!(account_id = %self.id, kind = %self.kind, "unknown account kind in database, defaulting to user");
                AccountKind::User
            }
        };
        AccountRecord {
            id: AccountId::from_uuid(self.id),
            kind,
            name: self.name,
            email: self.email,
            username: self.username,
            bio: self.bio,
            brand_color: self.brand_color,
            payment_account_id: self.payment_account_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
