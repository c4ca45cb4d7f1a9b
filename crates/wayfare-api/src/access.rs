//! # Access-Control Check
//!
//! The gated-content check: may this session view this content? Gathers
//! the two facts the pure policy needs — a completed purchase and the
//! owning creator — and applies [`wayfare_core::decide_access`].
//!
//! Lookup failures deny and log rather than propagate: access checks fail
//! closed.

use sqlx::PgPool;

use wayfare_core::{decide_access, AccessDecision, AccountId, ContentId, ContentType, DenyReason};

use crate::db;

/// A content reference: the unit the access check operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentRef {
    pub id: ContentId,
    pub content_type: ContentType,
}

/// Decide whether `caller` may view the referenced content.
///
/// Allows on a completed purchase for (caller, content), else on
/// ownership (drafts included), else denies. Read-only; a failed lookup
/// is a logged deny, never an allow and never a 500.
pub async fn may_view(pool: &PgPool, content: ContentRef, caller: AccountId) -> AccessDecision {
    let has_completed_purchase =
        match db::purchases::completed_exists(pool, caller, content.id, content.content_type).await
        {
            Ok(exists) => exists,
            Err(e) => {
                tracing::warn!(
                    content_id = %content.id,
                    error = %e,
                    "purchase lookup failed during access check, denying"
                );
                return AccessDecision::Denied(DenyReason::LookupFailed);
            }
        };

    // Skip the owner lookup when the purchase already decides it.
    if has_completed_purchase {
        return decide_access(caller, true, None);
    }

    let owner = match content.content_type {
        ContentType::Trip => db::trips::owner_of(pool, content.id).await,
        ContentType::GoTo => db::gotos::owner_of(pool, content.id).await,
    };
    let owner = match owner {
        Ok(owner) => owner,
        Err(e) => {
            tracing::warn!(
                content_id = %content.id,
                error = %e,
                "owner lookup failed during access check, denying"
            );
            return AccessDecision::Denied(DenyReason::LookupFailed);
        }
    };

    decide_access(caller, false, owner)
}
