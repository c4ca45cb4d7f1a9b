//! # Persistent Record Types
//!
//! The storefront's stored records, as returned by the `db` modules and
//! serialized by route handlers. Domain enums come from `wayfare-core`;
//! these structs add the persistence fields (timestamps, aggregates,
//! provider references).
//!
//! `AccountRecord` deliberately omits the password hash — credentials
//! only ever travel through `db::accounts::fetch_credentials`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use wayfare_core::{
    AccountId, AccountKind, ContentId, ContentStatus, ContentType, DiscountId, PurchaseId,
    PurchaseStatus, RefundId, RefundStatus,
};

/// An account: the tagged union of the creator and user kinds.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccountRecord {
    #[schema(value_type = uuid::Uuid)]
    pub id: AccountId,
    #[schema(value_type = String)]
    pub kind: AccountKind,
    pub name: String,
    /// Stored lowercase; unique across both kinds.
    pub email: String,
    pub username: String,
    /// Creator profile fields; `None` for users.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_color: Option<String>,
    /// Payment-provider account linked via the connect flow.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_account_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A Trip: a bookable travel content package.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TripRecord {
    #[schema(value_type = uuid::Uuid)]
    pub id: ContentId,
    #[schema(value_type = uuid::Uuid)]
    pub creator_id: AccountId,
    pub title: String,
    pub description: Option<String>,
    pub destination: Option<String>,
    pub starts_on: Option<NaiveDate>,
    pub ends_on: Option<NaiveDate>,
    /// The gated payload; only delivered through the access-checked
    /// content endpoint.
    pub itinerary: serde_json::Value,
    pub price_cents: i64,
    pub currency: String,
    #[schema(value_type = String)]
    pub status: ContentStatus,
    pub rating_sum: i64,
    pub rating_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A GoTo: a bookable local-guide content package.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GoToRecord {
    #[schema(value_type = uuid::Uuid)]
    pub id: ContentId,
    #[schema(value_type = uuid::Uuid)]
    pub creator_id: AccountId,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    /// The gated payload; only delivered through the access-checked
    /// content endpoint.
    pub content: serde_json::Value,
    pub price_cents: i64,
    pub currency: String,
    #[schema(value_type = String)]
    pub status: ContentStatus,
    pub rating_sum: i64,
    pub rating_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A purchase linking a buyer to a content package.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PurchaseRecord {
    #[schema(value_type = uuid::Uuid)]
    pub id: PurchaseId,
    #[schema(value_type = uuid::Uuid)]
    pub buyer_id: AccountId,
    #[schema(value_type = uuid::Uuid)]
    pub content_id: ContentId,
    #[schema(value_type = String)]
    pub content_type: ContentType,
    #[schema(value_type = String)]
    pub status: PurchaseStatus,
    pub amount_cents: i64,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_code: Option<String>,
    /// Order reference at the payment provider, set by the webhook.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_order_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A discount code owned by a creator.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DiscountRecord {
    #[schema(value_type = uuid::Uuid)]
    pub id: DiscountId,
    #[schema(value_type = uuid::Uuid)]
    pub creator_id: AccountId,
    /// Unique across all creators.
    pub code: String,
    pub percent_off: i32,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_uses: Option<i32>,
    pub use_count: i32,
    pub created_at: DateTime<Utc>,
}

impl DiscountRecord {
    /// Whether the discount can be applied right now.
    pub fn is_redeemable(&self, now: DateTime<Utc>) -> bool {
        if !self.is_active {
            return false;
        }
        if let Some(expires_at) = self.expires_at {
            if now >= expires_at {
                return false;
            }
        }
        if let Some(max_uses) = self.max_uses {
            if self.use_count >= max_uses {
                return false;
            }
        }
        true
    }

    /// Apply the discount to an amount in cents, rounding down.
    pub fn apply_to(&self, amount_cents: i64) -> i64 {
        amount_cents - (amount_cents * i64::from(self.percent_off)) / 100
    }
}

/// A refund request against a purchase.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RefundRecord {
    #[schema(value_type = uuid::Uuid)]
    pub id: RefundId,
    #[schema(value_type = uuid::Uuid)]
    pub purchase_id: PurchaseId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[schema(value_type = String)]
    pub status: RefundStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn discount(percent_off: i32) -> DiscountRecord {
        DiscountRecord {
            id: DiscountId::new(),
            creator_id: AccountId::new(),
            code: "SUMMER10".to_string(),
            percent_off,
            is_active: true,
            expires_at: None,
            max_uses: None,
            use_count: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn redeemable_when_active_and_unbounded() {
        assert!(discount(10).is_redeemable(Utc::now()));
    }

    #[test]
    fn inactive_discount_is_not_redeemable() {
        let mut d = discount(10);
        d.is_active = false;
        assert!(!d.is_redeemable(Utc::now()));
    }

    #[test]
    fn expired_discount_is_not_redeemable() {
        let mut d = discount(10);
        d.expires_at = Some(Utc::now() - Duration::hours(1));
        assert!(!d.is_redeemable(Utc::now()));
    }

    #[test]
    fn exhausted_discount_is_not_redeemable() {
        let mut d = discount(10);
        d.max_uses = Some(5);
        d.use_count = 5;
        assert!(!d.is_redeemable(Utc::now()));
    }

    #[test]
    fn apply_rounds_down() {
        assert_eq!(discount(10).apply_to(999), 900);
        assert_eq!(discount(100).apply_to(4500), 0);
        assert_eq!(discount(33).apply_to(100), 67);
    }

    #[test]
    fn account_record_serializes_without_creator_fields_for_users() {
        let account = AccountRecord {
            id: AccountId::new(),
            kind: AccountKind::User,
            name: "Jo".to_string(),
            email: "jo@example.com".to_string(),
            username: "jo".to_string(),
            bio: None,
            brand_color: None,
            payment_account_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&account).unwrap();
        assert!(json.get("bio").is_none());
        assert!(json.get("payment_account_id").is_none());
        assert_eq!(json["kind"], "user");
    }
}
