//! # API Route Modules
//!
//! Route modules for the storefront API surface:
//!
//! - `auth` — signup and signin, issuing session tokens.
//! - `accounts` — account profile CRUD (no hard delete).
//! - `trips` — Trip CRUD plus the access-gated content endpoint.
//! - `gotos` — GoTo CRUD plus the access-gated content endpoint.
//! - `purchases` — checkout initiation, purchase views, and the payment
//!   provider's confirmation webhook.
//! - `refunds` — refund requests and creator-side processing.
//! - `discounts` — discount-code CRUD.
//! - `package_access` — package-access key issuance, verification, and
//!   deactivation.
//! - `media` — object-storage upload/delete and the public streaming
//!   proxy.
//! - `connect` — payment-provider OAuth connect flow (authorize URL,
//!   callback exchange, disconnect).

pub mod accounts;
pub mod auth;
pub mod connect;
pub mod discounts;
pub mod gotos;
pub mod media;
pub mod package_access;
pub mod purchases;
pub mod refunds;
pub mod trips;

/// Cap and default for list pagination.
pub(crate) const MAX_PAGE_SIZE: i64 = 100;
pub(crate) const DEFAULT_PAGE_SIZE: i64 = 20;

/// Common pagination query parameters.
#[derive(Debug, serde::Deserialize, utoipa::IntoParams)]
pub(crate) struct Pagination {
    /// Page size; clamped to 100.
    pub limit: Option<i64>,
    /// Offset into the result set.
    pub offset: Option<i64>,
}

impl Pagination {
    /// Clamped (limit, offset).
    pub(crate) fn clamp(&self) -> (i64, i64) {
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let offset = self.offset.unwrap_or(0).max(0);
        (limit, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults() {
        let p = Pagination {
            limit: None,
            offset: None,
        };
        assert_eq!(p.clamp(), (DEFAULT_PAGE_SIZE, 0));
    }

    #[test]
    fn pagination_clamps_extremes() {
        let p = Pagination {
            limit: Some(10_000),
            offset: Some(-5),
        };
        assert_eq!(p.clamp(), (MAX_PAGE_SIZE, 0));
        let p = Pagination {
            limit: Some(0),
            offset: Some(40),
        };
        assert_eq!(p.clamp(), (1, 40));
    }
}
