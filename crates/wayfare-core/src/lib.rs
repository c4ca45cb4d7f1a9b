//! # wayfare-core — Domain Types for the Wayfare Storefront
//!
//! Pure domain logic shared by the API layer: identifier newtypes, the
//! account-kind tagged union, content and purchase lifecycles, the
//! access-control decision policy, and package-access grant verification.
//!
//! This crate performs no I/O. Everything here is a function of its inputs,
//! which is what makes the access-control and grant-verification invariants
//! unit- and property-testable without a database.
//!
//! ## Modules
//!
//! - [`identity`]: UUID-backed identifier newtypes ([`AccountId`],
//!   [`ContentId`], [`PurchaseId`], [`GrantId`], [`DiscountId`],
//!   [`RefundId`]).
//! - [`account`]: [`AccountKind`] — creators publish, users purchase.
//! - [`content`]: [`ContentType`] (Trip / GoTo) and [`ContentStatus`]
//!   (draft / launch).
//! - [`purchase`]: [`PurchaseStatus`] with runtime transition legality.
//! - [`access`]: the [`decide_access`] policy function and its
//!   [`AccessDecision`] result.
//! - [`grant`]: [`AccessGrant`] and the single indistinguishable-failure
//!   verification predicate.
//! - [`error`]: structured [`ValidationError`] hierarchy.

pub mod access;
pub mod account;
pub mod content;
pub mod error;
pub mod grant;
pub mod identity;
pub mod purchase;

// Re-export primary types.
pub use access::{AccessDecision, AllowReason, DenyReason, decide_access};
pub use account::AccountKind;
pub use content::{ContentStatus, ContentType};
pub use error::ValidationError;
pub use grant::{normalize_email, AccessGrant, ACCESS_KEY_BYTES, ACCESS_KEY_HEX_LEN};
pub use identity::{AccountId, ContentId, DiscountId, GrantId, PurchaseId, RefundId};
pub use purchase::{PurchaseStateError, PurchaseStatus, RefundStatus};
