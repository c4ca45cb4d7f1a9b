//! # Account Kinds
//!
//! The storefront has two disjoint account kinds: **creators** publish
//! content packages, **users** purchase access to them. They share one
//! record shape (name, email, username, optional password hash), so they
//! are a single collection discriminated by kind rather than two
//! structurally-duplicated ones.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// The kind of an account.
///
/// An email address belongs to at most one account of either kind; the
/// kinds are disjoint and never overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    /// Publishes Trips and GoTos and receives payouts.
    Creator,
    /// Purchases access to published content.
    User,
}

impl AccountKind {
    /// The database/wire representation of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Creator => "creator",
            Self::User => "user",
        }
    }

    /// Parse a kind from its database/wire representation.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s {
            "creator" => Ok(Self::Creator),
            "user" => Ok(Self::User),
            other => Err(ValidationError::UnknownAccountKind(other.to_string())),
        }
    }
}

impl std::fmt::Display for AccountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_roundtrips_through_str() {
        for kind in [AccountKind::Creator, AccountKind::User] {
            assert_eq!(AccountKind::parse(kind.as_str()).unwrap(), kind);
        }
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let err = AccountKind::parse("admin").unwrap_err();
        assert!(err.to_string().contains("admin"));
    }

    #[test]
    fn kind_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&AccountKind::Creator).unwrap(),
            "\"creator\""
        );
    }
}
