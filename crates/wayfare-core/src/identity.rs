//! # Identity Newtypes
//!
//! Domain-primitive newtypes for identifiers throughout the storefront.
//! Each identifier is a distinct type — you cannot pass an [`AccountId`]
//! where a [`ContentId`] is expected.
//!
//! All identifiers are UUID-backed and therefore always valid by
//! construction; there is no string-format validation in this module.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Implement the standard surface for a UUID-backed identifier newtype:
/// random construction, conversion from/to [`Uuid`], `Display`, and
/// `FromStr`.
macro_rules! uuid_newtype {
    ($(#[$doc:meta])* $ty:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $ty(Uuid);

        impl $ty {
            /// Create a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create an identifier from an existing UUID.
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Access the underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $ty {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $ty {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $ty {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::from_str(s).map(Self)
            }
        }
    };
}

uuid_newtype! {
    /// A unique identifier for an account (creator or user).
    AccountId
}

uuid_newtype! {
    /// A unique identifier for a content package (a Trip or a GoTo).
    ///
    /// Trips and GoTos live in separate tables but share one identifier
    /// space; a [`ContentId`] is only meaningful together with a
    /// [`crate::ContentType`] tag.
    ContentId
}

uuid_newtype! {
    /// A unique identifier for a purchase record.
    PurchaseId
}

uuid_newtype! {
    /// A unique identifier for a package-access grant.
    GrantId
}

uuid_newtype! {
    /// A unique identifier for a discount.
    DiscountId
}

uuid_newtype! {
    /// A unique identifier for a refund request.
    RefundId
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn account_id_roundtrips_through_display() {
        let id = AccountId::new();
        let parsed = AccountId::from_str(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn content_id_from_uuid_preserves_value() {
        let raw = Uuid::new_v4();
        let id = ContentId::from_uuid(raw);
        assert_eq!(id.as_uuid(), &raw);
    }

    #[test]
    fn new_ids_are_distinct() {
        assert_ne!(PurchaseId::new(), PurchaseId::new());
        assert_ne!(GrantId::new(), GrantId::new());
    }

    #[test]
    fn id_serializes_as_plain_uuid_string() {
        let raw = Uuid::new_v4();
        let id = AccountId::from_uuid(raw);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{raw}\""));
    }

    #[test]
    fn invalid_string_fails_to_parse() {
        assert!(AccountId::from_str("not-a-uuid").is_err());
    }
}
