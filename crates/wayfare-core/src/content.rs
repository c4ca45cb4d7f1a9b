//! # Content Types and Status
//!
//! Trips and GoTos are the two content-package types a creator sells
//! access to. They differ only in the shape of their metadata — access
//! semantics are identical, which is why a `(ContentId, ContentType)`
//! pair is the unit the access-control policy operates on.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Discriminates the two content-package collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Trip,
    GoTo,
}

impl ContentType {
    /// The database/wire representation of this content type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trip => "trip",
            Self::GoTo => "goto",
        }
    }

    /// Parse a content type from its database/wire representation.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s {
            "trip" => Ok(Self::Trip),
            "goto" => Ok(Self::GoTo),
            other => Err(ValidationError::UnknownContentType(other.to_string())),
        }
    }

    /// Human-readable name used in client-facing messages ("Trip", "GoTo").
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Trip => "Trip",
            Self::GoTo => "GoTo",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Publication status of a content package.
///
/// Only `Launch` content is publicly visible; `Draft` content is visible
/// to its owning creator alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentStatus {
    Draft,
    Launch,
}

impl ContentStatus {
    /// The database/wire representation of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Launch => "launch",
        }
    }

    /// Parse a status from its database/wire representation.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s {
            "draft" => Ok(Self::Draft),
            "launch" => Ok(Self::Launch),
            other => Err(ValidationError::UnknownContentStatus(other.to_string())),
        }
    }

    /// Whether content with this status appears in public listings.
    pub fn is_public(&self) -> bool {
        matches!(self, Self::Launch)
    }
}

impl std::fmt::Display for ContentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_roundtrips_through_str() {
        for ty in [ContentType::Trip, ContentType::GoTo] {
            assert_eq!(ContentType::parse(ty.as_str()).unwrap(), ty);
        }
    }

    #[test]
    fn content_status_roundtrips_through_str() {
        for st in [ContentStatus::Draft, ContentStatus::Launch] {
            assert_eq!(ContentStatus::parse(st.as_str()).unwrap(), st);
        }
    }

    #[test]
    fn only_launch_is_public() {
        assert!(ContentStatus::Launch.is_public());
        assert!(!ContentStatus::Draft.is_public());
    }

    #[test]
    fn unknown_values_are_rejected() {
        assert!(ContentType::parse("bundle").is_err());
        assert!(ContentStatus::parse("archived").is_err());
    }
}
