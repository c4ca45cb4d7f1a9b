//! # Validation Errors
//!
//! Structured errors for domain-value parsing. The API layer converts
//! these into 400 responses naming the offending value.

use thiserror::Error;

/// A domain value failed validation at construction or parse time.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Account kind string is not `creator` or `user`.
    #[error("unknown account kind: {0}")]
    UnknownAccountKind(String),

    /// Content type string is not `trip` or `goto`.
    #[error("unknown content type: {0}")]
    UnknownContentType(String),

    /// Content status string is not `draft` or `launch`.
    #[error("unknown content status: {0}")]
    UnknownContentStatus(String),

    /// Purchase status string is not a known lifecycle state.
    #[error("unknown purchase status: {0}")]
    UnknownPurchaseStatus(String),

    /// Refund status string is not a known state.
    #[error("unknown refund status: {0}")]
    UnknownRefundStatus(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_value() {
        assert_eq!(
            ValidationError::UnknownContentType("bundle".into()).to_string(),
            "unknown content type: bundle"
        );
        assert_eq!(
            ValidationError::UnknownAccountKind("root".into()).to_string(),
            "unknown account kind: root"
        );
    }
}
