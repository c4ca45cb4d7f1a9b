//! # Purchase Lifecycle
//!
//! A purchase is created `Pending` at checkout initiation and settles to
//! `Completed` or `Failed` when the payment provider confirms. `Refunded`
//! is a terminal alternate state reachable only from `Completed`.
//!
//! ```text
//! Pending ──► Completed ──► Refunded
//!    │
//!    └──────► Failed
//! ```
//!
//! Statuses round-trip through the database, so legality is checked at
//! runtime via [`PurchaseStatus::transition_to`] rather than encoded in
//! the type system; an illegal transition is a [`PurchaseStateError`],
//! which the API layer surfaces as a conflict.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ValidationError;
use crate::identity::PurchaseId;

/// Settlement status of a purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseStatus {
    /// Checkout initiated, payment not yet confirmed.
    Pending,
    /// Payment confirmed; the buyer holds access.
    Completed,
    /// Payment failed or was abandoned. Terminal.
    Failed,
    /// Payment reversed after completion. Terminal.
    Refunded,
}

/// Errors raised by illegal purchase status transitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PurchaseStateError {
    /// The requested transition is not an edge of the lifecycle graph.
    #[error("purchase {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: PurchaseId,
        from: PurchaseStatus,
        to: PurchaseStatus,
    },
}

impl PurchaseStatus {
    /// The database/wire representation of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }

    /// Parse a status from its database/wire representation.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "refunded" => Ok(Self::Refunded),
            other => Err(ValidationError::UnknownPurchaseStatus(other.to_string())),
        }
    }

    /// Whether this status grants content access.
    pub fn grants_access(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Whether `to` is a legal next status from `self`.
    pub fn can_transition_to(&self, to: PurchaseStatus) -> bool {
        matches!(
            (self, to),
            (Self::Pending, Self::Completed)
                | (Self::Pending, Self::Failed)
                | (Self::Completed, Self::Refunded)
        )
    }

    /// Validate and perform a transition, returning the new status.
    pub fn transition_to(
        &self,
        id: PurchaseId,
        to: PurchaseStatus,
    ) -> Result<PurchaseStatus, PurchaseStateError> {
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(PurchaseStateError::InvalidTransition {
                id,
                from: *self,
                to,
            })
        }
    }
}

impl std::fmt::Display for PurchaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a refund request.
///
/// Processing a refund is what moves the underlying purchase to
/// [`PurchaseStatus::Refunded`]; the legality of that move is checked
/// through [`PurchaseStatus::transition_to`] at processing time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundStatus {
    Requested,
    Processed,
    Rejected,
}

impl RefundStatus {
    /// The database/wire representation of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Requested => "requested",
            Self::Processed => "processed",
            Self::Rejected => "rejected",
        }
    }

    /// Parse a status from its database/wire representation.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s {
            "requested" => Ok(Self::Requested),
            "processed" => Ok(Self::Processed),
            "rejected" => Ok(Self::Rejected),
            other => Err(ValidationError::UnknownRefundStatus(other.to_string())),
        }
    }
}

impl std::fmt::Display for RefundStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [PurchaseStatus; 4] = [
        PurchaseStatus::Pending,
        PurchaseStatus::Completed,
        PurchaseStatus::Failed,
        PurchaseStatus::Refunded,
    ];

    #[test]
    fn status_roundtrips_through_str() {
        for st in ALL {
            assert_eq!(PurchaseStatus::parse(st.as_str()).unwrap(), st);
        }
    }

    #[test]
    fn happy_path_is_legal() {
        let id = PurchaseId::new();
        let completed = PurchaseStatus::Pending
            .transition_to(id, PurchaseStatus::Completed)
            .unwrap();
        assert_eq!(completed, PurchaseStatus::Completed);
        let refunded = completed
            .transition_to(id, PurchaseStatus::Refunded)
            .unwrap();
        assert_eq!(refunded, PurchaseStatus::Refunded);
    }

    #[test]
    fn pending_can_fail() {
        assert!(PurchaseStatus::Pending.can_transition_to(PurchaseStatus::Failed));
    }

    #[test]
    fn refund_requires_completed() {
        // Refunded is reachable only from Completed.
        assert!(!PurchaseStatus::Pending.can_transition_to(PurchaseStatus::Refunded));
        assert!(!PurchaseStatus::Failed.can_transition_to(PurchaseStatus::Refunded));
    }

    #[test]
    fn terminal_states_have_no_outgoing_edges() {
        for terminal in [PurchaseStatus::Failed, PurchaseStatus::Refunded] {
            for to in ALL {
                assert!(!terminal.can_transition_to(to), "{terminal} -> {to}");
            }
        }
    }

    #[test]
    fn no_backwards_edges() {
        for st in ALL {
            assert!(!st.can_transition_to(PurchaseStatus::Pending));
        }
    }

    #[test]
    fn invalid_transition_error_names_both_states() {
        let id = PurchaseId::new();
        let err = PurchaseStatus::Completed
            .transition_to(id, PurchaseStatus::Pending)
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("completed"));
        assert!(msg.contains("pending"));
    }

    #[test]
    fn refund_status_roundtrips_through_str() {
        for st in [
            RefundStatus::Requested,
            RefundStatus::Processed,
            RefundStatus::Rejected,
        ] {
            assert_eq!(RefundStatus::parse(st.as_str()).unwrap(), st);
        }
        assert!(RefundStatus::parse("denied").is_err());
    }

    #[test]
    fn only_completed_grants_access() {
        for st in ALL {
            assert_eq!(st.grants_access(), st == PurchaseStatus::Completed);
        }
    }
}
