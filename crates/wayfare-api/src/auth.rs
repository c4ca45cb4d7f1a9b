//! # Session Authentication and Authorization Policy
//!
//! Session tokens are HS256 JWTs carrying the account id, the account
//! kind, and a mid-onboarding flag. Routes obtain the caller through the
//! [`SessionIdentity`] extractor (401 when the token is missing or
//! invalid) or [`MaybeSession`] for public routes whose response varies
//! by ownership.
//!
//! Authorization is an explicit policy function, [`authorize`], invoked at
//! each protected boundary. It returns an allow/deny decision with a
//! reason code and knows nothing about redirects or status codes; the
//! [`PolicyDenial`] → [`AppError`] conversion happens at the HTTP edge.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use wayfare_core::{AccountId, AccountKind};

use crate::error::AppError;
use crate::state::AppState;

/// A secret value that redacts itself in debug output.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(value: &str) -> Self {
        Self(value.to_string())
    }

    /// Access the underlying secret.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretString(***)")
    }
}

/// JWT claims for a session token.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Account id.
    sub: String,
    /// Account kind ("creator" | "user").
    kind: String,
    /// Needs-type-selection: the account has authenticated but has not yet
    /// chosen a kind (mid-onboarding).
    #[serde(default)]
    nts: bool,
    /// Expiry, seconds since epoch.
    exp: usize,
    /// Issued-at, seconds since epoch.
    iat: usize,
}

/// The authenticated caller, as read from a session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionIdentity {
    pub account_id: AccountId,
    pub kind: AccountKind,
    /// True while the account is mid-onboarding and has not finished
    /// selecting its kind; protected boundaries deny such sessions.
    pub needs_type_selection: bool,
}

/// Errors from token issuance or decoding.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token encoding failed: {0}")]
    Encoding(#[from] jsonwebtoken::errors::Error),
    #[error("token claims are malformed: {0}")]
    MalformedClaims(String),
}

/// Issue a session token for an account.
pub fn issue_session_token(
    identity: SessionIdentity,
    secret: &SecretString,
    ttl_hours: i64,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = Claims {
        sub: identity.account_id.to_string(),
        kind: identity.kind.as_str().to_string(),
        nts: identity.needs_type_selection,
        exp: (now + Duration::hours(ttl_hours)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };
    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.expose().as_bytes()),
    )?)
}

/// Decode and validate a session token.
pub fn decode_session_token(
    token: &str,
    secret: &SecretString,
) -> Result<SessionIdentity, AuthError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.expose().as_bytes()),
        &Validation::default(),
    )?;
    let account_id = data
        .claims
        .sub
        .parse::<AccountId>()
        .map_err(|e| AuthError::MalformedClaims(format!("sub is not a uuid: {e}")))?;
    let kind = AccountKind::parse(&data.claims.kind)
        .map_err(|e| AuthError::MalformedClaims(e.to_string()))?;
    Ok(SessionIdentity {
        account_id,
        kind,
        needs_type_selection: data.claims.nts,
    })
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

#[axum::async_trait]
impl FromRequestParts<AppState> for SessionIdentity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(|| {
            AppError::Unauthorized("missing Authorization bearer token".to_string())
        })?;
        decode_session_token(token, &state.config.jwt_secret)
            .map_err(|_| AppError::Unauthorized("invalid or expired session token".to_string()))
    }
}

/// Optional session for public routes whose response varies by caller
/// (e.g. a draft Trip is 404 to strangers but visible to its owner).
///
/// An invalid token is treated the same as no token — public routes never
/// 401.
#[derive(Debug, Clone, Copy)]
pub struct MaybeSession(pub Option<SessionIdentity>);

#[axum::async_trait]
impl FromRequestParts<AppState> for MaybeSession {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let identity = bearer_token(parts)
            .and_then(|token| decode_session_token(token, &state.config.jwt_secret).ok());
        Ok(MaybeSession(identity))
    }
}

/// What a protected boundary requires of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Any fully-onboarded account.
    AnyAccount,
    /// A creator account.
    Creator,
    /// A user (buyer) account.
    User,
}

/// Why a policy check denied the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyDenial {
    /// No session present.
    Unauthenticated,
    /// Session exists but the account has not finished selecting a kind.
    MidOnboarding,
    /// Session exists but the account kind does not satisfy the boundary.
    WrongAccountKind { required: Requirement },
}

impl From<PolicyDenial> for AppError {
    fn from(denial: PolicyDenial) -> Self {
        match denial {
            PolicyDenial::Unauthenticated => {
                Self::Unauthorized("authentication required".to_string())
            }
            PolicyDenial::MidOnboarding => {
                Self::Unauthorized("account type selection is not complete".to_string())
            }
            PolicyDenial::WrongAccountKind { required } => {
                let kind = match required {
                    Requirement::Creator => "a creator account",
                    Requirement::User => "a user account",
                    Requirement::AnyAccount => "an account",
                };
                Self::Forbidden(format!("this operation requires {kind}"))
            }
        }
    }
}

/// The authorization policy: decide whether `identity` satisfies
/// `requirement`.
///
/// Pure allow/deny with a reason code; callers convert the denial to an
/// HTTP response (or, in a browser-facing deployment, a redirect).
pub fn authorize(
    identity: Option<SessionIdentity>,
    requirement: Requirement,
) -> Result<SessionIdentity, PolicyDenial> {
    let identity = identity.ok_or(PolicyDenial::Unauthenticated)?;
    if identity.needs_type_selection {
        return Err(PolicyDenial::MidOnboarding);
    }
    match (requirement, identity.kind) {
        (Requirement::AnyAccount, _) => Ok(identity),
        (Requirement::Creator, AccountKind::Creator) => Ok(identity),
        (Requirement::User, AccountKind::User) => Ok(identity),
        _ => Err(PolicyDenial::WrongAccountKind {
            required: requirement,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creator_session() -> SessionIdentity {
        SessionIdentity {
            account_id: AccountId::new(),
            kind: AccountKind::Creator,
            needs_type_selection: false,
        }
    }

    #[test]
    fn token_roundtrips_identity() {
        let secret = SecretString::new("unit-test-secret");
        let identity = creator_session();
        let token = issue_session_token(identity, &secret, 1).unwrap();
        let decoded = decode_session_token(&token, &secret).unwrap();
        assert_eq!(decoded, identity);
    }

    #[test]
    fn wrong_secret_rejects_token() {
        let identity = creator_session();
        let token = issue_session_token(identity, &SecretString::new("a"), 1).unwrap();
        assert!(decode_session_token(&token, &SecretString::new("b")).is_err());
    }

    #[test]
    fn expired_token_rejects() {
        let secret = SecretString::new("unit-test-secret");
        let token = issue_session_token(creator_session(), &secret, -1).unwrap();
        assert!(decode_session_token(&token, &secret).is_err());
    }

    #[test]
    fn secret_string_redacts_debug() {
        let secret = SecretString::new("hunter2");
        assert!(!format!("{secret:?}").contains("hunter2"));
    }

    #[test]
    fn authorize_denies_unauthenticated() {
        assert_eq!(
            authorize(None, Requirement::AnyAccount).unwrap_err(),
            PolicyDenial::Unauthenticated
        );
    }

    #[test]
    fn authorize_denies_mid_onboarding() {
        let identity = SessionIdentity {
            needs_type_selection: true,
            ..creator_session()
        };
        assert_eq!(
            authorize(Some(identity), Requirement::Creator).unwrap_err(),
            PolicyDenial::MidOnboarding
        );
    }

    #[test]
    fn authorize_checks_kind() {
        let identity = creator_session();
        assert!(authorize(Some(identity), Requirement::Creator).is_ok());
        assert!(authorize(Some(identity), Requirement::AnyAccount).is_ok());
        assert_eq!(
            authorize(Some(identity), Requirement::User).unwrap_err(),
            PolicyDenial::WrongAccountKind {
                required: Requirement::User
            }
        );
    }

    #[test]
    fn denial_maps_to_http_taxonomy() {
        // Unauthenticated and mid-onboarding are 401; wrong kind is 403.
        assert!(matches!(
            AppError::from(PolicyDenial::Unauthenticated),
            AppError::Unauthorized(_)
        ));
        assert!(matches!(
            AppError::from(PolicyDenial::MidOnboarding),
            AppError::Unauthorized(_)
        ));
        assert!(matches!(
            AppError::from(PolicyDenial::WrongAccountKind {
                required: Requirement::Creator
            }),
            AppError::Forbidden(_)
        ));
    }
}
