//! # Validated JSON Extraction
//!
//! Route request bodies implement [`Validate`]; handlers accept
//! `Result<Json<T>, JsonRejection>` and pass it through
//! [`extract_validated_json`], which folds body-parse failures and
//! validation failures into one 400 path that names what was wrong.

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::error::AppError;

/// Request-body validation. Implementations report the first missing or
/// malformed field.
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

/// Unwrap a JSON extraction and run the body's validation.
///
/// A body that failed to parse and a body that parsed but failed
/// validation both produce [`AppError::Validation`] (400).
pub fn extract_validated_json<T: Validate>(
    body: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let Json(value) = body.map_err(|rejection| AppError::Validation(rejection.body_text()))?;
    value.validate().map_err(AppError::Validation)?;
    Ok(value)
}

/// Require a non-empty string field, reporting the field name when absent.
pub fn require_field(value: &str, field: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} is required"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Body {
        name: String,
    }

    impl Validate for Body {
        fn validate(&self) -> Result<(), String> {
            require_field(&self.name, "name")
        }
    }

    #[test]
    fn valid_body_passes() {
        let body = Ok(Json(Body {
            name: "ok".to_string(),
        }));
        assert!(extract_validated_json(body).is_ok());
    }

    #[test]
    fn invalid_body_reports_field() {
        let body = Ok(Json(Body {
            name: "   ".to_string(),
        }));
        match extract_validated_json(body) {
            Err(AppError::Validation(msg)) => assert_eq!(msg, "name is required"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn require_field_accepts_non_empty() {
        assert!(require_field("x", "name").is_ok());
        assert_eq!(
            require_field("", "title").unwrap_err(),
            "title is required"
        );
    }
}
