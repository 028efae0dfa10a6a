//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent invariants.

use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| EngineError::Validation(format!("invalid {label} id: {value}")))
}

pub(crate) fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn normalize_text(value: &str) -> String {
    value.trim().to_string()
}

pub(crate) fn normalize_email(value: &str) -> ResultEngine<String> {
    let email = value.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(EngineError::Validation(format!("invalid email: {value}"))),
    }
}

pub(crate) fn require_positive(value: i64, label: &str) -> ResultEngine<i64> {
    if value <= 0 {
        return Err(EngineError::Validation(format!("{label} must be > 0")));
    }
    Ok(value)
}

pub(crate) fn require_non_negative(value: i64, label: &str) -> ResultEngine<i64> {
    if value < 0 {
        return Err(EngineError::Validation(format!("{label} must be >= 0")));
    }
    Ok(value)
}

/// Trim the key and drop it when blank.
pub(crate) fn normalize_idempotency_key(key: Option<&str>) -> Option<String> {
    key.map(str::trim)
        .filter(|k| !k.is_empty())
        .map(ToString::to_string)
}
