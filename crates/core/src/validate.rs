//! Validation rules for inbound request structs.
//!
//! Request structs (`NewLot`, `LotPatch`, `NewDepartment`, ...) implement
//! [`Validate`]; services run the pass before any record is built, so an
//! entity is never constructed from unchecked input.

use crate::error::{DomainError, DomainResult};

/// Standalone validation pass.
pub trait Validate {
    fn validate(&self) -> DomainResult<()>;
}

/// Maximum length accepted for free-text columns.
pub const MAX_TEXT_LEN: usize = 255;

/// A required text field: non-blank and within [`MAX_TEXT_LEN`].
pub fn required_text(field: &str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    max_len(field, value)
}

/// An optional text field: when present it obeys the same rules as a required one.
pub fn optional_text(field: &str, value: Option<&str>) -> DomainResult<()> {
    match value {
        Some(v) => required_text(field, v),
        None => Ok(()),
    }
}

fn max_len(field: &str, value: &str) -> DomainResult<()> {
    if value.chars().count() > MAX_TEXT_LEN {
        return Err(DomainError::validation(format!(
            "{field} must be at most {MAX_TEXT_LEN} characters"
        )));
    }
    Ok(())
}

/// `value >= 0`.
pub fn non_negative(field: &str, value: i64) -> DomainResult<()> {
    if value < 0 {
        return Err(DomainError::validation(format!(
            "{field} must not be negative"
        )));
    }
    Ok(())
}

/// `value > 0`.
pub fn positive(field: &str, value: i64) -> DomainResult<()> {
    if value <= 0 {
        return Err(DomainError::validation(format!("{field} must be positive")));
    }
    Ok(())
}
