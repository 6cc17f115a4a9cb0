//! Input validators for the public API.
//!
//! Every validator runs before storage is touched and fails with
//! `ValidationError` naming the offending field.

use crate::core::error::{OpenLearnError, Result};
use crate::core::time;

pub const MAX_SCORE: i64 = 100;

/// Trimmed, non-empty string.
pub fn validate_non_empty_string(value: &str, field_name: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(OpenLearnError::ValidationError(format!(
            "{} must be a non-empty string",
            field_name
        )));
    }
    Ok(trimmed.to_string())
}

/// Optional free-text field: absent or empty means "not provided", anything
/// else must be a non-empty string once trimmed.
pub fn validate_optional_string(value: Option<&str>, field_name: &str) -> Result<Option<String>> {
    match value {
        None | Some("") => Ok(None),
        Some(v) => validate_non_empty_string(v, field_name).map(Some),
    }
}

pub fn validate_positive_integer(value: i64, field_name: &str) -> Result<u64> {
    if value <= 0 {
        return Err(OpenLearnError::ValidationError(format!(
            "{} must be a positive integer",
            field_name
        )));
    }
    Ok(value as u64)
}

pub fn validate_timestamp(value: &str, field_name: &str) -> Result<String> {
    if !time::is_valid_timestamp(value) {
        return Err(OpenLearnError::ValidationError(format!(
            "{} must be a valid ISO timestamp",
            field_name
        )));
    }
    Ok(value.to_string())
}

/// Accepts exactly `true` or `false`.
pub fn validate_boolean(value: &str, field_name: &str) -> Result<bool> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(OpenLearnError::ValidationError(format!(
            "{} must be a boolean",
            field_name
        ))),
    }
}

pub fn validate_score(value: i64) -> Result<u8> {
    if !(0..=MAX_SCORE).contains(&value) {
        return Err(OpenLearnError::ValidationError(format!(
            "Score must be an integer between 0 and {}",
            MAX_SCORE
        )));
    }
    Ok(value as u8)
}
