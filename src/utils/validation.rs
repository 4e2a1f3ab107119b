//! Input validation primitives.
//!
//! Small helpers that turn malformed CLI input into
//! `validation.invalid_argument` errors with the offending field named.

use crate::error::{Error, Result};

/// Require a string to be non-empty after trimming.
///
/// Returns the trimmed string on success.
pub fn require_non_empty<'a>(value: &'a str, field: &str, message: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(Error::validation_invalid_argument(field, message, None, None))
    } else {
        Ok(trimmed)
    }
}

/// Require a collection to be non-empty.
pub fn require_non_empty_vec<'a, T>(vec: &'a [T], field: &str, message: &str) -> Result<&'a [T]> {
    if vec.is_empty() {
        Err(Error::validation_invalid_argument(field, message, None, None))
    } else {
        Ok(vec)
    }
}

/// Split `key=value`. The key must be non-empty; the value may be empty.
pub fn split_key_value<'a>(raw: &'a str, field: &str) -> Result<(&'a str, &'a str)> {
    let invalid = |problem: &str| {
        Error::validation_invalid_argument(
            field,
            problem,
            Some(raw.to_string()),
            Some(vec![format!("Use --{} key=value", field)]),
        )
    };

    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| invalid("Expected key=value"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(invalid("Key before '=' must not be empty"));
    }

    Ok((key, value))
}

/// Split `key=v1,v2,...` into the key and its non-empty values.
pub fn split_key_values(raw: &str, field: &str) -> Result<(String, Vec<String>)> {
    let (key, values) = split_key_value(raw, field)?;
    let values: Vec<String> = values
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect();

    require_non_empty_vec(&values, field, "At least one value is required after '='")?;
    Ok((key.to_string(), values))
}
