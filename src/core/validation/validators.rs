//! Reusable field validators
//!
//! A validator receives the field name and the (already filtered) value and
//! returns the human-readable message to show next to the field on failure.
//! Form fields that were never submitted arrive as `Value::Null`.

use crate::core::format::to_minor_units;
use serde_json::Value;

/// Validator: string must be present and non-empty
pub fn non_empty(
    message: &'static str,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |_: &str, value: &Value| match value.as_str() {
        Some(s) if !s.is_empty() => Ok(()),
        _ => Err(message.to_string()),
    }
}

/// Validator: amount must be at least one minor unit
///
/// The value is converted the same way it will be stored, so amounts that
/// round to zero cents or do not fit the stored integer fail. Anything that
/// is not a finite number fails too, so a missing or non-numeric amount is
/// reported with the same message.
pub fn positive_minor_units(
    message: &'static str,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |_: &str, value: &Value| match value.as_f64().and_then(to_minor_units) {
        Some(cents) if cents >= 1 => Ok(()),
        _ => Err(message.to_string()),
    }
}

/// Validator: value must be exactly one of the allowed strings
pub fn one_of(
    allowed: &'static [&'static str],
    message: &'static str,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |_: &str, value: &Value| match value.as_str() {
        Some(s) if allowed.contains(&s) => Ok(()),
        _ => Err(message.to_string()),
    }
}
