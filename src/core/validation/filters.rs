//! Reusable field filters
//!
//! These filters transform raw form values before validation

use anyhow::Result;
use serde_json::{Value, json};

/// Filter: coerce a raw string into a number
///
/// Parsing is locale-agnostic (`.` decimal separator, no grouping) and
/// ignores surrounding whitespace. Empty, missing, non-numeric and non-finite
/// input all coerce to `0`, leaving the range validator as the single gate.
pub fn coerce_number() -> impl Fn(&str, Value) -> Result<Value> + Send + Sync + Clone {
    |_: &str, value: Value| {
        let number = match &value {
            Value::Number(n) => n.as_f64().unwrap_or(0.0),
            Value::String(s) => parse_decimal(s),
            _ => 0.0,
        };
        Ok(json!(number))
    }
}

fn parse_decimal(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() => n,
        _ => 0.0,
    }
}
