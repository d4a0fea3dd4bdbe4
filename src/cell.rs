//! Canonical string form of spreadsheet cells.
//!
//! The spreadsheet tool silently turns cells such as `1024` into numbers, while
//! codes typed into the form are always text. All key comparisons go through
//! [`canonical`] on both sides so that `1024` (number) and `"1024"` (text)
//! compare equal.

use serde_json::Value;

/// Render a cell value as the string it would compare as.
///
/// - strings are returned unchanged (no trimming, no case folding)
/// - integers in plain decimal
/// - floats without a fractional part as integers (`1024.0` -> `"1024"`)
/// - booleans as `TRUE` / `FALSE`, the way the sheet displays them
/// - null as the empty string
pub fn canonical(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                // f64 Display drops a trailing ".0"
                n.as_f64().map(|f| f.to_string()).unwrap_or_default()
            }
        }
        Value::Bool(true) => "TRUE".to_string(),
        Value::Bool(false) => "FALSE".to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// True when the canonical form is empty or whitespace only.
pub fn is_blank(value: &Value) -> bool {
    canonical(value).trim().is_empty()
}
