//! Parsing numeric values out of query strings and loosely-typed JSON.
//!
//! The web forms and list pages send numbers as strings; these helpers accept
//! the same inputs a browser's `Number()` conversion accepts.

use serde_json::Value;

/// Parse a string the way JavaScript's `Number()` does.
///
/// Blank input is `0`; decimal, exponent and `0x`/`0o`/`0b` forms are
/// accepted. Returns `None` for anything non-numeric or non-finite.
pub(crate) fn js_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }

    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = trimmed.strip_prefix(prefix) {
            return u64::from_str_radix(digits, radix).ok().map(|n| n as f64);
        }
    }

    // Rust accepts "inf"/"nan" spellings that Number() rejects
    let lower = trimmed.to_ascii_lowercase();
    if lower.contains("inf") || lower.contains("nan") {
        return None;
    }

    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parse an optional query value into a finite number.
///
/// Missing and blank values are `None` rather than zero.
pub fn parse_number_param(value: Option<&str>) -> Option<f64> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        return None;
    }
    js_number(trimmed)
}

/// Parse an optional query value into an integer clamped to `[min, max]`.
///
/// Non-numeric input yields `fallback`; a missing or blank value counts as `0`
/// and is clamped like any other number.
pub fn parse_positive_int_param(value: Option<&str>, fallback: i64, min: i64, max: i64) -> i64 {
    let Some(parsed) = js_number(value.unwrap_or("")) else {
        return fallback;
    };
    let int_value = parsed.floor();
    if int_value < min as f64 {
        return min;
    }
    if int_value > max as f64 {
        return max;
    }
    int_value as i64
}

/// Coerce a JSON number or numeric string into a number.
pub fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|n| n.is_finite()),
        Value::String(s) => js_number(s),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_number_param_missing_and_blank() {
        assert_eq!(parse_number_param(None), None);
        assert_eq!(parse_number_param(Some("")), None);
        assert_eq!(parse_number_param(Some("   ")), None);
    }

    #[test]
    fn test_parse_number_param_values() {
        assert_eq!(parse_number_param(Some(" 25 ")), Some(25.0));
        assert_eq!(parse_number_param(Some("-1.5")), Some(-1.5));
        assert_eq!(parse_number_param(Some("1e2")), Some(100.0));
        assert_eq!(parse_number_param(Some("0x10")), Some(16.0));
    }

    #[test]
    fn test_parse_number_param_rejects_garbage() {
        assert_eq!(parse_number_param(Some("abc")), None);
        assert_eq!(parse_number_param(Some("12abc")), None);
        assert_eq!(parse_number_param(Some("Infinity")), None);
        assert_eq!(parse_number_param(Some("NaN")), None);
        assert_eq!(parse_number_param(Some("inf")), None);
    }

    #[test]
    fn test_parse_positive_int_param_clamps() {
        assert_eq!(parse_positive_int_param(Some("7.9"), 10, 1, 50), 7);
        assert_eq!(parse_positive_int_param(Some("500"), 10, 1, 50), 50);
        assert_eq!(parse_positive_int_param(Some("-3"), 10, 1, 50), 1);
    }

    #[test]
    fn test_parse_positive_int_param_fallback_and_blank() {
        assert_eq!(parse_positive_int_param(Some("many"), 10, 1, 50), 10);
        // blank is zero, then clamped to the minimum
        assert_eq!(parse_positive_int_param(None, 10, 1, 50), 1);
        assert_eq!(parse_positive_int_param(Some(""), 10, 0, 50), 0);
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number(&json!(3000)), Some(3000.0));
        assert_eq!(coerce_number(&json!("2500")), Some(2500.0));
        assert_eq!(coerce_number(&json!("x")), None);
        assert_eq!(coerce_number(&json!(null)), None);
        assert_eq!(coerce_number(&json!([1])), None);
    }
}
