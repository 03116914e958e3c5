//! Loose JSON field probing
//!
//! Upstream services do not share a stable schema: the same logical field
//! shows up under different names and sometimes as a string-encoded number.
//! These helpers take an ordered list of candidate keys and return the first
//! value that coerces, so callers never branch on the exact upstream shape.

use serde_json::Value;

/// First candidate key whose value is a string. Returns the borrowed str.
pub fn first_str<'a>(obj: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|k| obj.get(*k).and_then(Value::as_str))
}

/// First candidate key that coerces to `f64`. Accepts JSON numbers and
/// string-encoded numbers; anything else is treated as absent.
pub fn first_f64(obj: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|k| obj.get(*k).and_then(as_f64_loose))
}

/// First candidate key that coerces to an integer id. Accepts JSON integers
/// and string-encoded integers.
pub fn first_i64(obj: &Value, keys: &[&str]) -> Option<i64> {
    keys.iter().find_map(|k| obj.get(*k).and_then(as_i64_loose))
}

/// First candidate key whose value is an array.
pub fn first_array<'a>(obj: &'a Value, keys: &[&str]) -> Option<&'a Vec<Value>> {
    keys.iter().find_map(|k| obj.get(*k).and_then(Value::as_array))
}

fn as_f64_loose(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn as_i64_loose(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}
