//! Validation - Shape and type predicates for candidate values.
//!
//! Predicates are pure and never log; the state container turns a failed
//! predicate into a [`MutationError`](crate::MutationError) and owns the
//! single diagnostic for it.

use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

pub fn is_array(value: &Value) -> bool {
    value.is_array()
}

pub fn is_object(value: &Value) -> bool {
    value.is_object()
}

pub fn is_boolean(value: &Value) -> bool {
    value.is_boolean()
}

pub fn is_string(value: &Value) -> bool {
    value.is_string()
}

pub fn is_not_null(value: &Value) -> bool {
    !value.is_null()
}

/// A finite JSON number, or a string holding one.
pub fn is_number(value: &Value) -> bool {
    parse_number(value).is_some()
}

/// A non-negative JSON integer.
pub fn is_id(value: &Value) -> bool {
    value.as_u64().is_some()
}

/// Typed counterpart of [`is_id`].
pub fn is_valid_id(id: i64) -> bool {
    id >= 0
}

/// A `YYYY-MM-DD` date or an RFC 3339 timestamp.
pub fn is_date(value: &Value) -> bool {
    value.as_str().and_then(parse_date).is_some()
}

/// Party payloads name a role and carry some data.
pub fn is_valid_party_data(target: &str, data: &Value) -> bool {
    !target.is_empty() && is_not_null(data)
}

/// Parse a numeric value, accepting numeric strings.
pub fn parse_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

/// Parse a date string. Timestamps are reduced to their calendar date for
/// checking; callers store the string they were given.
pub fn parse_date(raw: &str) -> Option<Date> {
    if let Ok(date) = Date::parse(raw, format_description!("[year]-[month]-[day]")) {
        return Some(date);
    }
    OffsetDateTime::parse(raw, &Rfc3339)
        .ok()
        .map(|timestamp| timestamp.date())
}

/// Convert a JSON array of ids into party ids.
pub fn parse_party_ids(value: &Value) -> Option<Vec<u64>> {
    value
        .as_array()?
        .iter()
        .map(Value::as_u64)
        .collect()
}
