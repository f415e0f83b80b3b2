//! Timestamp utilities
//!
//! The warehouse and the document store surface dates differently: ISO-8601
//! text, native date values, or a `{ "value": "<ISO>" }` wrapper. All of them
//! are carried as [`RawTimestamp`] so responses can echo the original shape,
//! and converted to a comparable instant in exactly one place,
//! [`parse_flexible_timestamp`].

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Formats accepted for zone-less date-times (interpreted as UTC)
const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Upstream timestamp in the shape it was surfaced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    /// Native date value (integer epoch columns, typed driver values)
    #[serde(skip_deserializing)]
    Native(DateTime<Utc>),

    /// `{ "value": "<ISO string>" }` wrapper
    Wrapped { value: String },

    /// ISO-8601 text
    Text(String),

    /// Anything else (null, numbers, unexpected objects)
    Other(Value),
}

impl RawTimestamp {
    /// Native timestamp from epoch milliseconds; out-of-range values are kept as-is
    pub fn from_epoch_millis(millis: i64) -> Self {
        match Utc.timestamp_millis_opt(millis).single() {
            Some(dt) => RawTimestamp::Native(dt),
            None => RawTimestamp::Other(Value::from(millis)),
        }
    }

    /// Classify a text column: JSON `{value}` wrappers are unwrapped, everything
    /// else is ISO text
    pub fn from_text(text: String) -> Self {
        if text.trim_start().starts_with('{') {
            if let Ok(wrapped @ RawTimestamp::Wrapped { .. }) =
                serde_json::from_str::<RawTimestamp>(&text)
            {
                return wrapped;
            }
        }
        RawTimestamp::Text(text)
    }
}

impl From<DateTime<Utc>> for RawTimestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        RawTimestamp::Native(dt)
    }
}

/// Convert any upstream timestamp shape to a comparable UTC instant
///
/// Returns `None` when the value cannot be interpreted.
///
/// # Examples
/// ```
/// use linka_common::time::{parse_flexible_timestamp, RawTimestamp};
///
/// let iso = RawTimestamp::Text("2025-09-02T12:00:00.000Z".to_string());
/// let wrapped = RawTimestamp::Wrapped { value: "2025-09-02T12:00:00Z".to_string() };
/// assert_eq!(parse_flexible_timestamp(&iso), parse_flexible_timestamp(&wrapped));
///
/// let garbage = RawTimestamp::Text("not a date".to_string());
/// assert!(parse_flexible_timestamp(&garbage).is_none());
/// ```
pub fn parse_flexible_timestamp(raw: &RawTimestamp) -> Option<DateTime<Utc>> {
    match raw {
        RawTimestamp::Native(dt) => Some(*dt),
        RawTimestamp::Wrapped { value } => parse_timestamp_str(value),
        RawTimestamp::Text(text) => parse_timestamp_str(text),
        RawTimestamp::Other(value) => parse_timestamp_value(value),
    }
}

/// Parse an ISO-8601 date or date-time string
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS[.fff][ UTC]` (warehouse style),
/// zone-less `YYYY-MM-DDTHH:MM:SS[.fff]`, and bare `YYYY-MM-DD` (midnight
/// UTC). Zone-less values are taken as UTC.
pub fn parse_timestamp_str(input: &str) -> Option<DateTime<Utc>> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    let naive_part = s.strip_suffix(" UTC").unwrap_or(s);
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(naive_part, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn parse_timestamp_value(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_timestamp_str(s),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
        Value::Object(map) => map.get("value").and_then(parse_timestamp_value),
        _ => None,
    }
}
