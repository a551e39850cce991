//! HTTP cache validation module
//!
//! Provides `ETag` generation, HTTP-date handling and conditional request
//! evaluation (`If-None-Match`, `If-Modified-Since`, `If-Range`).

use chrono::{DateTime, TimeZone, Utc};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::{SystemTime, UNIX_EPOCH};

/// IMF-fixdate layout, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Generate `ETag` using fast hashing
///
/// # Returns
/// Quoted `ETag` string, e.g., `"abc123def"`
pub fn generate_etag(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    let v = hasher.finish();
    format!("\"{v:x}\"")
}

/// Check if client's `If-None-Match` header matches the server's `ETag`
///
/// Supports:
/// - Single `ETag`: `"abc123"`
/// - Multiple `ETags`: `"abc123", "def456"`
/// - Weak validators: `W/"abc123"`
/// - Wildcard: `*`
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|client_etag| {
        client_etag.split(',').any(|e| {
            let e = e.trim();
            e == "*" || e.strip_prefix("W/").unwrap_or(e) == etag
        })
    })
}

/// Truncate a modification time to whole seconds in UTC
pub fn last_modified(modified: SystemTime) -> DateTime<Utc> {
    let secs = modified
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX));
    Utc.timestamp_opt(secs, 0)
        .single()
        .unwrap_or_default()
}

/// Format a timestamp as an HTTP-date
pub fn format_http_date(time: &DateTime<Utc>) -> String {
    time.format(HTTP_DATE_FORMAT).to_string()
}

/// Parse an HTTP-date header value
///
/// Accepts IMF-fixdate (`GMT` suffix) and any RFC 2822 date with an
/// explicit offset. Returns `None` for anything else.
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(value, HTTP_DATE_FORMAT) {
        return Some(naive.and_utc());
    }
    DateTime::parse_from_rfc2822(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Decide whether a cached copy is still fresh
///
/// `If-None-Match` takes precedence; `If-Modified-Since` is only consulted
/// when no entity tag was sent. An unparseable date is ignored.
pub fn is_not_modified(
    if_none_match: Option<&str>,
    if_modified_since: Option<&str>,
    etag: &str,
    modified: &DateTime<Utc>,
) -> bool {
    if if_none_match.is_some() {
        return check_etag_match(if_none_match, etag);
    }
    if_modified_since
        .and_then(parse_http_date)
        .is_some_and(|since| *modified <= since)
}

/// Evaluate `If-Range`: the range applies only if the validator still matches
pub fn if_range_matches(if_range: Option<&str>, etag: &str, modified: &DateTime<Utc>) -> bool {
    let Some(value) = if_range.map(str::trim) else {
        return true;
    };
    if value.starts_with('"') {
        return value == etag;
    }
    parse_http_date(value).is_some_and(|date| date == *modified)
}
