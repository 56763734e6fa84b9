use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};

use crate::error::{Result, SyncError};

/// RFC 1123 after the weekday, without the zone, which is handled separately.
const RFC1123_LOCAL: &str = "%d %b %Y %H:%M:%S";

/// RFC 1123 after the weekday, with a numeric zone, e.g. `02 Jan 2006 15:04:05 -0700`.
const RFC1123_NUMERIC: &str = "%d %b %Y %H:%M:%S %z";

type Layout = fn(&str) -> Option<DateTime<Utc>>;

/// Accepted formats, tried in this order. The first one that parses wins.
const SUPPORTED_LAYOUTS: [(&str, Layout); 3] = [
    ("RFC 1123", parse_rfc1123),
    ("RFC 1123 numeric zone", parse_rfc1123_numeric),
    ("RFC 3339", parse_rfc3339),
];

/// Parse a feed timestamp into a UTC instant.
pub fn parse_published(raw: &str) -> Result<DateTime<Utc>> {
    let trimmed = raw.trim();
    SUPPORTED_LAYOUTS
        .iter()
        .find_map(|(_, layout)| layout(trimmed))
        .ok_or_else(|| SyncError::UnsupportedTimeFormat(raw.to_string()))
}

/// Drop the leading `"Mon, "`. Feeds often carry a weekday that does not
/// match the date, so its value is never checked.
fn strip_weekday(raw: &str) -> Option<&str> {
    let (weekday, rest) = raw.split_once(',')?;
    if weekday.len() != 3 || !weekday.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    Some(rest.trim_start())
}

fn parse_rfc1123(raw: &str) -> Option<DateTime<Utc>> {
    let (local, zone) = strip_weekday(raw)?.rsplit_once(' ')?;
    let offset = zone_offset(zone)?;
    let naive = NaiveDateTime::parse_from_str(local, RFC1123_LOCAL).ok()?;
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_rfc1123_numeric(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(strip_weekday(raw)?, RFC1123_NUMERIC)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_rfc3339(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Resolve a zone abbreviation. Unknown alphabetic names are read as UTC.
fn zone_offset(zone: &str) -> Option<FixedOffset> {
    if zone.is_empty() || !zone.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    let hours = match zone.to_ascii_uppercase().as_str() {
        "EDT" => -4,
        "EST" | "CDT" => -5,
        "CST" | "MDT" => -6,
        "MST" | "PDT" => -7,
        "PST" => -8,
        // UT, UTC, GMT, Z and anything we don't recognise
        _ => 0,
    };

    FixedOffset::east_opt(hours * 3600)
}
