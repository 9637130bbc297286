//! Embedded date token parsing
//!
//! Filenames coming off a camera often carry a compact timestamp
//! (`20240305_143000_IMG_0002.jpg`) or a bare date (`20240305 trip.jpg`).
//! Both parsers return the parsed value together with the name with the
//! matched token removed, so the caller can rebuild a canonical name
//! without duplicating the stamp.

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::OnceLock;
use tracing::trace;

/// Pattern: 8-digit date, one non-digit separator, 4-6 digit time.
/// ASCII digits only; Unicode decimals are not date tokens.
static PATTERN_DATETIME: OnceLock<Regex> = OnceLock::new();

/// Pattern: bare 8-digit date
static PATTERN_DATE: OnceLock<Regex> = OnceLock::new();

fn datetime_pattern() -> &'static Regex {
    PATTERN_DATETIME.get_or_init(|| Regex::new(r"([0-9]{8})([^0-9])([0-9]{4,6})").unwrap())
}

fn date_pattern() -> &'static Regex {
    PATTERN_DATE.get_or_init(|| Regex::new(r"[0-9]{8}").unwrap())
}

/// A timestamp parsed out of a filename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedStamp {
    /// The parsed timestamp
    pub timestamp: NaiveDateTime,
    /// The filename with the matched token removed
    pub remainder: String,
}

/// Parse an embedded `yyyyMMdd<sep>HHmmss` stamp from a filename.
///
/// The time part may be 4 digits (`HHmm`), 5 (`HHmm` plus single-digit
/// seconds) or 6 (`HHmmss`). Candidates with an out-of-range date or time
/// are skipped rather than reported as errors, so `20241301_1430` falls
/// through to the bare-date rule.
pub fn parse_embedded_stamp(name: &str) -> Option<ParsedStamp> {
    for caps in datetime_pattern().captures_iter(name) {
        let date = parse_date(caps.get(1)?.as_str());
        let time = parse_time(caps.get(3)?.as_str());
        if let (Some(date), Some((hour, minute, second))) = (date, time)
            && let Some(timestamp) = date.and_hms_opt(hour, minute, second)
        {
            let full = caps.get(0)?;
            trace!(name, %timestamp, "Matched embedded date+time stamp");
            return Some(ParsedStamp {
                timestamp,
                remainder: strip_range(name, full.start(), full.end()),
            });
        }
    }
    None
}

/// Parse a bare `yyyyMMdd` token from a filename, yielding midnight of
/// that date. Invalid calendar dates are skipped.
pub fn parse_embedded_date(name: &str) -> Option<ParsedStamp> {
    for m in date_pattern().find_iter(name) {
        if let Some(date) = parse_date(m.as_str())
            && let Some(timestamp) = date.and_hms_opt(0, 0, 0)
        {
            trace!(name, %timestamp, "Matched embedded date token");
            return Some(ParsedStamp {
                timestamp,
                remainder: strip_range(name, m.start(), m.end()),
            });
        }
    }
    None
}

fn strip_range(name: &str, start: usize, end: usize) -> String {
    format!("{}{}", &name[..start], &name[end..])
}

fn parse_date(token: &str) -> Option<NaiveDate> {
    let year: i32 = token[0..4].parse().ok()?;
    let month: u32 = token[4..6].parse().ok()?;
    let day: u32 = token[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_time(token: &str) -> Option<(u32, u32, u32)> {
    let hour: u32 = token[0..2].parse().ok()?;
    let minute: u32 = token[2..4].parse().ok()?;
    let second: u32 = if token.len() > 4 {
        token[4..].parse().ok()?
    } else {
        0
    };
    if hour > 23 || minute > 59 || second > 59 {
        return None;
    }
    Some((hour, minute, second))
}
