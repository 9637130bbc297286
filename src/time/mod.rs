//! Timestamp extraction
//!
//! Derives the effective timestamp and canonical filename for one file.
//! Priority order:
//! 1. Embedded `yyyyMMdd<sep>HHmmss` stamp in the filename
//! 2. Bare `yyyyMMdd` date token (midnight of that date)
//! 3. Filesystem creation time
//!
//! The configured hour offset is applied after the base timestamp is
//! chosen, and the canonical name is rebuilt from the shifted value, so a
//! name that already carries a stamp reflects the offset rather than
//! keeping the stale prefix.

pub mod filename;

use chrono::{Duration, NaiveDateTime};
use tracing::debug;

/// Where the base timestamp came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSource {
    /// Embedded date+time stamp in the filename
    EmbeddedStamp,
    /// Bare date token in the filename
    EmbeddedDate,
    /// Filesystem creation time
    Creation,
}

/// Result of timestamp extraction for one file
#[derive(Debug, Clone)]
pub struct Extracted {
    /// Base timestamp shifted by the configured hour offset
    pub timestamp: NaiveDateTime,
    /// Timestamp-prefixed filename
    pub canonical_name: String,
    /// Source of the base timestamp
    pub source: TimeSource,
}

/// Derive the effective timestamp and canonical name for one file.
///
/// `file_name` is the base name including extension; `created` is the
/// filesystem creation time. A failed parse is never an error, it just
/// falls through to the next source.
pub fn extract(
    file_name: &str,
    created: NaiveDateTime,
    hour_offset: i64,
    file_suffix: Option<&str>,
) -> Extracted {
    let (base, rest, source) = match filename::parse_embedded_stamp(file_name) {
        Some(parsed) => (parsed.timestamp, parsed.remainder, TimeSource::EmbeddedStamp),
        None => match filename::parse_embedded_date(file_name) {
            Some(parsed) => (parsed.timestamp, parsed.remainder, TimeSource::EmbeddedDate),
            None => (created, file_name.to_string(), TimeSource::Creation),
        },
    };

    let timestamp = base + Duration::hours(hour_offset);
    let canonical_name = build_canonical_name(timestamp, &rest, file_suffix);

    debug!(file_name, ?source, %timestamp, canonical_name, "Extracted timestamp");

    Extracted {
        timestamp,
        canonical_name,
        source,
    }
}

/// Build `yyyyMMdd_HHmmss<sep><rest>`, with the optional suffix inserted
/// before the extension.
fn build_canonical_name(timestamp: NaiveDateTime, rest: &str, file_suffix: Option<&str>) -> String {
    let prefix = timestamp.format("%Y%m%d_%H%M%S").to_string();

    // No extra separator when the remainder already starts with one, or
    // when only the extension is left of the original name.
    let sep = if rest.starts_with('_') || rest.starts_with('.') {
        ""
    } else {
        "_"
    };

    let name = format!("{}{}{}", prefix, sep, rest);

    match file_suffix {
        Some(suffix) if !suffix.is_empty() => match name.rfind('.') {
            Some(dot) => format!("{}{}{}", &name[..dot], suffix, &name[dot..]),
            None => format!("{}{}", name, suffix),
        },
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dt(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_embedded_stamp_overrides_creation_time() {
        let extracted = extract("20240305_143000_IMG_0002.jpg", dt(2020, 1, 1, 0, 0, 0), 0, None);
        assert_eq!(extracted.timestamp, dt(2024, 3, 5, 14, 30, 0));
        assert_eq!(extracted.source, TimeSource::EmbeddedStamp);
        assert_eq!(extracted.canonical_name, "20240305_143000_IMG_0002.jpg");
    }

    #[test]
    fn test_embedded_stamp_with_offset() {
        let extracted = extract("20240305_143000_IMG_0002.jpg", dt(2020, 1, 1, 0, 0, 0), 2, None);
        assert_eq!(extracted.timestamp, dt(2024, 3, 5, 16, 30, 0));
        assert_eq!(extracted.canonical_name, "20240305_163000_IMG_0002.jpg");
    }

    #[test]
    fn test_negative_offset_crosses_midnight() {
        let extracted = extract("IMG_0001.jpg", dt(2024, 3, 5, 0, 30, 0), -2, None);
        assert_eq!(extracted.timestamp, dt(2024, 3, 4, 22, 30, 0));
        assert_eq!(extracted.canonical_name, "20240304_223000_IMG_0001.jpg");
    }

    #[test]
    fn test_bare_date_uses_midnight() {
        let extracted = extract("20240305 Birthday.jpg", dt(2020, 1, 1, 12, 0, 0), 0, None);
        assert_eq!(extracted.timestamp, dt(2024, 3, 5, 0, 0, 0));
        assert_eq!(extracted.source, TimeSource::EmbeddedDate);
        assert_eq!(extracted.canonical_name, "20240305_000000 Birthday.jpg");
    }

    #[test]
    fn test_creation_time_fallback() {
        let extracted = extract("IMG_0001.jpg", dt(2024, 3, 5, 14, 30, 0), 0, None);
        assert_eq!(extracted.timestamp, dt(2024, 3, 5, 14, 30, 0));
        assert_eq!(extracted.source, TimeSource::Creation);
        assert_eq!(extracted.canonical_name, "20240305_143000_IMG_0001.jpg");
    }

    #[test]
    fn test_invalid_embedded_date_falls_back() {
        let extracted = extract("20241301_143000.jpg", dt(2024, 3, 5, 14, 30, 0), 0, None);
        assert_eq!(extracted.source, TimeSource::Creation);
    }

    #[test]
    fn test_already_canonical_name_is_not_duplicated() {
        let extracted = extract("20240305_143000.jpg", dt(2020, 1, 1, 0, 0, 0), 0, None);
        assert_eq!(extracted.canonical_name, "20240305_143000.jpg");
    }

    #[test]
    fn test_suffix_before_extension() {
        let extracted = extract("IMG_0001.jpg", dt(2024, 3, 5, 14, 30, 0), 0, Some("-trip"));
        assert_eq!(extracted.canonical_name, "20240305_143000_IMG_0001-trip.jpg");
    }
}
