//! Canonical timestamp text form.

use chrono::{NaiveDate, NaiveDateTime};

use crate::{CoreError, CoreResult, Timestamp};

/// Format written to every stacked file.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const ACCEPTED_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

pub fn format_timestamp(ts: &Timestamp) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a timestamp written by this crate or by pandas.
///
/// Accepts `T` or a space between date and time, optional seconds, and a
/// bare date meaning midnight.
pub fn parse_timestamp(text: &str) -> CoreResult<Timestamp> {
    let trimmed = text.trim();
    for fmt in ACCEPTED_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(ts);
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| CoreError::InvalidTimestamp {
            text: text.to_string(),
        })
}

/// Serde adapter writing timestamps in the canonical form and reading any
/// layout [`parse_timestamp`] accepts. Use with `#[serde(with = "...")]`.
#[cfg(feature = "serde")]
pub mod serde_text {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{format_timestamp, parse_timestamp};
    use crate::Timestamp;

    pub fn serialize<S: Serializer>(ts: &Timestamp, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_timestamp(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Timestamp, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse_timestamp(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(h: u32, m: u32) -> Timestamp {
        NaiveDate::from_ymd_opt(2021, 1, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn accepts_common_layouts() {
        assert_eq!(parse_timestamp("2021-01-01T02:00:00").unwrap(), ts(2, 0));
        assert_eq!(parse_timestamp("2021-01-01 02:00:00").unwrap(), ts(2, 0));
        assert_eq!(parse_timestamp("2021-01-01T02:30").unwrap(), ts(2, 30));
        assert_eq!(parse_timestamp(" 2021-01-01 ").unwrap(), ts(0, 0));
    }

    #[test]
    fn rejects_garbage() {
        let err = parse_timestamp("yesterday").unwrap_err();
        assert!(err.to_string().contains("yesterday"));
    }

    #[test]
    fn format_is_iso_with_seconds() {
        assert_eq!(format_timestamp(&ts(2, 0)), "2021-01-01T02:00:00");
    }
}
