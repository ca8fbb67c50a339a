// SPDX-License-Identifier: MIT

//! Shared helpers for date/time parsing and formatting.
//!
//! Template data is hand-written JSON, so expiry values show up as full
//! RFC3339 timestamps, naive datetimes, or bare dates. Naive values are
//! read as UTC before any comparison with a timezone-aware "now".

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse a timestamp string, treating missing timezone info as UTC.
///
/// Accepts RFC3339 ("2026-01-01T00:00:00Z"), naive datetimes
/// ("2026-01-01T00:00:00"), and bare dates ("2026-01-01").
pub fn parse_flexible_utc(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }
    None
}

/// Serde adapter for `Option<DateTime<Utc>>` fields that must accept the
/// formats of [`parse_flexible_utc`]. Serializes as RFC3339 with `Z`.
pub mod flexible_utc_option {
    use super::*;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_str(&format_utc_rfc3339(*dt)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(s) => parse_flexible_utc(&s)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {s}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_rfc3339() {
        let dt = parse_flexible_utc("2026-03-01T10:30:00Z").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2026, 3, 1, 10, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_with_offset_normalizes_to_utc() {
        let dt = parse_flexible_utc("2026-03-01T13:30:00+03:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2026, 3, 1, 10, 30, 0).unwrap());
    }

    #[test]
    fn test_naive_datetime_read_as_utc() {
        let dt = parse_flexible_utc("2026-03-01T10:30:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2026, 3, 1, 10, 30, 0).unwrap());
    }

    #[test]
    fn test_bare_date_read_as_utc_midnight() {
        let dt = parse_flexible_utc("2026-03-01").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(parse_flexible_utc("next tuesday").is_none());
    }
}
