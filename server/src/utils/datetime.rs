//! Wire format for event timestamps: `yyyy-MM-dd'T'HH:mm:ss.SSS`.
//!
//! Timestamps carry no offset. They are stored as naive values and
//! interpreted as UTC everywhere, including the progressing/done split.

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serializer};

const RENDER_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";
const PARSE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

pub fn parse(value: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value.trim(), PARSE_FORMAT)
}

pub fn render(value: &NaiveDateTime) -> String {
    value.format(RENDER_FORMAT).to_string()
}

/// Current instant on the same naive UTC scale as stored timestamps.
pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&render(value))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).map_err(|e| {
        serde::de::Error::custom(format!(
            "invalid datetime '{}', expected yyyy-MM-ddTHH:mm:ss.SSS: {}",
            raw, e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_millisecond_timestamp() {
        let parsed = parse("2024-05-01T18:30:00.250").unwrap();
        assert_eq!(parsed.hour(), 18);
        assert_eq!(parsed.minute(), 30);
        assert_eq!(parsed.nanosecond(), 250_000_000);
    }

    #[test]
    fn test_parse_without_fraction() {
        assert!(parse("2024-05-01T18:30:00").is_ok());
    }

    #[test]
    fn test_rejects_other_layouts() {
        assert!(parse("2024/05/01 18:30").is_err());
        assert!(parse("2024-05-01").is_err());
        assert!(parse("").is_err());
    }

    #[test]
    fn test_render_always_has_three_fraction_digits() {
        let parsed = parse("2024-05-01T18:30:00").unwrap();
        assert_eq!(render(&parsed), "2024-05-01T18:30:00.000");
    }
}
