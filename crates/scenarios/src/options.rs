//! Load options: virtual-user count and wall-clock duration

use crate::{Result, ScenarioError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How many VUs run a scenario and for how long
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadOptions {
    pub vus: u32,
    #[serde(with = "duration_str")]
    pub duration: Duration,
}

impl LoadOptions {
    pub fn new(vus: u32, duration: Duration) -> Self {
        Self { vus, duration }
    }

    pub fn validate(&self) -> Result<()> {
        if self.vus == 0 {
            return Err(ScenarioError::InvalidConfig(
                "vus must be at least 1".to_string(),
            ));
        }
        if self.duration.is_zero() {
            return Err(ScenarioError::InvalidConfig(
                "duration must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            vus: 1,
            duration: Duration::from_secs(10),
        }
    }
}

/// Parse a k6-style duration such as `30s`, `500ms`, `2m`, `1h` or `1m30s`.
///
/// A bare integer is read as seconds.
pub fn parse_duration(input: &str) -> Result<Duration> {
    let s = input.trim();
    let invalid = || ScenarioError::InvalidDuration(input.to_string());

    if s.is_empty() {
        return Err(invalid());
    }
    if s.bytes().all(|b| b.is_ascii_digit()) {
        return s.parse::<u64>().map(Duration::from_secs).map_err(|_| invalid());
    }

    let mut total = Duration::ZERO;
    let mut rest = s;
    while !rest.is_empty() {
        let digits = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
        if digits == 0 {
            return Err(invalid());
        }
        let value: u64 = rest[..digits].parse().map_err(|_| invalid())?;
        rest = &rest[digits..];

        let unit_len = rest.bytes().take_while(|b| b.is_ascii_alphabetic()).count();
        let part = match &rest[..unit_len] {
            "ms" => Duration::from_millis(value),
            "s" => Duration::from_secs(value),
            "m" => Duration::from_secs(value * 60),
            "h" => Duration::from_secs(value * 3600),
            _ => return Err(invalid()),
        };
        rest = &rest[unit_len..];
        total += part;
    }

    Ok(total)
}

/// Format a duration in the largest unit that represents it exactly
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis % 1000 != 0 {
        return format!("{}ms", millis);
    }
    let secs = duration.as_secs();
    if secs != 0 && secs % 3600 == 0 {
        format!("{}h", secs / 3600)
    } else if secs != 0 && secs % 60 == 0 {
        format!("{}m", secs / 60)
    } else {
        format!("{}s", secs)
    }
}

/// Serde adapter storing `Duration` as a k6-style string
pub mod duration_str {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_duration(*duration))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_duration(&raw).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_durations() {
        assert_eq!(parse_duration("10s").unwrap(), Duration::from_secs(10));
        assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_duration("1m30s").unwrap(), Duration::from_secs(90));
        assert_eq!(parse_duration(" 45 ").unwrap(), Duration::from_secs(45));
    }

    #[test]
    fn test_parse_invalid_durations() {
        for bad in ["", "s", "10x", "ten seconds", "-5s", "1.5s", "10s5"] {
            assert!(parse_duration(bad).is_err(), "'{}' should be rejected", bad);
        }
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(30)), "30s");
        assert_eq!(format_duration(Duration::from_secs(120)), "2m");
        assert_eq!(format_duration(Duration::from_secs(7200)), "2h");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1500ms");
        assert_eq!(format_duration(Duration::ZERO), "0s");
    }

    #[test]
    fn test_options_validation() {
        assert!(LoadOptions::new(50, Duration::from_secs(30)).validate().is_ok());
        assert!(LoadOptions::new(0, Duration::from_secs(30)).validate().is_err());
        assert!(LoadOptions::new(1, Duration::ZERO).validate().is_err());
    }

    #[test]
    fn test_options_json() {
        let options: LoadOptions =
            serde_json::from_str(r#"{"vus": 10, "duration": "10s"}"#).unwrap();
        assert_eq!(options, LoadOptions::new(10, Duration::from_secs(10)));
        assert!(serde_json::from_str::<LoadOptions>(r#"{"vus": 10, "duration": "soon"}"#).is_err());
    }
}
