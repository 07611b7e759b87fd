//! Query time windows.

use core::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ParseError;

/// A duration expressed as days/hours/minutes/seconds.
///
/// Used both as a measurement query window width and as the wire-format
/// string the backend expects: `DDd,HH:MM:SS`, every field zero-padded to
/// two digits (the day field grows beyond two digits when needed).
///
/// ```
/// use aquadash_types::TimeDelta;
///
/// let week = TimeDelta::new(7, 0, 0, 0);
/// assert_eq!(week.to_string(), "07d,00:00:00");
/// assert_eq!("07d,00:00:00".parse::<TimeDelta>().unwrap(), week);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeDelta {
    /// Whole days.
    pub days: u32,
    /// Hours component.
    pub hours: u32,
    /// Minutes component.
    pub minutes: u32,
    /// Seconds component.
    pub seconds: u32,
}

impl TimeDelta {
    /// The last hour.
    pub const LAST_HOUR: TimeDelta = TimeDelta::new(0, 1, 0, 0);
    /// The last 24 hours.
    pub const LAST_DAY: TimeDelta = TimeDelta::new(1, 0, 0, 0);
    /// The last week.
    pub const LAST_WEEK: TimeDelta = TimeDelta::new(7, 0, 0, 0);
    /// The last year.
    pub const LAST_YEAR: TimeDelta = TimeDelta::new(365, 0, 0, 0);

    /// Selectable chart ranges with their display labels.
    pub const PRESETS: [(&'static str, TimeDelta); 4] = [
        ("Dernière heure", TimeDelta::LAST_HOUR),
        ("Dernières 24h", TimeDelta::LAST_DAY),
        ("Dernière semaine", TimeDelta::LAST_WEEK),
        ("Dernière année", TimeDelta::LAST_YEAR),
    ];

    /// Create a new time delta.
    pub const fn new(days: u32, hours: u32, minutes: u32, seconds: u32) -> Self {
        Self {
            days,
            hours,
            minutes,
            seconds,
        }
    }

    /// Total length of the window.
    pub fn to_duration(&self) -> Duration {
        let secs = u64::from(self.days) * 86_400
            + u64::from(self.hours) * 3_600
            + u64::from(self.minutes) * 60
            + u64::from(self.seconds);
        Duration::from_secs(secs)
    }

    /// Whether the window has zero width.
    pub fn is_zero(&self) -> bool {
        self.days == 0 && self.hours == 0 && self.minutes == 0 && self.seconds == 0
    }
}

impl fmt::Display for TimeDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}d,{:02}:{:02}:{:02}",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

impl FromStr for TimeDelta {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseError::InvalidTimeDelta(s.to_string());

        let (days_part, clock_part) = s.split_once("d,").ok_or_else(invalid)?;
        let days = days_part.parse::<u32>().map_err(|_| invalid())?;

        let mut clock = clock_part.splitn(3, ':');
        let mut field = || {
            clock
                .next()
                .and_then(|v| v.parse::<u32>().ok())
                .ok_or_else(invalid)
        };
        let hours = field()?;
        let minutes = field()?;
        let seconds = field()?;

        Ok(TimeDelta::new(days, hours, minutes, seconds))
    }
}

impl Serialize for TimeDelta {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeDelta {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_wire_string() {
        assert_eq!(TimeDelta::new(0, 1, 0, 0).to_string(), "00d,01:00:00");
        assert_eq!(TimeDelta::new(1, 2, 3, 4).to_string(), "01d,02:03:04");
        // Day field grows past two digits without truncation.
        assert_eq!(TimeDelta::LAST_YEAR.to_string(), "365d,00:00:00");
    }

    #[test]
    fn parses_wire_string() {
        assert_eq!(
            "00d,01:00:00".parse::<TimeDelta>().unwrap(),
            TimeDelta::LAST_HOUR
        );
        assert_eq!(
            "365d,00:00:00".parse::<TimeDelta>().unwrap(),
            TimeDelta::LAST_YEAR
        );
    }

    #[test]
    fn rejects_malformed_strings() {
        for bad in ["", "1d", "01d,02:03", "xxd,00:00:00", "01d,aa:00:00"] {
            assert!(bad.parse::<TimeDelta>().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn display_parse_round_trip() {
        for (_, preset) in TimeDelta::PRESETS {
            assert_eq!(preset.to_string().parse::<TimeDelta>().unwrap(), preset);
        }
    }

    #[test]
    fn duration_conversion() {
        assert_eq!(TimeDelta::LAST_HOUR.to_duration(), Duration::from_secs(3600));
        assert_eq!(
            TimeDelta::new(1, 1, 1, 1).to_duration(),
            Duration::from_secs(90_061)
        );
        assert!(TimeDelta::new(0, 0, 0, 0).is_zero());
    }

    #[test]
    fn serde_round_trip_as_string() {
        let json = serde_json::to_string(&TimeDelta::LAST_WEEK).unwrap();
        assert_eq!(json, "\"07d,00:00:00\"");
        let back: TimeDelta = serde_json::from_str(&json).unwrap();
        assert_eq!(back, TimeDelta::LAST_WEEK);
    }
}
