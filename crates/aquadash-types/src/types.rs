//! Core sensor and measurement types.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::ParseError;

/// Kind of sensor attached to a prototype.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new sensor types
/// in future versions without breaking downstream code. Wire format uses
/// the snake_case identifiers (`ec`, `ph`, `boolean_water_level`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum SensorType {
    /// Electrical conductivity of the nutrient solution.
    Ec,
    /// Acidity of the nutrient solution.
    Ph,
    /// Air or water temperature.
    Temperature,
    /// Relative air humidity.
    Humidity,
    /// Water level in the reservoir (distance measurement).
    WaterLevel,
    /// Binary water level switch.
    BooleanWaterLevel,
    /// Dissolved oxygen.
    Oxygen,
}

impl SensorType {
    /// All known sensor types, in default display order.
    pub const ALL: [SensorType; 7] = [
        SensorType::Ec,
        SensorType::Ph,
        SensorType::Temperature,
        SensorType::Humidity,
        SensorType::WaterLevel,
        SensorType::BooleanWaterLevel,
        SensorType::Oxygen,
    ];

    /// The wire identifier for this sensor type.
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorType::Ec => "ec",
            SensorType::Ph => "ph",
            SensorType::Temperature => "temperature",
            SensorType::Humidity => "humidity",
            SensorType::WaterLevel => "water_level",
            SensorType::BooleanWaterLevel => "boolean_water_level",
            SensorType::Oxygen => "oxygen",
        }
    }

    /// Human-readable chart title for this sensor type.
    pub fn title(&self) -> &'static str {
        match self {
            SensorType::Ec => "EC",
            SensorType::Ph => "pH",
            SensorType::Temperature => "Température",
            SensorType::Humidity => "Humidité",
            SensorType::WaterLevel | SensorType::BooleanWaterLevel => "Niveau d'eau",
            SensorType::Oxygen => "Oxygène",
        }
    }
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SensorType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ec" => Ok(SensorType::Ec),
            "ph" => Ok(SensorType::Ph),
            "temperature" => Ok(SensorType::Temperature),
            "humidity" => Ok(SensorType::Humidity),
            "water_level" => Ok(SensorType::WaterLevel),
            "boolean_water_level" => Ok(SensorType::BooleanWaterLevel),
            "oxygen" => Ok(SensorType::Oxygen),
            other => Err(ParseError::UnknownSensorType(other.to_string())),
        }
    }
}

/// A sensor as returned by `GET /sensors/{prototype_id}`.
///
/// Threshold values are stored in the sensor's canonical base unit and are
/// ordered `critically_low <= low <= high <= critically_high`. Display-unit
/// thresholds are always derived from these, never written back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sensor {
    /// Unique sensor identifier.
    pub sensor_id: i64,
    /// Kind of sensor.
    pub sensor_type: SensorType,
    /// Owning device group.
    pub prototype_id: i64,
    /// Unit the sensor currently displays in.
    pub sensor_unit: String,
    /// Lower critical threshold, base unit.
    pub threshold_critically_low: f64,
    /// Lower warning threshold, base unit.
    pub threshold_low: f64,
    /// Upper warning threshold, base unit.
    pub threshold_high: f64,
    /// Upper critical threshold, base unit.
    pub threshold_critically_high: f64,
}

/// A single measurement for a sensor, in the sensor's base unit.
///
/// Measurements are immutable once received; queries return a finite,
/// time-ordered slice of them bounded by a [`crate::TimeDelta`] window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// When the value was captured.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// Measured value in the sensor's base unit.
    pub value: f64,
}

/// Visual style for rendering threshold bands on a chart.
///
/// Persisted as its numeric value (stringified), matching the stored
/// preference format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ThresholdDisplay {
    /// No threshold decoration.
    NoThreshold = 0,
    /// Color the series line itself by threshold zone.
    ColoredLine = 1,
    /// Paint background bands behind the series.
    ColoredBackground = 2,
    /// Both line zones and background bands.
    ColoredBackgroundWithLine = 3,
}

impl ThresholdDisplay {
    /// Numeric value used for persistence.
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    /// Whether background bands should be emitted in this mode.
    pub fn background_enabled(&self) -> bool {
        matches!(
            self,
            ThresholdDisplay::ColoredBackground | ThresholdDisplay::ColoredBackgroundWithLine
        )
    }

    /// Whether line zones should be emitted in this mode.
    pub fn zones_enabled(&self) -> bool {
        matches!(
            self,
            ThresholdDisplay::ColoredLine | ThresholdDisplay::ColoredBackgroundWithLine
        )
    }
}

impl Default for ThresholdDisplay {
    fn default() -> Self {
        ThresholdDisplay::ColoredBackgroundWithLine
    }
}

impl TryFrom<u8> for ThresholdDisplay {
    type Error = ParseError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ThresholdDisplay::NoThreshold),
            1 => Ok(ThresholdDisplay::ColoredLine),
            2 => Ok(ThresholdDisplay::ColoredBackground),
            3 => Ok(ThresholdDisplay::ColoredBackgroundWithLine),
            other => Err(ParseError::UnknownThresholdDisplay(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensor_type_round_trips_through_str() {
        for t in SensorType::ALL {
            assert_eq!(t.as_str().parse::<SensorType>(), Ok(t));
        }
        assert!(matches!(
            "bogus".parse::<SensorType>(),
            Err(ParseError::UnknownSensorType(_))
        ));
    }

    #[test]
    fn sensor_type_serde_uses_snake_case() {
        let json = serde_json::to_string(&SensorType::BooleanWaterLevel).unwrap();
        assert_eq!(json, "\"boolean_water_level\"");
        let back: SensorType = serde_json::from_str("\"water_level\"").unwrap();
        assert_eq!(back, SensorType::WaterLevel);
    }

    #[test]
    fn sensor_deserializes_from_api_json() {
        let json = r#"{
            "sensor_id": 3,
            "sensor_type": "temperature",
            "prototype_id": 0,
            "sensor_unit": "°C",
            "threshold_critically_low": 10.0,
            "threshold_low": 15.0,
            "threshold_high": 28.0,
            "threshold_critically_high": 35.0
        }"#;
        let sensor: Sensor = serde_json::from_str(json).unwrap();
        assert_eq!(sensor.sensor_type, SensorType::Temperature);
        assert_eq!(sensor.threshold_high, 28.0);
    }

    #[test]
    fn measurement_parses_iso_timestamp() {
        let json = r#"{"timestamp": "2026-08-25T10:30:00Z", "value": 6.2}"#;
        let m: Measurement = serde_json::from_str(json).unwrap();
        assert_eq!(m.value, 6.2);
        assert_eq!(m.timestamp.unix_timestamp(), 1_787_653_800);
    }

    #[test]
    fn threshold_display_round_trips_through_u8() {
        for mode in [
            ThresholdDisplay::NoThreshold,
            ThresholdDisplay::ColoredLine,
            ThresholdDisplay::ColoredBackground,
            ThresholdDisplay::ColoredBackgroundWithLine,
        ] {
            assert_eq!(ThresholdDisplay::try_from(mode.as_u8()), Ok(mode));
        }
        assert!(ThresholdDisplay::try_from(7).is_err());
    }

    #[test]
    fn threshold_display_mode_flags() {
        assert!(!ThresholdDisplay::NoThreshold.background_enabled());
        assert!(!ThresholdDisplay::NoThreshold.zones_enabled());
        assert!(ThresholdDisplay::ColoredLine.zones_enabled());
        assert!(ThresholdDisplay::ColoredBackground.background_enabled());
        assert!(ThresholdDisplay::ColoredBackgroundWithLine.background_enabled());
        assert!(ThresholdDisplay::ColoredBackgroundWithLine.zones_enabled());
    }
}
