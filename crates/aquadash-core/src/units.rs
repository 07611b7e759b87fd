//! Unit conversion table for sensor values.
//!
//! Each sensor type has a default (base) unit and an ordered set of units
//! the operator may display in. Only temperature (°C ↔ °F) and EC
//! (µS/cm ↔ mS/cm) define non-identity conversions; every other type is
//! single-unit and converts as identity.
//!
//! Converting with a unit that is not valid for the sensor type is a
//! validation failure: the table warns and returns the input unchanged
//! rather than producing a silently wrong number.

use tracing::warn;

use aquadash_types::{Sensor, SensorType};

/// Degrees Celsius.
pub const CELSIUS: &str = "°C";
/// Degrees Fahrenheit.
pub const FAHRENHEIT: &str = "°F";
/// Microsiemens per centimetre, the EC base unit.
pub const MICRO_SIEMENS: &str = "µS/cm";
/// Millisiemens per centimetre.
pub const MILLI_SIEMENS: &str = "mS/cm";

/// The units an operator can select for a sensor type, default first.
pub fn available_units(sensor_type: SensorType) -> &'static [&'static str] {
    match sensor_type {
        SensorType::Ec => &[MICRO_SIEMENS, MILLI_SIEMENS],
        SensorType::Ph => &["pH"],
        SensorType::Temperature => &[CELSIUS, FAHRENHEIT],
        SensorType::Humidity => &["%"],
        SensorType::WaterLevel => &["cm"],
        SensorType::BooleanWaterLevel => &[""],
        SensorType::Oxygen => &["mg/L"],
        // Sensor types added upstream render unitless until a unit is
        // assigned here.
        _ => &[""],
    }
}

/// The canonical base unit for a sensor type.
pub fn default_unit(sensor_type: SensorType) -> Option<&'static str> {
    available_units(sensor_type).first().copied()
}

/// Whether `unit` is a valid display unit for `sensor_type`.
pub fn is_valid_unit(sensor_type: SensorType, unit: &str) -> bool {
    available_units(sensor_type).contains(&unit)
}

/// Decimal places kept after conversion. EC keeps five because its values
/// become tiny after the ÷1000 conversion to mS/cm.
fn decimals_for(sensor_type: SensorType) -> u32 {
    match sensor_type {
        SensorType::Ec => 5,
        _ => 2,
    }
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Convert `value` between two units of the same sensor type.
///
/// Unknown units for the type leave the value unchanged after logging a
/// warning. The result is rounded to the type's decimal precision.
pub fn convert(sensor_type: SensorType, value: f64, from: &str, to: &str) -> f64 {
    if !is_valid_unit(sensor_type, from) || !is_valid_unit(sensor_type, to) {
        warn!(
            sensor_type = %sensor_type,
            from, to,
            "invalid unit conversion requested, returning value unchanged"
        );
        return value;
    }

    let converted = match (sensor_type, from, to) {
        (SensorType::Temperature, CELSIUS, FAHRENHEIT) => value * 1.8 + 32.0,
        (SensorType::Temperature, FAHRENHEIT, CELSIUS) => (value - 32.0) * 5.0 / 9.0,
        (SensorType::Ec, MICRO_SIEMENS, MILLI_SIEMENS) => value / 1000.0,
        (SensorType::Ec, MILLI_SIEMENS, MICRO_SIEMENS) => value * 1000.0,
        _ => value,
    };

    round_to(converted, decimals_for(sensor_type))
}

/// Convert a base-unit value to the sensor's currently selected display
/// unit. If the sensor carries an invalid unit for its type, the value
/// passes through unchanged (with a warning from [`convert`]).
pub fn convert_to_preferred(sensor: &Sensor, value: f64) -> f64 {
    match default_unit(sensor.sensor_type) {
        Some(base) => convert(sensor.sensor_type, value, base, &sensor.sensor_unit),
        None => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sensor(sensor_type: SensorType, unit: &str) -> Sensor {
        Sensor {
            sensor_id: 1,
            sensor_type,
            prototype_id: 0,
            sensor_unit: unit.to_string(),
            threshold_critically_low: 0.0,
            threshold_low: 0.0,
            threshold_high: 0.0,
            threshold_critically_high: 0.0,
        }
    }

    #[test]
    fn temperature_celsius_to_fahrenheit() {
        assert_eq!(
            convert(SensorType::Temperature, 20.0, CELSIUS, FAHRENHEIT),
            68.0
        );
        assert_eq!(
            convert(SensorType::Temperature, 0.0, CELSIUS, FAHRENHEIT),
            32.0
        );
    }

    #[test]
    fn temperature_round_trips_within_rounding() {
        let f = convert(SensorType::Temperature, 20.0, CELSIUS, FAHRENHEIT);
        let back = convert(SensorType::Temperature, f, FAHRENHEIT, CELSIUS);
        assert!((back - 20.0).abs() < 0.01);
    }

    #[test]
    fn ec_milli_to_micro_multiplies_by_thousand() {
        assert_eq!(
            convert(SensorType::Ec, 1.5, MILLI_SIEMENS, MICRO_SIEMENS),
            1500.0
        );
    }

    #[test]
    fn ec_micro_to_milli_keeps_five_decimals() {
        assert_eq!(
            convert(SensorType::Ec, 1234.5, MICRO_SIEMENS, MILLI_SIEMENS),
            1.2345
        );
        let back = convert(SensorType::Ec, 1.2345, MILLI_SIEMENS, MICRO_SIEMENS);
        assert_eq!(back, 1234.5);
    }

    #[test]
    fn identity_conversion_rounds_to_type_precision() {
        assert_eq!(convert(SensorType::Ph, 6.123, "pH", "pH"), 6.12);
    }

    #[test]
    fn invalid_unit_returns_value_unchanged() {
        assert_eq!(convert(SensorType::Ec, 42.0, "bogus", MILLI_SIEMENS), 42.0);
        assert_eq!(convert(SensorType::Temperature, 42.0, CELSIUS, "K"), 42.0);
    }

    #[test]
    fn defaults_are_first_available_unit() {
        for t in SensorType::ALL {
            assert_eq!(default_unit(t), available_units(t).first().copied());
        }
        assert_eq!(default_unit(SensorType::Temperature), Some(CELSIUS));
        assert_eq!(default_unit(SensorType::Ec), Some(MICRO_SIEMENS));
    }

    #[test]
    fn convert_to_preferred_uses_sensor_unit() {
        let s = sensor(SensorType::Temperature, FAHRENHEIT);
        assert_eq!(convert_to_preferred(&s, 20.0), 68.0);

        let identity = sensor(SensorType::Humidity, "%");
        assert_eq!(convert_to_preferred(&identity, 55.5), 55.5);
    }

    #[test]
    fn convert_to_preferred_with_invalid_unit_passes_through() {
        let s = sensor(SensorType::Ec, "bogus");
        assert_eq!(convert_to_preferred(&s, 1500.0), 1500.0);
    }
}
