//! Threshold band calculator.
//!
//! Turns a sensor's four threshold values into the visual encodings a
//! chart needs: background bands painted behind the series, and line zones
//! that recolor segments of the series itself. Which encodings are emitted
//! is decided by the active [`ThresholdDisplay`] mode.
//!
//! All thresholds passed in must already be in the sensor's current
//! display unit; this module performs no conversion.

use aquadash_types::{Sensor, SensorType, ThresholdDisplay};

use crate::theme::{with_opacity, BandOpacity, Palette};
use crate::units;

/// Extent added below the lowest and above the highest threshold so the
/// outer bands have finite bounds.
pub const THRESHOLD_MARGIN: f64 = 100.0;

/// The four threshold boundaries of a sensor, in one unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdSet {
    /// Lower critical boundary.
    pub critically_low: f64,
    /// Lower warning boundary.
    pub low: f64,
    /// Upper warning boundary.
    pub high: f64,
    /// Upper critical boundary.
    pub critically_high: f64,
}

impl ThresholdSet {
    /// The canonical base-unit thresholds of a sensor.
    pub fn from_sensor(sensor: &Sensor) -> Self {
        Self {
            critically_low: sensor.threshold_critically_low,
            low: sensor.threshold_low,
            high: sensor.threshold_high,
            critically_high: sensor.threshold_critically_high,
        }
    }

    /// Convert every boundary between two units of the sensor type.
    pub fn convert(&self, sensor_type: SensorType, from: &str, to: &str) -> Self {
        Self {
            critically_low: units::convert(sensor_type, self.critically_low, from, to),
            low: units::convert(sensor_type, self.low, from, to),
            high: units::convert(sensor_type, self.high, from, to),
            critically_high: units::convert(sensor_type, self.critically_high, from, to),
        }
    }

    /// Force the boundaries into non-decreasing order by clamping each one
    /// up to the running maximum. Out-of-order thresholds can only come
    /// from bad data; clamping keeps band output well-formed instead of
    /// producing inverted bands.
    pub fn clamped(&self) -> Self {
        let critically_low = self.critically_low;
        let low = self.low.max(critically_low);
        let high = self.high.max(low);
        let critically_high = self.critically_high.max(high);
        Self {
            critically_low,
            low,
            high,
            critically_high,
        }
    }

    /// Whether the boundaries are already non-decreasing.
    pub fn is_ordered(&self) -> bool {
        self.critically_low <= self.low && self.low <= self.high && self.high <= self.critically_high
    }
}

/// One background band behind the series.
#[derive(Debug, Clone, PartialEq)]
pub struct Band {
    /// Lower bound, display unit.
    pub from: f64,
    /// Upper bound, display unit.
    pub to: f64,
    /// Fill color with alpha suffix.
    pub color: String,
    /// Operator-facing band label.
    pub label: &'static str,
}

/// One line zone: the series is drawn in `color` up to `up_to`, the last
/// zone (`up_to == None`) extends to infinity.
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    /// Upper value bound of the zone, display unit.
    pub up_to: Option<f64>,
    /// Line color within the zone.
    pub color: &'static str,
}

/// The five background bands for a threshold set.
///
/// Bands are contiguous and ordered bottom to top; the two outer bands use
/// the heavier critical opacity and extend [`THRESHOLD_MARGIN`] beyond the
/// critical boundaries.
pub fn background_bands(thresholds: &ThresholdSet, palette: &Palette) -> Vec<Band> {
    let t = thresholds.clamped();
    vec![
        Band {
            from: t.critically_low - THRESHOLD_MARGIN,
            to: t.critically_low,
            color: with_opacity(palette.danger, BandOpacity::Critical),
            label: "Critically low",
        },
        Band {
            from: t.critically_low,
            to: t.low,
            color: with_opacity(palette.warning, BandOpacity::Normal),
            label: "Low",
        },
        Band {
            from: t.low,
            to: t.high,
            color: with_opacity(palette.success, BandOpacity::Normal),
            label: "Normal",
        },
        Band {
            from: t.high,
            to: t.critically_high,
            color: with_opacity(palette.warning, BandOpacity::Normal),
            label: "High",
        },
        Band {
            from: t.critically_high,
            to: t.critically_high + THRESHOLD_MARGIN,
            color: with_opacity(palette.danger, BandOpacity::Critical),
            label: "Critically high",
        },
    ]
}

/// The line zones for a threshold set: danger below the critical-low
/// boundary, warning up to low, success through the normal range, warning
/// up to critical-high, danger above.
pub fn line_zones(thresholds: &ThresholdSet, palette: &Palette) -> Vec<Zone> {
    let t = thresholds.clamped();
    vec![
        Zone {
            up_to: Some(t.critically_low),
            color: palette.danger,
        },
        Zone {
            up_to: Some(t.low),
            color: palette.warning,
        },
        Zone {
            up_to: Some(t.high),
            color: palette.success,
        },
        Zone {
            up_to: Some(t.critically_high),
            color: palette.warning,
        },
        Zone {
            up_to: None,
            color: palette.danger,
        },
    ]
}

/// Bands for the given display mode; empty unless the mode paints
/// backgrounds.
pub fn bands_for_mode(
    thresholds: &ThresholdSet,
    palette: &Palette,
    mode: ThresholdDisplay,
) -> Vec<Band> {
    if mode.background_enabled() {
        background_bands(thresholds, palette)
    } else {
        Vec::new()
    }
}

/// Zones for the given display mode; empty unless the mode colors the line.
pub fn zones_for_mode(
    thresholds: &ThresholdSet,
    palette: &Palette,
    mode: ThresholdDisplay,
) -> Vec<Zone> {
    if mode.zones_enabled() {
        line_zones(thresholds, palette)
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::Theme;

    fn set(critically_low: f64, low: f64, high: f64, critically_high: f64) -> ThresholdSet {
        ThresholdSet {
            critically_low,
            low,
            high,
            critically_high,
        }
    }

    #[test]
    fn emits_five_contiguous_monotone_bands() {
        let bands = background_bands(&set(4.0, 5.0, 9.0, 10.0), Theme::Light.palette());
        assert_eq!(bands.len(), 5);
        for pair in bands.windows(2) {
            assert_eq!(pair[0].to, pair[1].from);
        }
        for band in &bands {
            assert!(band.from <= band.to);
        }
        assert_eq!(bands[0].from, 4.0 - THRESHOLD_MARGIN);
        assert_eq!(bands[4].to, 10.0 + THRESHOLD_MARGIN);
    }

    #[test]
    fn band_labels_and_opacities() {
        let bands = background_bands(&set(4.0, 5.0, 9.0, 10.0), Theme::Light.palette());
        let labels: Vec<_> = bands.iter().map(|b| b.label).collect();
        assert_eq!(
            labels,
            ["Critically low", "Low", "Normal", "High", "Critically high"]
        );
        // Outer bands carry the heavier alpha suffix.
        assert!(bands[0].color.ends_with("20"));
        assert!(bands[2].color.ends_with("10"));
        assert!(bands[4].color.ends_with("20"));
    }

    #[test]
    fn zones_follow_danger_warning_success_order() {
        let palette = Theme::Dark.palette();
        let zones = line_zones(&set(4.0, 5.0, 9.0, 10.0), palette);
        assert_eq!(zones.len(), 5);
        assert_eq!(zones[0].color, palette.danger);
        assert_eq!(zones[1].color, palette.warning);
        assert_eq!(zones[2].color, palette.success);
        assert_eq!(zones[3].color, palette.warning);
        assert_eq!(zones[4].color, palette.danger);
        assert_eq!(zones[4].up_to, None);
        assert_eq!(zones[2].up_to, Some(9.0));
    }

    #[test]
    fn out_of_order_thresholds_are_clamped_not_inverted() {
        let broken = set(4.0, 9.0, 5.0, 10.0);
        assert!(!broken.is_ordered());
        let clamped = broken.clamped();
        assert!(clamped.is_ordered());
        assert_eq!(clamped.high, 9.0);

        let bands = background_bands(&broken, Theme::Light.palette());
        for band in &bands {
            assert!(band.from <= band.to);
        }
    }

    #[test]
    fn mode_gates_band_and_zone_output() {
        let t = set(4.0, 5.0, 9.0, 10.0);
        let palette = Theme::Light.palette();

        assert!(bands_for_mode(&t, palette, ThresholdDisplay::NoThreshold).is_empty());
        assert!(zones_for_mode(&t, palette, ThresholdDisplay::NoThreshold).is_empty());

        assert!(bands_for_mode(&t, palette, ThresholdDisplay::ColoredLine).is_empty());
        assert_eq!(zones_for_mode(&t, palette, ThresholdDisplay::ColoredLine).len(), 5);

        assert_eq!(
            bands_for_mode(&t, palette, ThresholdDisplay::ColoredBackground).len(),
            5
        );
        assert!(zones_for_mode(&t, palette, ThresholdDisplay::ColoredBackground).is_empty());

        let both = ThresholdDisplay::ColoredBackgroundWithLine;
        assert_eq!(bands_for_mode(&t, palette, both).len(), 5);
        assert_eq!(zones_for_mode(&t, palette, both).len(), 5);
    }

    #[test]
    fn convert_maps_every_boundary() {
        let converted = set(10.0, 15.0, 28.0, 35.0).convert(
            SensorType::Temperature,
            units::CELSIUS,
            units::FAHRENHEIT,
        );
        assert_eq!(converted, set(50.0, 59.0, 82.4, 95.0));
    }
}
