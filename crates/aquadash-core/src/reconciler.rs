//! Sensor display reconciler.
//!
//! The orchestrating core of the dashboard: for one displayed sensor it
//! reconciles live measurements, the operator's unit preference, threshold
//! bands, and the active theme into a fully resolved, framework-agnostic
//! [`ChartRenderState`]. Any charting widget can consume that state
//! without touching domain logic.
//!
//! Recomputation is wholesale: every trigger (new measurement batch, theme
//! change, unit change, threshold display change) rebuilds the entire
//! state from the sensor's canonical base-unit thresholds and a fresh
//! measurement fetch, so repeated unit switches cannot drift cumulatively.
//!
//! Concurrent refreshes are fenced with a monotonic sequence number: the
//! response that started last always wins, and a slow earlier response is
//! discarded instead of overwriting newer data.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use time::OffsetDateTime;
use tokio::sync::watch;
use tracing::debug;

use aquadash_types::{Measurement, Sensor, ThresholdDisplay, TimeDelta};

use crate::bands::{self, Band, ThresholdSet, Zone};
use crate::prefs::PreferenceStore;
use crate::theme::Theme;
use crate::traits::MeasurementSource;
use crate::units;

/// One point of the rendered series, in display units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesPoint {
    /// When the value was captured.
    pub timestamp: OffsetDateTime,
    /// Value converted to the effective display unit.
    pub value: f64,
}

/// Everything a chart or gauge needs to draw one sensor.
///
/// Owned by the reconciler and rebuilt wholesale on every relevant input
/// change; consumers never mutate it.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartRenderState {
    /// Time-ordered series in the effective display unit.
    pub series: Vec<SeriesPoint>,
    /// Left edge of the time axis (`now - window`).
    pub axis_start: OffsetDateTime,
    /// Right edge of the time axis (`now`).
    pub axis_end: OffsetDateTime,
    /// Background threshold bands, empty unless the mode paints them.
    pub bands: Vec<Band>,
    /// Line zones, empty unless the mode colors the line.
    pub zones: Vec<Zone>,
    /// Series line color for the active theme.
    pub line_color: String,
    /// Chart title.
    pub title: String,
    /// Effective display unit.
    pub unit: String,
}

impl ChartRenderState {
    /// Width of the time axis.
    pub fn axis_span(&self) -> time::Duration {
        self.axis_end - self.axis_start
    }

    /// Whether the state represents "no data".
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Classification of a last measurement against a sensor's thresholds,
/// used by status tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    /// No measurement available.
    Neutral,
    /// Within the normal band.
    Success,
    /// Outside low/high but inside the critical bounds.
    Warning,
    /// Outside the critical bounds.
    Critical,
}

/// Classify a base-unit measurement against a sensor's canonical
/// thresholds.
pub fn status_level(sensor: &Sensor, value: Option<f64>) -> StatusLevel {
    let Some(value) = value else {
        return StatusLevel::Neutral;
    };
    if value < sensor.threshold_critically_low || value > sensor.threshold_critically_high {
        StatusLevel::Critical
    } else if value < sensor.threshold_low || value > sensor.threshold_high {
        StatusLevel::Warning
    } else {
        StatusLevel::Success
    }
}

/// Build a render state from already-fetched base-unit measurements.
///
/// This is the deterministic core of the reconciler, independent of any
/// data source: given the sensor, its measurements, the effective unit,
/// mode, theme, window, and reference instant, the output is fully
/// determined.
pub fn build_render_state(
    sensor: &Sensor,
    measurements: &[Measurement],
    unit: &str,
    mode: ThresholdDisplay,
    theme: Theme,
    window: &TimeDelta,
    now: OffsetDateTime,
) -> ChartRenderState {
    let base_unit = units::default_unit(sensor.sensor_type).unwrap_or_default();
    let needs_conversion = unit != base_unit;

    let series = measurements
        .iter()
        .map(|m| SeriesPoint {
            timestamp: m.timestamp,
            value: if needs_conversion {
                units::convert(sensor.sensor_type, m.value, base_unit, unit)
            } else {
                m.value
            },
        })
        .collect();

    // Always derive from the canonical thresholds, never from previously
    // converted ones.
    let mut thresholds = ThresholdSet::from_sensor(sensor);
    if needs_conversion {
        thresholds = thresholds.convert(sensor.sensor_type, base_unit, unit);
    }

    let palette = theme.palette();
    ChartRenderState {
        series,
        axis_start: now - window.to_duration(),
        axis_end: now,
        bands: bands::bands_for_mode(&thresholds, palette, mode),
        zones: bands::zones_for_mode(&thresholds, palette, mode),
        line_color: palette.line_color.to_string(),
        title: sensor.sensor_type.title().to_string(),
        unit: unit.to_string(),
    }
}

/// Reconciler for one displayed sensor.
///
/// Holds the sensor's canonical definition, a measurement source, and a
/// handle to the preference store. [`refresh`](Self::refresh) fetches the
/// current window and publishes a new render state; subscribers observe
/// states (and effective-unit changes) through watch channels.
pub struct SensorReconciler<S: MeasurementSource> {
    sensor: Sensor,
    source: Arc<S>,
    prefs: PreferenceStore,
    window: Mutex<TimeDelta>,
    next_seq: AtomicU64,
    applied_seq: AtomicU64,
    state_tx: watch::Sender<ChartRenderState>,
    unit_tx: watch::Sender<String>,
}

impl<S: MeasurementSource> SensorReconciler<S> {
    /// Create a reconciler with the default chart range (last year).
    pub fn new(sensor: Sensor, source: Arc<S>, prefs: PreferenceStore) -> Self {
        Self::with_window(sensor, source, prefs, TimeDelta::LAST_YEAR)
    }

    /// Create a reconciler with an explicit initial window.
    pub fn with_window(
        sensor: Sensor,
        source: Arc<S>,
        prefs: PreferenceStore,
        window: TimeDelta,
    ) -> Self {
        let unit = effective_unit(&sensor, &prefs);
        let initial = build_render_state(
            &sensor,
            &[],
            &unit,
            prefs.threshold_display(),
            prefs.theme(),
            &window,
            OffsetDateTime::now_utc(),
        );
        let (state_tx, _) = watch::channel(initial);
        let (unit_tx, _) = watch::channel(unit);
        Self {
            sensor,
            source,
            prefs,
            window: Mutex::new(window),
            next_seq: AtomicU64::new(0),
            applied_seq: AtomicU64::new(0),
            state_tx,
            unit_tx,
        }
    }

    /// The sensor this reconciler displays.
    pub fn sensor(&self) -> &Sensor {
        &self.sensor
    }

    /// The current query window.
    pub fn window(&self) -> TimeDelta {
        *self
            .window
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Change the query window. Takes effect on the next refresh.
    pub fn set_window(&self, window: TimeDelta) {
        *self
            .window
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = window;
    }

    /// The unit the sensor currently renders in: the operator's preference
    /// when valid for the type, otherwise the type's default unit.
    pub fn effective_unit(&self) -> String {
        effective_unit(&self.sensor, &self.prefs)
    }

    /// Observe render states: current value now, every recomputation
    /// afterwards.
    pub fn watch_state(&self) -> watch::Receiver<ChartRenderState> {
        self.state_tx.subscribe()
    }

    /// Observe the effective display unit; emits only when it changes.
    pub fn watch_unit(&self) -> watch::Receiver<String> {
        self.unit_tx.subscribe()
    }

    /// The most recently published render state.
    pub fn current_state(&self) -> ChartRenderState {
        self.state_tx.borrow().clone()
    }

    /// Fetch the current window and publish a recomputed render state.
    ///
    /// Returns the new state, or `None` when a newer refresh completed
    /// while this one's fetch was in flight: the stale result is
    /// discarded and the already-published newer state stands.
    pub async fn refresh(&self) -> Option<ChartRenderState> {
        let ticket = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let window = self.window();

        let measurements = self
            .source
            .measurements_for_window(self.sensor.sensor_id, &window)
            .await;

        let unit = self.effective_unit();
        let state = build_render_state(
            &self.sensor,
            &measurements,
            &unit,
            self.prefs.threshold_display(),
            self.prefs.theme(),
            &window,
            OffsetDateTime::now_utc(),
        );

        // A response that started earlier than the latest applied one
        // loses; whoever started last wins regardless of arrival order.
        // The fence check runs inside the channel's publish lock so a
        // winner cannot be overwritten by a loser that raced past an
        // earlier check.
        let mut published = false;
        self.state_tx.send_if_modified(|current| {
            let latest = self.applied_seq.fetch_max(ticket, Ordering::SeqCst);
            if latest > ticket {
                return false;
            }
            *current = state.clone();
            published = true;
            true
        });
        if !published {
            debug!(
                sensor_id = self.sensor.sensor_id,
                ticket, "discarding stale measurement response"
            );
            return None;
        }

        if *self.unit_tx.borrow() != unit {
            self.unit_tx.send_replace(unit);
        }
        Some(state)
    }

    /// Latest base-unit measurement from the source.
    ///
    /// Status classification via [`status_level`] must use this value:
    /// the sensor's thresholds are canonical base-unit values.
    pub async fn last_measurement(&self) -> Option<Measurement> {
        self.source.last_measurement(self.sensor.sensor_id).await
    }

    /// Convert a base-unit value to the effective display unit.
    pub fn to_display_value(&self, base_value: f64) -> f64 {
        let base = units::default_unit(self.sensor.sensor_type).unwrap_or_default();
        let unit = self.effective_unit();
        if unit == base {
            base_value
        } else {
            units::convert(self.sensor.sensor_type, base_value, base, &unit)
        }
    }

    /// Latest measurement converted to the effective display unit, for
    /// rendering next to the chart.
    pub async fn last_display_value(&self) -> Option<f64> {
        let last = self.last_measurement().await?;
        Some(self.to_display_value(last.value))
    }
}

fn effective_unit(sensor: &Sensor, prefs: &PreferenceStore) -> String {
    if let Some(unit) = prefs.sensor_unit(sensor.sensor_type) {
        if units::is_valid_unit(sensor.sensor_type, &unit) {
            return unit;
        }
    }
    units::default_unit(sensor.sensor_type)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use aquadash_types::SensorType;

    fn sensor() -> Sensor {
        Sensor {
            sensor_id: 1,
            sensor_type: SensorType::Ph,
            prototype_id: 0,
            sensor_unit: "pH".to_string(),
            threshold_critically_low: 4.0,
            threshold_low: 5.0,
            threshold_high: 9.0,
            threshold_critically_high: 10.0,
        }
    }

    #[test]
    fn status_levels_follow_thresholds() {
        let s = sensor();
        assert_eq!(status_level(&s, None), StatusLevel::Neutral);
        assert_eq!(status_level(&s, Some(7.0)), StatusLevel::Success);
        assert_eq!(status_level(&s, Some(4.5)), StatusLevel::Warning);
        assert_eq!(status_level(&s, Some(9.5)), StatusLevel::Warning);
        assert_eq!(status_level(&s, Some(3.0)), StatusLevel::Critical);
        assert_eq!(status_level(&s, Some(11.0)), StatusLevel::Critical);
    }

    #[test]
    fn empty_series_still_spans_the_requested_window() {
        let now = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        let state = build_render_state(
            &sensor(),
            &[],
            "pH",
            ThresholdDisplay::ColoredBackground,
            Theme::Light,
            &TimeDelta::LAST_HOUR,
            now,
        );
        assert!(state.is_empty());
        assert_eq!(state.axis_span().whole_milliseconds(), 3_600_000);
        assert_eq!(state.axis_end, now);
        assert_eq!(state.bands.len(), 5);
    }

    #[test]
    fn no_threshold_mode_emits_neither_bands_nor_zones() {
        let state = build_render_state(
            &sensor(),
            &[],
            "pH",
            ThresholdDisplay::NoThreshold,
            Theme::Light,
            &TimeDelta::LAST_HOUR,
            OffsetDateTime::now_utc(),
        );
        assert!(state.bands.is_empty());
        assert!(state.zones.is_empty());
    }

    #[test]
    fn temperature_series_and_thresholds_convert_together() {
        let s = Sensor {
            sensor_id: 2,
            sensor_type: SensorType::Temperature,
            prototype_id: 0,
            sensor_unit: units::CELSIUS.to_string(),
            threshold_critically_low: 10.0,
            threshold_low: 15.0,
            threshold_high: 28.0,
            threshold_critically_high: 35.0,
        };
        let measurements = [Measurement {
            timestamp: OffsetDateTime::from_unix_timestamp(0).unwrap(),
            value: 20.0,
        }];
        let state = build_render_state(
            &s,
            &measurements,
            units::FAHRENHEIT,
            ThresholdDisplay::ColoredLine,
            Theme::Dark,
            &TimeDelta::LAST_DAY,
            OffsetDateTime::now_utc(),
        );
        assert_eq!(state.series[0].value, 68.0);
        assert_eq!(state.unit, units::FAHRENHEIT);
        // Zones carry the converted boundaries.
        assert_eq!(state.zones[0].up_to, Some(50.0));
        assert_eq!(state.zones[3].up_to, Some(95.0));
    }

    #[test]
    fn theme_selects_line_color() {
        let light = build_render_state(
            &sensor(),
            &[],
            "pH",
            ThresholdDisplay::NoThreshold,
            Theme::Light,
            &TimeDelta::LAST_HOUR,
            OffsetDateTime::now_utc(),
        );
        let dark = build_render_state(
            &sensor(),
            &[],
            "pH",
            ThresholdDisplay::NoThreshold,
            Theme::Dark,
            &TimeDelta::LAST_HOUR,
            OffsetDateTime::now_utc(),
        );
        assert_ne!(light.line_color, dark.line_color);
    }
}
