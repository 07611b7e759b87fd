//! Trait seams between the reconciler and its data source.

use async_trait::async_trait;

use aquadash_types::{Measurement, TimeDelta};

/// Source of measurements for the reconciler.
///
/// Implemented by the HTTP [`crate::gateway::Gateway`] and by
/// [`crate::mock::MockSource`] for tests. All methods are fail-soft: a
/// failed fetch surfaces as an empty result, never as an error, so the
/// reconciler renders a "no data" state instead of propagating failures.
#[async_trait]
pub trait MeasurementSource: Send + Sync {
    /// Measurements for a sensor over the trailing window.
    async fn measurements_for_window(
        &self,
        sensor_id: i64,
        window: &TimeDelta,
    ) -> Vec<Measurement>;

    /// The most recent measurement for a sensor, if any.
    async fn last_measurement(&self, sensor_id: i64) -> Option<Measurement>;
}
