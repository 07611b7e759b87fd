//! Mock measurement source for testing.
//!
//! Implements [`MeasurementSource`] without a backend, with failure
//! injection and latency simulation so tests can exercise the
//! reconciler's fail-soft and stale-response behavior.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use aquadash_types::{Measurement, TimeDelta};

use crate::traits::MeasurementSource;

/// A measurement source backed by in-memory data.
#[derive(Debug, Default)]
pub struct MockSource {
    measurements: RwLock<HashMap<i64, Vec<Measurement>>>,
    should_fail: AtomicBool,
    latency_ms: AtomicU64,
}

impl MockSource {
    /// An empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the measurements served for a sensor.
    pub async fn set_measurements(&self, sensor_id: i64, measurements: Vec<Measurement>) {
        self.measurements
            .write()
            .await
            .insert(sensor_id, measurements);
    }

    /// When `true`, every fetch behaves like a failed request and yields
    /// an empty result.
    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }

    /// Artificial delay applied to each fetch.
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    async fn simulate_latency(&self) {
        let ms = self.latency_ms.load(Ordering::SeqCst);
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }
}

#[async_trait]
impl MeasurementSource for MockSource {
    async fn measurements_for_window(
        &self,
        sensor_id: i64,
        _window: &TimeDelta,
    ) -> Vec<Measurement> {
        self.simulate_latency().await;
        if self.should_fail.load(Ordering::SeqCst) {
            return Vec::new();
        }
        self.measurements
            .read()
            .await
            .get(&sensor_id)
            .cloned()
            .unwrap_or_default()
    }

    async fn last_measurement(&self, sensor_id: i64) -> Option<Measurement> {
        self.simulate_latency().await;
        if self.should_fail.load(Ordering::SeqCst) {
            return None;
        }
        self.measurements
            .read()
            .await
            .get(&sensor_id)
            .and_then(|series| series.last().copied())
    }
}
