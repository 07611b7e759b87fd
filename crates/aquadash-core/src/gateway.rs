//! HTTP client for the Aquadash backend API.
//!
//! Thin request/response wrapper over the REST endpoints the dashboard
//! consumes. Sensor and measurement fetchers are fail-soft: network and
//! parse errors are logged and converted to an empty result, so display
//! code never handles a rejected fetch specially. Actuator submissions
//! keep their `Result` because the operator is shown success or failure.
//!
//! # Example
//!
//! ```no_run
//! use aquadash_core::gateway::Gateway;
//! use aquadash_types::TimeDelta;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let gateway = Gateway::new("http://localhost:8000", 0)?;
//!
//! let sensors = gateway.sensors().await;
//! for sensor in &sensors {
//!     let series = gateway
//!         .measurements_delta(sensor.sensor_id, &TimeDelta::LAST_DAY)
//!         .await;
//!     println!("{}: {} points", sensor.sensor_type, series.len());
//! }
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::warn;

use aquadash_types::{Actuator, Measurement, Sensor, TimeDelta};

use crate::error::{Error, Result};
use crate::traits::MeasurementSource;

/// HTTP client for the Aquadash backend.
#[derive(Debug, Clone)]
pub struct Gateway {
    client: Client,
    base_url: String,
    prototype_id: i64,
}

impl Gateway {
    /// Create a new gateway.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Backend base URL (e.g. "http://localhost:8000")
    /// * `prototype_id` - Device group whose sensors/actuators to address
    pub fn new(base_url: &str, prototype_id: i64) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()?;
        Self::with_client(base_url, prototype_id, client)
    }

    /// Create a gateway with a custom reqwest client.
    pub fn with_client(base_url: &str, prototype_id: i64, client: Client) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(Error::InvalidUrl(format!(
                "URL must start with http:// or https://, got: {}",
                base_url
            )));
        }
        Ok(Self {
            client,
            base_url,
            prototype_id,
        })
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The device group this gateway addresses.
    pub fn prototype_id(&self) -> i64 {
        self.prototype_id
    }

    /// Cache-busted camera snapshot URL.
    pub fn picture_url(&self) -> String {
        let ts = (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64;
        format!("{}/picture?_ts={}", self.base_url, ts)
    }

    // ----- fallible API -----

    /// Fetch the sensors of this prototype.
    pub async fn try_sensors(&self) -> Result<Vec<Sensor>> {
        let url = format!("{}/sensors/{}", self.base_url, self.prototype_id);
        self.get_json(&url).await
    }

    /// Fetch measurements for a sensor over the trailing window.
    pub async fn try_measurements_delta(
        &self,
        sensor_id: i64,
        window: &TimeDelta,
    ) -> Result<Vec<Measurement>> {
        let url = format!(
            "{}/measurements/{}?time_delta={}",
            self.base_url, sensor_id, window
        );
        self.get_json(&url).await
    }

    /// Fetch measurements for a sensor between two instants.
    pub async fn try_measurements_between(
        &self,
        sensor_id: i64,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<Vec<Measurement>> {
        let start = start.format(&Rfc3339).map_err(|e| {
            Error::InvalidUrl(format!("unformattable start time: {e}"))
        })?;
        let end = end
            .format(&Rfc3339)
            .map_err(|e| Error::InvalidUrl(format!("unformattable end time: {e}")))?;
        let url = format!(
            "{}/measurements/{}?start_time={}+end_time={}",
            self.base_url, sensor_id, start, end
        );
        self.get_json(&url).await
    }

    /// Fetch the most recent measurement for a sensor.
    pub async fn try_last_measurement(&self, sensor_id: i64) -> Result<Measurement> {
        let url = format!("{}/measurements/{}/last", self.base_url, sensor_id);
        self.get_json(&url).await
    }

    /// Fetch the actuators of this prototype.
    pub async fn try_actuators(&self) -> Result<Vec<Actuator>> {
        let url = format!("{}/actuators/{}", self.base_url, self.prototype_id);
        self.get_json(&url).await
    }

    /// Submit edits for an actuator list.
    pub async fn patch_actuators(&self, actuators: &[Actuator]) -> Result<()> {
        let url = format!("{}/actuators", self.base_url);
        let response = self.client.patch(&url).json(actuators).send().await?;
        Self::check_status(response).await
    }

    /// Persist a new actuator.
    pub async fn post_actuator(&self, actuator: &Actuator) -> Result<()> {
        let url = format!("{}/actuators", self.base_url);
        let response = self.client.post(&url).json(actuator).send().await?;
        Self::check_status(response).await
    }

    // ----- fail-soft API -----

    /// Sensors of this prototype; empty on failure.
    pub async fn sensors(&self) -> Vec<Sensor> {
        self.try_sensors().await.unwrap_or_else(|e| {
            warn!(error = %e, "sensor fetch failed");
            Vec::new()
        })
    }

    /// Window of measurements; empty on failure.
    pub async fn measurements_delta(&self, sensor_id: i64, window: &TimeDelta) -> Vec<Measurement> {
        self.try_measurements_delta(sensor_id, window)
            .await
            .unwrap_or_else(|e| {
                warn!(sensor_id, error = %e, "measurement fetch failed");
                Vec::new()
            })
    }

    /// Latest measurement; `None` on failure.
    pub async fn last_measurement(&self, sensor_id: i64) -> Option<Measurement> {
        match self.try_last_measurement(sensor_id).await {
            Ok(measurement) => Some(measurement),
            Err(e) => {
                warn!(sensor_id, error = %e, "last-measurement fetch failed");
                None
            }
        }
    }

    /// Actuators of this prototype; empty on failure.
    pub async fn actuators(&self) -> Vec<Actuator> {
        self.try_actuators().await.unwrap_or_else(|e| {
            warn!(error = %e, "actuator fetch failed");
            Vec::new()
        })
    }

    // ----- internals -----

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            Err(Error::Api {
                status: status.as_u16(),
                message: Self::error_message(response).await,
            })
        }
    }

    async fn check_status(response: reqwest::Response) -> Result<()> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Error::Api {
                status: status.as_u16(),
                message: Self::error_message(response).await,
            })
        }
    }

    async fn error_message(response: reqwest::Response) -> String {
        let status = response.status();
        response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(String::from))
            .unwrap_or_else(|| status.to_string())
    }
}

#[async_trait]
impl MeasurementSource for Gateway {
    async fn measurements_for_window(
        &self,
        sensor_id: i64,
        window: &TimeDelta,
    ) -> Vec<Measurement> {
        self.measurements_delta(sensor_id, window).await
    }

    async fn last_measurement(&self, sensor_id: i64) -> Option<Measurement> {
        Gateway::last_measurement(self, sensor_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_creation() {
        let gateway = Gateway::new("http://localhost:8000", 0);
        assert!(gateway.is_ok());
        assert_eq!(gateway.unwrap().base_url(), "http://localhost:8000");
    }

    #[test]
    fn gateway_normalizes_trailing_slash() {
        let gateway = Gateway::new("http://localhost:8000/", 2).unwrap();
        assert_eq!(gateway.base_url(), "http://localhost:8000");
        assert_eq!(gateway.prototype_id(), 2);
    }

    #[test]
    fn gateway_rejects_schemeless_url() {
        let result = Gateway::new("localhost:8000", 0);
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn picture_url_is_cache_busted() {
        let gateway = Gateway::new("http://localhost:8000", 0).unwrap();
        let url = gateway.picture_url();
        assert!(url.starts_with("http://localhost:8000/picture?_ts="));
    }
}
