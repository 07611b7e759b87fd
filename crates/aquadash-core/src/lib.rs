//! Display-state engine for the Aquadash hydroponics dashboard.
//!
//! This crate reconciles live sensor measurements, per-sensor unit
//! preferences, threshold bands, and the active theme into renderable
//! chart state. It contains no rendering: the output of the
//! [`reconciler`] is a framework-agnostic description of what a chart or
//! gauge should currently display.
//!
//! # Features
//!
//! - **Unit conversion**: °C ↔ °F and µS/cm ↔ mS/cm with per-type
//!   rounding, identity for single-unit sensor types
//! - **Threshold bands**: background bands and line zones derived from a
//!   sensor's four thresholds, gated by the selected display mode
//! - **Preferences**: persisted theme, threshold display mode, unit
//!   choices, and sensor ordering with change notification
//! - **Reconciliation**: wholesale render-state recomputation per trigger,
//!   fenced against out-of-order fetch responses
//! - **Gateway**: fail-soft REST client for the Aquadash backend
//! - **Camera**: timer-driven snapshot URL refresh with clean teardown
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use aquadash_core::gateway::Gateway;
//! use aquadash_core::prefs::PreferenceStore;
//! use aquadash_core::reconciler::SensorReconciler;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let gateway = Arc::new(Gateway::new("http://localhost:8000", 0)?);
//!     let prefs = PreferenceStore::open_default();
//!
//!     for sensor in gateway.sensors().await {
//!         let reconciler =
//!             SensorReconciler::new(sensor, Arc::clone(&gateway), prefs.clone());
//!         if let Some(state) = reconciler.refresh().await {
//!             println!("{}: {} points in {}", state.title, state.series.len(), state.unit);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod bands;
pub mod camera;
pub mod error;
pub mod gateway;
pub mod mock;
pub mod prefs;
pub mod reconciler;
pub mod theme;
pub mod traits;
pub mod units;

pub use bands::{Band, ThresholdSet, Zone, THRESHOLD_MARGIN};
pub use camera::{SnapshotPoller, SNAPSHOT_REFRESH};
pub use error::{Error, Result};
pub use gateway::Gateway;
pub use mock::MockSource;
pub use prefs::{FileStorage, MemoryStorage, PreferenceStore, Storage};
pub use reconciler::{
    build_render_state, status_level, ChartRenderState, SensorReconciler, SeriesPoint, StatusLevel,
};
pub use theme::{BandOpacity, Palette, Theme};
pub use traits::MeasurementSource;

// Re-export the wire types alongside the engine.
pub use aquadash_types::{
    Actuator, Measurement, ParseError, Sensor, SensorType, ThresholdDisplay, TimeDelta,
};
