//! Domain types for the Aquadash hydroponics monitoring system.
//!
//! This crate provides the wire-level types shared between the Aquadash
//! backend API and any client: sensors and their threshold configuration,
//! measurements, actuators, query time windows, and the threshold display
//! mode selected by the operator.
//!
//! All types deserialize directly from the backend's JSON and carry no
//! presentation logic. Chart assembly, unit conversion, and preference
//! state live in `aquadash-core`.
//!
//! # Quick Start
//!
//! ```
//! use aquadash_types::{SensorType, TimeDelta};
//!
//! let window = TimeDelta::LAST_DAY;
//! assert_eq!(window.to_string(), "01d,00:00:00");
//!
//! let parsed: SensorType = "ph".parse().unwrap();
//! assert_eq!(parsed, SensorType::Ph);
//! ```

pub mod actuator;
pub mod delta;
pub mod error;
pub mod types;

pub use actuator::{actuator_display_name, Actuator};
pub use delta::TimeDelta;
pub use error::ParseError;
pub use types::{Measurement, Sensor, SensorType, ThresholdDisplay};
