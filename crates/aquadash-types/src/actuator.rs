//! Actuator (pump) configuration types.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// An actuator as exchanged with `GET/PATCH/POST /actuators`.
///
/// The list returned by a fetch replaces any previously held list
/// wholesale; there is no incremental sync. New actuators start as
/// client-side drafts (see [`Actuator::draft`]) and are persisted with a
/// `POST` on submit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actuator {
    /// Unique identifier; `0` for an unsaved draft.
    pub actuator_id: i64,
    /// Operator-facing name.
    pub actuator_name: String,
    /// Pump category (`acid_pump`, `base_pump`, ...).
    pub actuator_type: String,
    /// Sensor value the activation condition compares against.
    pub condition_value: f64,
    /// When to trigger relative to the condition value (`high` / `low`).
    pub activation_condition: String,
    /// Minimum seconds between activations.
    pub activation_period: i64,
    /// Seconds the actuator stays on once triggered.
    pub activation_duration: i64,
    /// Last time the actuator fired, if ever.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub last_activated: Option<OffsetDateTime>,
    /// Whether the actuator participates in control at all.
    pub enabled: bool,
}

impl Actuator {
    /// Create an unsaved draft with control fields zeroed.
    pub fn draft(name: impl Into<String>, actuator_type: impl Into<String>) -> Self {
        Self {
            actuator_id: 0,
            actuator_name: name.into(),
            actuator_type: actuator_type.into(),
            condition_value: 0.0,
            activation_condition: "high".to_string(),
            activation_period: 0,
            activation_duration: 0,
            last_activated: None,
            enabled: false,
        }
    }

    /// Whether this actuator has been persisted server-side.
    pub fn is_draft(&self) -> bool {
        self.actuator_id == 0
    }
}

/// Operator-facing name for a pump category, falling back to the raw
/// category for unknown types.
pub fn actuator_display_name(actuator_type: &str) -> &str {
    match actuator_type {
        "acid_pump" => "Pompe à acide",
        "base_pump" => "Pompe à base",
        "nutrients_A_pump" => "Pompe à nutriments A",
        "nutrients_B_pump" => "Pompe à nutriments B",
        other => other,
    }
}
