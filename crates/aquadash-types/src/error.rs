//! Parse errors for Aquadash wire types.

/// Errors that can occur when parsing wire-format values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The sensor type identifier is not recognized.
    #[error("unknown sensor type: {0}")]
    UnknownSensorType(String),

    /// The time delta string does not match the `DDd,HH:MM:SS` shape.
    #[error("invalid time delta: {0}")]
    InvalidTimeDelta(String),

    /// The threshold display mode value is out of range.
    #[error("unknown threshold display mode: {0}")]
    UnknownThresholdDisplay(u8),
}
