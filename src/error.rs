//! Error types for position, configuration and forecast failures.

use thiserror::Error;

/// Why a solar position could not be computed for an instant.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum PositionError {
    #[error("invalid latitude {0}° (must be between -90° and +90°)")]
    InvalidLatitude(f64),
    #[error("invalid longitude {0}° (must be between -180° and +180°)")]
    InvalidLongitude(f64),
    #[error("solar position is not finite (elevation {elevation}, azimuth {azimuth})")]
    NonFinite { elevation: f64, azimuth: f64 },
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g. `"panel.tilt"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Failures that abort a whole forecast run.
///
/// [`crate::ForecastEngine::forecast`] never surfaces these; it logs them and
/// returns the empty result instead. Use
/// [`crate::ForecastEngine::try_forecast`] to observe them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ForecastError {
    #[error("local midnight of {date} does not exist in {timezone}")]
    UnresolvableMidnight { date: chrono::NaiveDate, timezone: String },
    #[error("calendar date after {0} is out of range")]
    DateOutOfRange(chrono::NaiveDate),
    #[error("timestamp overflow while stepping from {0}")]
    TimestampOverflow(String),
}
