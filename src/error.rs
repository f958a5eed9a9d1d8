//! Error types for configuration and simulation setup.

use thiserror::Error;

/// Result type for simulation operations.
pub type SimResult<T> = Result<T, SimError>;

/// Errors surfaced to callers before any simulation step runs.
///
/// Arithmetic invariant violations (SoC out of bounds, energy imbalance) are
/// defects and are caught by debug assertions instead.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    /// A parameter is outside its documented bound or not recognized.
    #[error("invalid configuration: {field} - {message}")]
    InvalidConfiguration {
        /// Dotted field path (e.g., `"battery.capacity_kwh"`).
        field: String,
        /// Human-readable constraint description.
        message: String,
    },

    /// `derc` tariff mode with a (season, utility) pair missing from the rate table.
    #[error("unknown tariff schedule: season \"{season}\", utility \"{utility}\"")]
    UnknownTariffSchedule { season: String, utility: String },
}

impl SimError {
    pub(crate) fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns the offending field path for configuration errors.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::InvalidConfiguration { field, .. } => Some(field),
            Self::UnknownTariffSchedule { .. } => None,
        }
    }
}
