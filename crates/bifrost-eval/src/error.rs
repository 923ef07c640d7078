//! Error types for bifrost-eval

use thiserror::Error;

/// Result type alias for bifrost-eval operations
pub type BifrostResult<T> = Result<T, BifrostError>;

/// Construction and validation errors.
///
/// Executor failures and timeouts are never surfaced through this type: they
/// are recovered into failing scenario outcomes by the runner.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BifrostError {
    /// Score value outside the unit interval
    #[error("Score '{name}' has value {value}, expected a value in [0, 1]")]
    ScoreOutOfRange { name: String, value: f64 },

    /// Score weight below zero (or NaN)
    #[error("Score '{name}' has weight {weight}, expected a non-negative weight")]
    InvalidWeight { name: String, weight: f64 },

    /// Scenario failed validation
    #[error("Invalid scenario '{name}': {reason}")]
    InvalidScenario { name: String, reason: String },

    /// Suite failed validation
    #[error("Invalid suite '{name}': {reason}")]
    InvalidSuite { name: String, reason: String },

    /// Configuration failed validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// A metric could not produce a score
    #[error("Metric '{metric}' failed: {message}")]
    Metric { metric: String, message: String },
}

impl BifrostError {
    /// Create a scenario validation error
    pub fn invalid_scenario(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidScenario {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a suite validation error
    pub fn invalid_suite(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSuite {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a metric failure
    pub fn metric(metric: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Metric {
            metric: metric.into(),
            message: message.into(),
        }
    }
}
