//! Error types for parsing EcoWatch identifiers.

use thiserror::Error;

/// Errors that can occur when parsing EcoWatch enum values from text.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The string does not name a known metric.
    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    /// The string does not name a known alert level.
    #[error("Unknown alert level: {0} (expected 'warning' or 'critical')")]
    UnknownAlertLevel(String),

    /// The string does not name a known sensor category.
    #[error("Unknown sensor kind: {0} (expected 'Campus' or 'Nearby')")]
    UnknownSensorKind(String),
}

/// Result type alias using ecowatch-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
