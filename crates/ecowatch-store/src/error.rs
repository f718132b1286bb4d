//! Error types for ecowatch-store.

/// Result type for ecowatch-store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in ecowatch-store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// No sensor with this id is loaded.
    #[error("Sensor not found: {0}")]
    SensorNotFound(u32),

    /// The backfill window reaches past the representable time range.
    #[error("Backfill of {count} readings spaced {spacing_secs}s is out of range")]
    BackfillOutOfRange { count: u32, spacing_secs: i64 },
}
