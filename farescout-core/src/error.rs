//! Core error types for `FareScout`.

use thiserror::Error;

/// Core error type for `FareScout` model validation.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Airport code is not three ASCII letters.
    #[error("Invalid airport code: {0}")]
    InvalidAirportCode(String),

    /// Clock time is not a valid `HH:MM` value.
    #[error("Invalid clock time: {0}")]
    InvalidClockTime(String),

    /// Price is missing, non-positive, or unparseable.
    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    /// Invalid data from an extraction pass.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// An airport CSV file could not be used.
    #[error("Airport data: {0}")]
    AirportData(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

/// Error returned by a [`QueryInterpreter`](crate::QueryInterpreter) that
/// could not turn free text into a structured query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterpretError {
    /// The input was empty or whitespace.
    #[error("Query is empty")]
    Empty,

    /// No origin city could be found.
    #[error("Could not find an origin in \"{0}\"")]
    MissingOrigin(String),

    /// No destination city could be found.
    #[error("Could not find a destination in \"{0}\"")]
    MissingDestination(String),

    /// No travel date could be found or parsed.
    #[error("Could not find a travel date in \"{0}\"")]
    MissingDate(String),

    /// Origin and destination resolved to the same airport.
    #[error("Origin and destination are both {0}")]
    SameAirport(String),

    /// The interpreter backend itself failed.
    #[error("Interpreter unavailable: {0}")]
    Backend(String),
}
