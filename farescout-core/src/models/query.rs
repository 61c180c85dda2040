//! Query types.
//!
//! - [`AirportCode`] - Validated three-letter IATA code
//! - [`FlightQuery`] - Structured route/date query produced by an interpreter

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

// ============================================================================
// Airport Code
// ============================================================================

/// A three-letter airport code such as `DEL` or `BOM`.
///
/// Always stored uppercase. Serialized as a plain string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AirportCode(String);

impl AirportCode {
    /// Creates a code from any three ASCII letters, uppercasing them.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidAirportCode` unless the trimmed input is
    /// exactly three ASCII letters.
    pub fn new(code: &str) -> Result<Self, CoreError> {
        let trimmed = code.trim();
        if trimmed.len() == 3 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self(trimmed.to_ascii_uppercase()))
        } else {
            Err(CoreError::InvalidAirportCode(code.to_string()))
        }
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AirportCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AirportCode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for AirportCode {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<AirportCode> for String {
    fn from(code: AirportCode) -> Self {
        code.0
    }
}

// ============================================================================
// Flight Query
// ============================================================================

/// A structured one-way flight query.
///
/// Produced once by a [`QueryInterpreter`](crate::QueryInterpreter) and then
/// only read by every source adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightQuery {
    /// Departure airport.
    pub origin: AirportCode,
    /// Arrival airport.
    pub destination: AirportCode,
    /// Travel date.
    pub date: NaiveDate,
    /// The text the query was interpreted from.
    pub raw_text: String,
}

impl FlightQuery {
    /// Creates a new query.
    pub fn new(
        origin: AirportCode,
        destination: AirportCode,
        date: NaiveDate,
        raw_text: impl Into<String>,
    ) -> Self {
        Self {
            origin,
            destination,
            date,
            raw_text: raw_text.into(),
        }
    }

    /// Returns a short `ORIG → DEST on YYYY-MM-DD` description.
    pub fn describe(&self) -> String {
        format!("{} → {} on {}", self.origin, self.destination, self.date)
    }
}

// ============================================================================
// Tests
// ============================================================================
