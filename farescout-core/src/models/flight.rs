//! Flight record types.
//!
//! - [`ClockTime`] - Wall-clock `HH:MM` time
//! - [`Price`] - Positive INR amount
//! - [`FlightRecord`] - One normalized, validated fare from a source

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::source::SourceId;
use crate::error::CoreError;

/// Lowest fare (INR) accepted as a real ticket price.
pub const MIN_PLAUSIBLE_PRICE: i64 = 1_000;

/// Highest fare (INR) accepted as a real ticket price.
pub const MAX_PLAUSIBLE_PRICE: i64 = 150_000;

// ============================================================================
// Clock Time
// ============================================================================

/// A 24-hour wall-clock time, serialized as `"HH:MM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime {
    hour: u8,
    minute: u8,
}

impl ClockTime {
    /// Creates a clock time.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidClockTime` if hour > 23 or minute > 59.
    pub fn new(hour: u8, minute: u8) -> Result<Self, CoreError> {
        if hour > 23 || minute > 59 {
            return Err(CoreError::InvalidClockTime(format!("{hour:02}:{minute:02}")));
        }
        Ok(Self { hour, minute })
    }

    /// Hour component (0-23).
    pub fn hour(&self) -> u8 {
        self.hour
    }

    /// Minute component (0-59).
    pub fn minute(&self) -> u8 {
        self.minute
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for ClockTime {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::InvalidClockTime(s.to_string());
        let (h, m) = s.trim().split_once(':').ok_or_else(invalid)?;
        if h.len() != 2 || m.len() != 2 {
            return Err(invalid());
        }
        let hour = h.parse::<u8>().map_err(|_| invalid())?;
        let minute = m.parse::<u8>().map_err(|_| invalid())?;
        Self::new(hour, minute)
    }
}

impl TryFrom<String> for ClockTime {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClockTime> for String {
    fn from(time: ClockTime) -> Self {
        time.to_string()
    }
}

// ============================================================================
// Price
// ============================================================================

/// A positive fare in Indian rupees.
///
/// Serialized as a decimal string (`"4200"`), never as a float.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Creates a price from any positive amount.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidPrice` for zero or negative amounts.
    pub fn new(amount: Decimal) -> Result<Self, CoreError> {
        if amount > Decimal::ZERO {
            Ok(Self(amount))
        } else {
            Err(CoreError::InvalidPrice(amount.to_string()))
        }
    }

    /// Returns a price only if it lies inside the plausibility bound
    /// `[MIN_PLAUSIBLE_PRICE, MAX_PLAUSIBLE_PRICE]`.
    pub fn plausible(amount: Decimal) -> Option<Self> {
        Self::is_plausible(amount).then_some(Self(amount))
    }

    /// Returns true if the amount is a believable ticket price.
    pub fn is_plausible(amount: Decimal) -> bool {
        amount >= Decimal::from(MIN_PLAUSIBLE_PRICE) && amount <= Decimal::from(MAX_PLAUSIBLE_PRICE)
    }

    /// Returns the raw amount.
    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Formats as `₹4,200` (or `₹4,200.50` when there is a fractional part).
    pub fn formatted(&self) -> String {
        let normalized = self.0.normalize();
        let text = normalized.to_string();
        let (whole, frac) = match text.split_once('.') {
            Some((w, f)) => (w.to_string(), Some(f.to_string())),
            None => (text, None),
        };

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, ch) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        match frac {
            Some(f) => format!("₹{grouped}.{f}"),
            None => format!("₹{grouped}"),
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = CoreError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl From<u32> for Price {
    fn from(value: u32) -> Self {
        // Zero is the only non-positive u32; clamp it to the smallest unit.
        Self(Decimal::from(value.max(1)))
    }
}

// ============================================================================
// Flight Record
// ============================================================================

/// One normalized fare extracted from a source.
///
/// Built by a source adapter from an extraction draft and never mutated
/// afterwards. `price` is always inside the plausibility bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightRecord {
    /// Airline name, `"Unknown"` when nothing matched.
    pub airline: String,
    /// Flight number such as `6E-2134`.
    pub flight_code: Option<String>,
    /// Fare.
    pub price: Price,
    /// Departure time.
    pub departure_time: Option<ClockTime>,
    /// Arrival time.
    pub arrival_time: Option<ClockTime>,
    /// Block time in minutes.
    pub duration_minutes: Option<u32>,
    /// Number of stops.
    pub stop_count: u8,
    /// Which site the record came from.
    pub source: SourceId,
    /// URL the fare can be booked from.
    pub booking_reference: String,
    /// Departure city as printed on the page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure_city: Option<String>,
    /// Arrival city as printed on the page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrival_city: Option<String>,
    /// When the record was extracted.
    pub scraped_at: DateTime<Utc>,
}

impl FlightRecord {
    /// Formats the duration as `2h 15m`.
    pub fn duration_label(&self) -> Option<String> {
        self.duration_minutes
            .map(|m| format!("{}h {:02}m", m / 60, m % 60))
    }

    /// Formats the stop count as `Non-stop`, `1 stop`, `2 stops`.
    pub fn stops_label(&self) -> String {
        match self.stop_count {
            0 => "Non-stop".to_string(),
            1 => "1 stop".to_string(),
            n => format!("{n} stops"),
        }
    }

    /// Checks the record invariants.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidPrice` if the price left the plausible bound.
    pub fn validate(&self) -> Result<(), CoreError> {
        if Price::is_plausible(self.price.amount()) {
            Ok(())
        } else {
            Err(CoreError::InvalidPrice(self.price.to_string()))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
