// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `FareScout` Core
//!
//! Core types, models, and traits shared by every `FareScout` crate:
//!
//! - Domain models (queries, flight records, source outcomes, reports)
//! - Error types
//! - The [`QueryInterpreter`] trait and a pattern-based implementation
//! - The immutable [`AirportTable`] lookup
//!
//! ## Key Types
//!
//! ### Query Types
//! - [`AirportCode`] - Validated three-letter airport code
//! - [`FlightQuery`] - Structured one-way query
//!
//! ### Flight Types
//! - [`FlightRecord`] - One normalized fare
//! - [`Price`] - Positive INR amount with a plausibility bound
//! - [`ClockTime`] - `HH:MM` wall-clock time
//!
//! ### Outcome Types
//! - [`SourceId`] - Supported booking sites
//! - [`SourceOutcome`] - Result of asking one source
//! - [`FailureKind`] - Failure taxonomy
//! - [`ComparisonReport`] - Final merged answer

pub mod airports;
pub mod error;
pub mod interpret;
pub mod models;
pub mod traits;

// Re-export error types
pub use error::{CoreError, InterpretError};

// Re-export all model types
pub use models::{
    // Query types
    AirportCode,
    FlightQuery,
    // Flight types
    ClockTime,
    FlightRecord,
    MAX_PLAUSIBLE_PRICE,
    MIN_PLAUSIBLE_PRICE,
    Price,
    // Outcome types
    ComparisonReport,
    FailureKind,
    NO_USABLE_RESULT,
    ReportStatus,
    SourceId,
    SourceOutcome,
};

pub use airports::AirportTable;
pub use interpret::PatternInterpreter;
pub use traits::QueryInterpreter;
