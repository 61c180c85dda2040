//! Domain models for `FareScout`.
//!
//! ## Submodules
//!
//! - [`query`] - Query types (AirportCode, FlightQuery)
//! - [`flight`] - Flight types (ClockTime, Price, FlightRecord)
//! - [`source`] - Source types (SourceId, FailureKind, SourceOutcome)
//! - [`report`] - Report types (ComparisonReport, ReportStatus)

mod flight;
mod query;
mod report;
mod source;

pub use flight::{ClockTime, FlightRecord, MAX_PLAUSIBLE_PRICE, MIN_PLAUSIBLE_PRICE, Price};
pub use query::{AirportCode, FlightQuery};
pub use report::{ComparisonReport, NO_USABLE_RESULT, ReportStatus};
pub use source::{FailureKind, SourceId, SourceOutcome};
