//! Comparison report types.
//!
//! - [`ComparisonReport`] - The terminal artifact of one search
//! - [`ReportStatus`] - Coarse classification of the report

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::flight::FlightRecord;
use super::query::FlightQuery;
use super::source::SourceId;

/// Error log entry appended whenever a report carries no usable record.
pub const NO_USABLE_RESULT: &str = "No usable result: no source returned any flights";

// ============================================================================
// Report Status
// ============================================================================

/// What kind of answer a report holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    /// At least one record was found.
    Found,
    /// Some source answered, but none had flights.
    NoFlights,
    /// Every source failed.
    AllSourcesFailed,
    /// The query could not be interpreted; no source was asked.
    InterpreterFailed,
}

impl ReportStatus {
    /// Returns true if the report has a cheapest flight.
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found)
    }
}

// ============================================================================
// Comparison Report
// ============================================================================

/// The merged, ranked answer to one query.
///
/// Built once by the aggregator and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonReport {
    /// Structured query, absent when interpretation failed.
    pub query: Option<FlightQuery>,
    /// The text the user typed.
    pub raw_query: String,
    /// Every record from every successful source, in source order.
    pub all_records: Vec<FlightRecord>,
    /// Lowest-priced record; earliest wins ties.
    pub cheapest: Option<FlightRecord>,
    /// Sources that produced records, in source order.
    pub sources_succeeded: Vec<SourceId>,
    /// Ordered error log.
    pub errors: Vec<String>,
    /// Coarse classification.
    pub status: ReportStatus,
    /// Number of records in `all_records`.
    pub total_results: usize,
    /// When the report was built.
    pub generated_at: DateTime<Utc>,
}

impl ComparisonReport {
    /// Returns true if the report has a cheapest flight.
    pub fn has_result(&self) -> bool {
        self.cheapest.is_some()
    }

    /// Returns all records sorted by price, cheapest first.
    ///
    /// The sort is stable, so equal prices keep source order.
    pub fn records_by_price(&self) -> Vec<&FlightRecord> {
        let mut records: Vec<&FlightRecord> = self.all_records.iter().collect();
        records.sort_by_key(|r| r.price);
        records
    }

    /// Returns the records from one source.
    pub fn records_from(&self, source: SourceId) -> impl Iterator<Item = &FlightRecord> {
        self.all_records.iter().filter(move |r| r.source == source)
    }
}
