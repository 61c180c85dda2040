//! Merge and rank.
//!
//! Turns an [`OrchestratorRun`] into the final [`ComparisonReport`]. Never
//! fails: an empty run still yields a well-formed report.

use chrono::Utc;
use tracing::debug;

use farescout_core::{
    ComparisonReport, FailureKind, FlightQuery, FlightRecord, InterpretError, NO_USABLE_RESULT,
    ReportStatus,
};

use crate::pipeline::OrchestratorRun;

/// Builds the report for a query that reached the sources.
///
/// Records are concatenated in orchestrator order. The cheapest record is
/// picked by strict price comparison, so the earliest one wins ties.
pub fn aggregate(query: &FlightQuery, run: &OrchestratorRun) -> ComparisonReport {
    let all_records: Vec<FlightRecord> = run
        .outcomes
        .iter()
        .filter(|o| o.succeeded)
        .flat_map(|o| o.records.iter().cloned())
        .collect();

    let cheapest = cheapest_of(&all_records).cloned();
    let mut errors = run.errors.clone();

    let status = if cheapest.is_some() {
        ReportStatus::Found
    } else {
        errors.push(NO_USABLE_RESULT.to_string());
        // A source that loaded results but extracted nothing counts as "no flights".
        let reached_results = run
            .outcomes
            .iter()
            .any(|o| o.failure_kind == Some(FailureKind::NoRecordsExtracted));
        if run.all_failed() && !reached_results {
            ReportStatus::AllSourcesFailed
        } else {
            ReportStatus::NoFlights
        }
    };

    debug!(
        total = all_records.len(),
        cheapest = ?cheapest.as_ref().map(|r| r.price.amount()),
        status = ?status,
        "Aggregated results"
    );

    ComparisonReport {
        query: Some(query.clone()),
        raw_query: query.raw_text.clone(),
        total_results: all_records.len(),
        all_records,
        cheapest,
        sources_succeeded: run.succeeded_sources(),
        errors,
        status,
        generated_at: Utc::now(),
    }
}

/// Builds the report for a query the interpreter rejected.
///
/// Carries exactly one error entry and no records.
pub fn interpreter_failure_report(raw_query: &str, error: &InterpretError) -> ComparisonReport {
    ComparisonReport {
        query: None,
        raw_query: raw_query.to_string(),
        all_records: Vec::new(),
        cheapest: None,
        sources_succeeded: Vec::new(),
        errors: vec![format!("Interpreter: {error}")],
        status: ReportStatus::InterpreterFailed,
        total_results: 0,
        generated_at: Utc::now(),
    }
}

/// First record with the lowest price.
pub fn cheapest_of(records: &[FlightRecord]) -> Option<&FlightRecord> {
    let mut best: Option<&FlightRecord> = None;
    for record in records {
        if best.is_none_or(|b| record.price < b.price) {
            best = Some(record);
        }
    }
    best
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::NaiveDate;
    use farescout_core::{AirportCode, Price, SourceId, SourceOutcome};

    use super::*;

    fn query() -> FlightQuery {
        FlightQuery::new(
            AirportCode::new("DEL").unwrap(),
            AirportCode::new("BOM").unwrap(),
            NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(),
            "delhi to mumbai on 2 november",
        )
    }

    fn record(source: SourceId, price: u32, airline: &str) -> FlightRecord {
        FlightRecord {
            airline: airline.to_string(),
            flight_code: None,
            price: Price::from(price),
            departure_time: Some("09:00".parse().unwrap()),
            arrival_time: None,
            duration_minutes: None,
            stop_count: 0,
            source,
            booking_reference: String::new(),
            departure_city: None,
            arrival_city: None,
            scraped_at: Utc::now(),
        }
    }

    fn run(outcomes: Vec<SourceOutcome>) -> OrchestratorRun {
        let errors = outcomes.iter().filter_map(SourceOutcome::error_entry).collect();
        OrchestratorRun {
            outcomes,
            attempts: Vec::new(),
            errors,
            duration: Duration::ZERO,
        }
    }

    #[test]
    fn test_tie_goes_to_earliest_record() {
        let run = run(vec![
            SourceOutcome::success(
                SourceId::MakeMyTrip,
                vec![record(SourceId::MakeMyTrip, 5000, "IndiGo")],
            ),
            SourceOutcome::success(
                SourceId::Cleartrip,
                vec![
                    record(SourceId::Cleartrip, 4000, "Akasa Air"),
                    record(SourceId::Cleartrip, 4500, "Vistara"),
                ],
            ),
            SourceOutcome::success(
                SourceId::EaseMyTrip,
                vec![record(SourceId::EaseMyTrip, 4000, "SpiceJet")],
            ),
        ]);

        let report = aggregate(&query(), &run);
        let cheapest = report.cheapest.unwrap();
        assert_eq!(cheapest.airline, "Akasa Air");
        assert_eq!(cheapest.source, SourceId::Cleartrip);
        assert_eq!(report.total_results, 4);
        assert_eq!(report.status, ReportStatus::Found);
        assert!(report.errors.is_empty());
        assert_eq!(report.all_records[0].airline, "IndiGo");
    }

    #[test]
    fn test_failed_outcomes_contribute_errors_only() {
        let run = run(vec![
            SourceOutcome::failure(
                SourceId::MakeMyTrip,
                FailureKind::NavigationTimeout,
                "Timeout 100000ms exceeded navigating to https://www.makemytrip.com/",
            ),
            SourceOutcome::success(
                SourceId::Cleartrip,
                vec![record(SourceId::Cleartrip, 6100, "Air India")],
            ),
        ]);

        let report = aggregate(&query(), &run);
        assert_eq!(report.sources_succeeded, vec![SourceId::Cleartrip]);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].starts_with("MMT: Timeout"));
        assert_eq!(report.cheapest.unwrap().price, Price::from(6100));
    }

    #[test]
    fn test_no_flights_when_a_source_loaded_results() {
        let run = run(vec![
            SourceOutcome::failure(SourceId::MakeMyTrip, FailureKind::Blocked, "Blocked"),
            SourceOutcome::success(SourceId::Cleartrip, Vec::new()),
        ]);

        let report = aggregate(&query(), &run);
        assert!(report.cheapest.is_none());
        assert!(report.all_records.is_empty());
        assert!(report.sources_succeeded.is_empty());
        assert_eq!(report.status, ReportStatus::NoFlights);
        assert_eq!(
            report.errors,
            vec![
                "MMT: Blocked".to_string(),
                "Cleartrip: No flights extracted".to_string(),
                NO_USABLE_RESULT.to_string(),
            ]
        );
    }

    #[test]
    fn test_all_sources_failed() {
        let run = run(vec![
            SourceOutcome::failure(SourceId::MakeMyTrip, FailureKind::NavigationTimeout, "t1"),
            SourceOutcome::failure(SourceId::Cleartrip, FailureKind::ResultsWaitTimeout, "t2"),
            SourceOutcome::failure(SourceId::EaseMyTrip, FailureKind::UnexpectedAdapterFailure, "x"),
        ]);

        let report = aggregate(&query(), &run);
        assert_eq!(report.status, ReportStatus::AllSourcesFailed);
        assert_eq!(report.errors.len(), 4);
        assert_eq!(report.errors.last().map(String::as_str), Some(NO_USABLE_RESULT));
    }

    #[test]
    fn test_empty_run_is_well_formed() {
        let report = aggregate(&query(), &run(Vec::new()));
        assert_eq!(report.status, ReportStatus::NoFlights);
        assert_eq!(report.errors, vec![NO_USABLE_RESULT.to_string()]);
        assert_eq!(report.raw_query, "delhi to mumbai on 2 november");
    }

    #[test]
    fn test_interpreter_failure_report() {
        let err = InterpretError::MissingDate("delhi to mumbai".to_string());
        let report = interpreter_failure_report("delhi to mumbai", &err);
        assert!(report.query.is_none());
        assert!(report.cheapest.is_none());
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].starts_with("Interpreter:"));
        assert_eq!(report.status, ReportStatus::InterpreterFailed);
    }

    #[test]
    fn test_cheapest_of_empty() {
        assert!(cheapest_of(&[]).is_none());
    }
}
