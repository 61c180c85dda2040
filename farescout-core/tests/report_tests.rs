//! Integration tests for report helpers.

use chrono::Utc;
use farescout_core::{
    ComparisonReport, FlightRecord, Price, ReportStatus, SourceId, SourceOutcome,
};

fn record(source: SourceId, price: u32, airline: &str) -> FlightRecord {
    FlightRecord {
        airline: airline.to_string(),
        flight_code: None,
        price: Price::from(price),
        departure_time: Some("10:00".parse().unwrap()),
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

#[test]
fn test_records_by_price_is_stable() {
    let records = vec![
        record(SourceId::MakeMyTrip, 5000, "IndiGo"),
        record(SourceId::Cleartrip, 4000, "Akasa Air"),
        record(SourceId::EaseMyTrip, 5000, "SpiceJet"),
    ];
    let report = ComparisonReport {
        query: None,
        raw_query: "x".to_string(),
        total_results: records.len(),
        cheapest: Some(records[1].clone()),
        all_records: records,
        sources_succeeded: SourceId::all().to_vec(),
        errors: Vec::new(),
        status: ReportStatus::Found,
        generated_at: Utc::now(),
    };

    let airlines: Vec<&str> = report
        .records_by_price()
        .iter()
        .map(|r| r.airline.as_str())
        .collect();
    assert_eq!(airlines, vec!["Akasa Air", "IndiGo", "SpiceJet"]);
    assert_eq!(report.records_from(SourceId::EaseMyTrip).count(), 1);
    assert!(report.has_result());
    assert!(report.status.is_found());
}

#[test]
fn test_outcome_success_keeps_records() {
    let outcome = SourceOutcome::success(
        SourceId::MakeMyTrip,
        vec![record(SourceId::MakeMyTrip, 3100, "Air India")],
    );
    assert!(outcome.succeeded);
    assert_eq!(outcome.records.len(), 1);
    assert!(outcome.error_entry().is_none());
}

#[test]
fn test_record_labels() {
    let mut r = record(SourceId::Cleartrip, 4500, "Vistara");
    r.duration_minutes = Some(135);
    assert_eq!(r.duration_label().as_deref(), Some("2h 15m"));
    assert_eq!(r.stops_label(), "Non-stop");
    r.stop_count = 2;
    assert_eq!(r.stops_label(), "2 stops");
    assert!(r.validate().is_ok());
}
