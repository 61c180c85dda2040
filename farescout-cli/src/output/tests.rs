//! CLI output formatting tests.

#[cfg(test)]
mod text_formatter_tests {
    use chrono::{NaiveDate, Utc};
    use farescout_core::{
        ComparisonReport, FlightQuery, FlightRecord, Price, ReportStatus, SourceId,
    };

    use super::super::text::TextFormatter;

    fn record(source: SourceId, airline: &str, price: u32) -> FlightRecord {
        FlightRecord {
            airline: airline.to_string(),
            flight_code: Some("6E-2134".to_string()),
            price: Price::from(price),
            departure_time: Some("06:05".parse().unwrap()),
            arrival_time: Some("08:15".parse().unwrap()),
            duration_minutes: Some(130),
            stop_count: 0,
            source,
            booking_reference: "https://www.cleartrip.com/flights/results?from=DEL".to_string(),
            departure_city: Some("New Delhi".to_string()),
            arrival_city: Some("Mumbai".to_string()),
            scraped_at: Utc::now(),
        }
    }

    fn report(records: Vec<FlightRecord>, status: ReportStatus, errors: Vec<String>) -> ComparisonReport {
        let query = FlightQuery::new(
            "DEL".parse().unwrap(),
            "BOM".parse().unwrap(),
            NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(),
            "delhi to mumbai on 2 nov",
        );
        let cheapest = records.iter().min_by_key(|r| r.price).cloned();
        let mut sources: Vec<SourceId> = records.iter().map(|r| r.source).collect();
        sources.dedup();
        ComparisonReport {
            query: Some(query),
            raw_query: "delhi to mumbai on 2 nov".to_string(),
            total_results: records.len(),
            all_records: records,
            cheapest,
            sources_succeeded: sources,
            errors,
            status,
            generated_at: Utc::now(),
        }
    }

    #[test]
    fn test_found_report_without_colors() {
        let formatter = TextFormatter::new(false);
        let report = report(
            vec![
                record(SourceId::MakeMyTrip, "IndiGo", 4210),
                record(SourceId::Cleartrip, "Akasa Air", 3998),
            ],
            ReportStatus::Found,
            vec!["EMT: Timeout 60000ms exceeded navigating to https://flight.easemytrip.com/".to_string()],
        );

        let output = formatter.format_report(&report, 10);

        assert!(output.contains("Query:  DEL → BOM on 2026-11-02"));
        assert!(output.contains("Sources: MakeMyTrip, Cleartrip"));
        assert!(output.contains("Results: 2 flights"));
        assert!(output.contains("Airline:   Akasa Air (6E-2134)"));
        assert!(output.contains("Price:     ₹3,998"));
        assert!(output.contains("Departure: 06:05 New Delhi"));
        assert!(output.contains("Duration:  2h 10m"));
        assert!(output.contains("Stops:     Non-stop"));
        assert!(output.contains("All flights (2 of 2)"));
        assert!(output.contains("• EMT: Timeout 60000ms"));
        assert!(!output.contains('\x1b'));

        // Ranked list is cheapest first.
        let akasa = output.rfind("Akasa Air").unwrap();
        let indigo = output.rfind("IndiGo").unwrap();
        assert!(akasa < indigo);
    }

    #[test]
    fn test_top_limits_listing() {
        let formatter = TextFormatter::new(false);
        let records = (0..5)
            .map(|i| record(SourceId::EaseMyTrip, "SpiceJet", 4000 + i))
            .collect();
        let output = formatter.format_report(&report(records, ReportStatus::Found, vec![]), 3);
        assert!(output.contains("All flights (3 of 5)"));
        assert!(!output.contains("₹4,004"));
    }

    #[test]
    fn test_no_result_statuses() {
        let formatter = TextFormatter::new(false);
        let failed = report(
            vec![],
            ReportStatus::AllSourcesFailed,
            vec!["MMT: blocked".to_string()],
        );
        let output = formatter.format_report(&failed, 10);
        assert!(output.contains("Every source failed"));
        assert!(output.contains("Sources: none"));
        assert!(!output.contains("Cheapest flight"));

        let mut uninterpreted = report(vec![], ReportStatus::InterpreterFailed, vec![]);
        uninterpreted.query = None;
        uninterpreted.raw_query = "book me something".to_string();
        let output = formatter.format_report(&uninterpreted, 10);
        assert!(output.contains("Query:  book me something"));
        assert!(output.contains("Could not understand the query"));
        assert!(!output.contains("Sources:"));
    }

    #[test]
    fn test_colors_applied() {
        let formatter = TextFormatter::new(true);
        let output = formatter.format_report(
            &report(vec![record(SourceId::Cleartrip, "IndiGo", 4200)], ReportStatus::Found, vec![]),
            10,
        );
        assert!(output.contains("\x1b[32m₹4,200\x1b[0m"));
    }

    #[test]
    fn test_record_line_without_code_or_arrival() {
        let formatter = TextFormatter::new(false);
        let mut r = record(SourceId::MakeMyTrip, "Unknown", 5100);
        r.flight_code = None;
        r.arrival_time = None;
        r.stop_count = 1;
        let line = formatter.format_record_line(&r);
        assert!(line.contains("₹5,100"));
        assert!(line.contains("Unknown"));
        assert!(line.contains("06:05 → ?"));
        assert!(line.contains("1 stop"));
        assert!(line.ends_with("MakeMyTrip"));
    }
}

#[cfg(test)]
mod json_formatter_tests {
    use farescout_sources::SourceRegistry;

    use super::super::json::JsonFormatter;

    #[test]
    fn test_sources_listing() {
        let formatter = JsonFormatter::new(false);
        let output = formatter.format_sources(SourceRegistry::all()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        let list = value.as_array().unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list[0]["name"], "MakeMyTrip");
        assert_eq!(list[0]["cliName"], "makemytrip");
        assert_eq!(list[0]["aliases"][0], "mmt");
        assert_eq!(list[2]["id"], "easemytrip");
        assert_eq!(list[1]["defaultEnabled"], true);
    }

    #[test]
    fn test_pretty_vs_compact() {
        let data = serde_json::json!({"a": 1});
        assert_eq!(JsonFormatter::new(false).format(&data).unwrap(), r#"{"a":1}"#);
        assert!(JsonFormatter::new(true).format(&data).unwrap().contains('\n'));
    }
}
