//! Strategy-chain tests for [`Extractor`].

use chrono::Utc;
use rust_decimal::Decimal;

use farescout_core::{MAX_PLAUSIBLE_PRICE, MIN_PLAUSIBLE_PRICE, SourceId};

use super::*;

fn row(id: &str, code: &str, dep: &str, arr: &str, price: &str) -> String {
    format!(
        r#"<div class="row" id="{id}"><span>IndiGo</span><span>{code}</span>
           <span>{dep}</span><span>{arr}</span><span>{price}</span>
           <a>Flight Details</a></div>"#
    )
}

fn chain(max: usize) -> Extractor {
    Extractor::new(FieldRules::default(), max)
        .with_strategy(ExactSelector::new("div.flight-card"))
        .with_strategy(TextAnchor::new("Flight Details"))
}

#[test]
fn test_first_non_empty_strategy_wins() {
    let html = format!(
        r#"<div class="flight-card">SG-8169 09:15 11:30 ₹3,450 SpiceJet</div>{}"#,
        row("r1", "6E-2134", "06:05", "08:50", "₹4,200")
    );
    let matches = chain(10).extract_html(&html);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].flight_code.as_deref(), Some("SG-8169"));
    assert_eq!(matches[0].airline.as_deref(), Some("SpiceJet"));
}

#[test]
fn test_falls_through_to_later_strategy() {
    let html = format!(
        "{}{}",
        row("r1", "6E-2134", "06:05", "08:50", "₹4,200"),
        row("r2", "AI-803", "10:00", "12:40", "₹5,100")
    );
    let matches = chain(10).extract_html(&html);
    let codes: Vec<_> = matches.iter().map(|m| m.flight_code.clone()).collect();
    assert_eq!(
        codes,
        vec![Some("6E-2134".to_string()), Some("AI-803".to_string())]
    );
}

#[test]
fn test_nothing_recognisable_is_empty() {
    let matches = chain(10).extract_html("<html><body><h1>Something went wrong</h1></body></html>");
    assert!(matches.is_empty());
    assert!(chain(10).extract_html("").is_empty());
}

#[test]
fn test_duplicates_dropped_within_one_pass() {
    let html = format!(
        "{}{}{}",
        row("r1", "6E-2134", "06:05", "08:50", "₹4,200"),
        row("r2", "6E-2134", "06:05", "08:50", "₹4,200"),
        row("r3", "6E-2134", "06:05", "08:50", "₹4,350")
    );
    let matches = chain(10).extract_html(&html);
    let prices: Vec<Decimal> = matches.iter().filter_map(|m| m.price).map(|p| p.amount()).collect();
    assert_eq!(prices, vec![Decimal::from(4200), Decimal::from(4350)]);
}

#[test]
fn test_candidate_cap() {
    let html: String = (0..8)
        .map(|i| row(&format!("r{i}"), &format!("6E-21{i:02}"), "06:05", "08:50", "₹4,200"))
        .collect();
    assert_eq!(chain(5).extract_html(&html).len(), 5);
    assert_eq!(chain(10).extract_html(&html).len(), 8);
    assert_eq!(chain(10).extract_html_capped(&html, 3).len(), 3);
}

#[test]
fn test_prices_never_leave_plausible_bound() {
    let html = [
        row("a", "6E-1001", "06:05", "08:50", "₹999"),
        row("b", "6E-1002", "07:05", "09:50", "₹150,001"),
        row("c", "6E-1003", "08:05", "10:50", "₹1,000"),
        row("d", "6E-1004", "09:05", "11:50", "₹150,000"),
        row("e", "6E-1005", "10:05", "12:50", "₹45 ₹0 ₹9,99,99,999"),
    ]
    .concat();

    let min = Decimal::from(MIN_PLAUSIBLE_PRICE);
    let max = Decimal::from(MAX_PLAUSIBLE_PRICE);
    let now = Utc::now();
    let records: Vec<_> = chain(10)
        .extract_html(&html)
        .into_iter()
        .filter_map(|m| m.into_record(SourceId::Cleartrip, "https://example.com", now))
        .collect();

    assert_eq!(records.len(), 2);
    for record in &records {
        assert!(record.price.amount() >= min && record.price.amount() <= max);
    }
}

#[test]
fn test_into_record_requires_price_and_departure() {
    let now = Utc::now();
    let no_price = RawMatch {
        times: vec!["06:05".parse().unwrap()],
        ..RawMatch::default()
    };
    assert!(no_price.into_record(SourceId::MakeMyTrip, "", now).is_none());

    let no_time = RawMatch {
        price: Price::plausible(Decimal::from(4200)),
        ..RawMatch::default()
    };
    assert!(no_time.into_record(SourceId::MakeMyTrip, "", now).is_none());

    let ok = RawMatch {
        price: Price::plausible(Decimal::from(4200)),
        times: vec!["06:05".parse().unwrap()],
        ..RawMatch::default()
    };
    let record = ok.into_record(SourceId::MakeMyTrip, "https://mmt", now).unwrap();
    assert_eq!(record.airline, "Unknown");
    assert_eq!(record.stop_count, 0);
    assert!(record.arrival_time.is_none());
    assert_eq!(record.booking_reference, "https://mmt");
}
