//! MakeMyTrip extraction rules.

use farescout_fetch::{ExactSelector, Extractor, FieldRules};

/// Cards examined per page.
pub const MAX_CANDIDATES: usize = 5;

/// Builds the MakeMyTrip extractor.
pub fn makemytrip_extractor() -> Extractor {
    let rules = FieldRules {
        airline_selector: Some(r#"p.boldFont.blackText.airlineName, [data-test*="airline"]"#),
        flight_code_selector: Some("p.fliCode"),
        time_selector: Some(
            r#"p.blackText, p.latoBlack, span.blackText, div.blackText, p.fontSize14, p.fontSize16, p.fontSize18, [class*="time"], [class*="Time"]"#,
        ),
        price_selector: Some("span.fontSize18.blackFont"),
        city_selector: Some(".darkText, .appendBottom3"),
        ..FieldRules::default()
    };

    Extractor::new(rules, MAX_CANDIDATES).with_strategy(ExactSelector::new(".listingCard"))
}
