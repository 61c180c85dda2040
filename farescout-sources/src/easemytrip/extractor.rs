//! EaseMyTrip extraction rules.

use farescout_fetch::{Extractor, FieldRules, PriceAttributeAnchor};

/// Rows examined per page.
pub const MAX_CANDIDATES: usize = 5;

const PRICE_SPAN: &str = r#"span[id^="spnPrice"][price]"#;
const AIRLINE_SPAN: &str = "span.txt-r4.ng-binding";

/// Builds the EaseMyTrip extractor.
pub fn easemytrip_extractor() -> Extractor {
    let rules = FieldRules {
        airline_selector: Some(AIRLINE_SPAN),
        flight_code_selector: Some("span.txt-r5"),
        price_attribute: Some((PRICE_SPAN, "price")),
        city_selector: Some(".txt-r3-n.ng-binding"),
        ..FieldRules::default()
    };

    Extractor::new(rules, MAX_CANDIDATES)
        .with_strategy(PriceAttributeAnchor::new(PRICE_SPAN, AIRLINE_SPAN))
}
