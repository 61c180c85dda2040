//! Cleartrip extraction rules.

use farescout_fetch::{ExactSelector, Extractor, FieldRules, MarkedContainers, TextAnchor};

/// Cards examined per page.
pub const MAX_CANDIDATES: usize = 10;

/// Known card class as of the last markup change.
const CARD_SELECTOR: &str = "div.sc-aXZVg.bCDQyH.pt-1.flex.flex-between.pl-6";

/// Builds the Cleartrip extractor.
pub fn cleartrip_extractor() -> Extractor {
    let rules = FieldRules {
        flight_code_selector: Some("p, span, div"),
        ..FieldRules::default()
    };

    Extractor::new(rules, MAX_CANDIDATES)
        .with_strategy(ExactSelector::new(CARD_SELECTOR))
        .with_strategy(
            MarkedContainers::new(r#"div[class*="sc-aXZVg"]"#)
                .with_class_fragments(&["flex", "between"]),
        )
        .with_strategy(TextAnchor::new("Flight Details"))
}
