//! Candidate-container strategies.
//!
//! Each strategy is a pure function from a document to the elements it
//! believes are flight rows. The [`Extractor`](super::Extractor) tries them in
//! order and keeps the first non-empty answer.

use scraper::ElementRef;

use super::ExtractionStrategy;
use super::patterns::{find_times, has_flight_signature};
use crate::document::{
    Document, class_contains_all, element_ancestors, element_text, first_within, is_descendant,
    own_text, select_within,
};

/// Default ancestor walk for [`TextAnchor`].
pub const DEFAULT_ANCHOR_DEPTH: usize = 5;

/// Default ancestor walk for [`PriceAttributeAnchor`].
pub const DEFAULT_PRICE_ANCHOR_DEPTH: usize = 15;

// ============================================================================
// Exact Selector
// ============================================================================

/// Every element matching a known flight-row selector.
#[derive(Debug, Clone)]
pub struct ExactSelector {
    selector: &'static str,
}

impl ExactSelector {
    /// Creates the strategy.
    pub fn new(selector: &'static str) -> Self {
        Self { selector }
    }
}

impl ExtractionStrategy for ExactSelector {
    fn name(&self) -> &str {
        "exact_selector"
    }

    fn candidates<'a>(&self, doc: &'a Document) -> Vec<ElementRef<'a>> {
        doc.select(self.selector)
    }
}

// ============================================================================
// Marked Containers
// ============================================================================

/// Generic marker elements whose text looks like a flight row.
///
/// Only outermost matches are kept, so a row and its own inner wrapper are
/// never both returned.
#[derive(Debug, Clone)]
pub struct MarkedContainers {
    marker: &'static str,
    class_fragments: &'static [&'static str],
}

impl MarkedContainers {
    /// Creates the strategy for a marker selector.
    pub fn new(marker: &'static str) -> Self {
        Self {
            marker,
            class_fragments: &[],
        }
    }

    /// Additionally requires every fragment in the `class` attribute.
    #[must_use]
    pub fn with_class_fragments(mut self, fragments: &'static [&'static str]) -> Self {
        self.class_fragments = fragments;
        self
    }
}

impl ExtractionStrategy for MarkedContainers {
    fn name(&self) -> &str {
        "marked_containers"
    }

    fn candidates<'a>(&self, doc: &'a Document) -> Vec<ElementRef<'a>> {
        let matching: Vec<ElementRef<'a>> = doc
            .select(self.marker)
            .into_iter()
            .filter(|el| class_contains_all(*el, self.class_fragments))
            .filter(|el| has_flight_signature(&element_text(*el)))
            .collect();

        matching
            .iter()
            .copied()
            .filter(|candidate| {
                !matching
                    .iter()
                    .any(|other| is_descendant(*other, *candidate))
            })
            .collect()
    }
}

// ============================================================================
// Text Anchor
// ============================================================================

/// Rows found by walking up from a label such as `Flight Details`.
///
/// A candidate that contains, or is contained by, an earlier candidate is
/// dropped.
#[derive(Debug, Clone)]
pub struct TextAnchor {
    phrase: &'static str,
    max_depth: usize,
}

impl TextAnchor {
    /// Creates the strategy with the default walk depth.
    pub fn new(phrase: &'static str) -> Self {
        Self {
            phrase,
            max_depth: DEFAULT_ANCHOR_DEPTH,
        }
    }

    /// Overrides how many ancestors are inspected.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl ExtractionStrategy for TextAnchor {
    fn name(&self) -> &str {
        "text_anchor"
    }

    fn candidates<'a>(&self, doc: &'a Document) -> Vec<ElementRef<'a>> {
        let mut kept: Vec<ElementRef<'a>> = Vec::new();

        let anchors = doc
            .root()
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|el| own_text(*el).contains(self.phrase));

        for anchor in anchors {
            let row = element_ancestors(anchor, self.max_depth)
                .into_iter()
                .find(|ancestor| has_flight_signature(&element_text(*ancestor)));

            let Some(row) = row else { continue };
            let overlaps = kept.iter().any(|existing| {
                existing.id() == row.id()
                    || is_descendant(*existing, row)
                    || is_descendant(row, *existing)
            });
            if !overlaps {
                kept.push(row);
            }
        }

        kept
    }
}

// ============================================================================
// Price Attribute Anchor
// ============================================================================

/// Rows found by walking up from elements that carry a price attribute.
///
/// A row qualifies when it contains the airline element and at least two
/// clock times. The walk stops at the first ancestor that holds another
/// price element, so a list of rows is never mistaken for one row.
#[derive(Debug, Clone)]
pub struct PriceAttributeAnchor {
    anchor: &'static str,
    row_marker: &'static str,
    max_depth: usize,
}

impl PriceAttributeAnchor {
    /// Creates the strategy.
    ///
    /// `anchor` selects the price elements, `row_marker` must match something
    /// inside a qualifying row.
    pub fn new(anchor: &'static str, row_marker: &'static str) -> Self {
        Self {
            anchor,
            row_marker,
            max_depth: DEFAULT_PRICE_ANCHOR_DEPTH,
        }
    }

    /// Overrides how many ancestors are inspected.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl ExtractionStrategy for PriceAttributeAnchor {
    fn name(&self) -> &str {
        "price_attribute_anchor"
    }

    fn candidates<'a>(&self, doc: &'a Document) -> Vec<ElementRef<'a>> {
        let mut rows: Vec<ElementRef<'a>> = Vec::new();

        for anchor in doc.select(self.anchor) {
            let row = element_ancestors(anchor, self.max_depth)
                .into_iter()
                .take_while(|ancestor| select_within(*ancestor, self.anchor).len() == 1)
                .find(|ancestor| {
                    first_within(*ancestor, self.row_marker).is_some()
                        && find_times(&element_text(*ancestor)).len() >= 2
                });

            if let Some(row) = row {
                if !rows.iter().any(|existing| existing.id() == row.id()) {
                    rows.push(row);
                }
            }
        }

        rows
    }
}

// ============================================================================
// Tests
// ============================================================================
