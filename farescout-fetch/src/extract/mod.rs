//! Heuristic flight extraction.
//!
//! An [`Extractor`] runs an ordered chain of [`ExtractionStrategy`]s to find
//! candidate containers, reads fields from each with [`FieldRules`], and
//! drops duplicates. It never fails: a page with nothing recognisable yields
//! an empty list.
//!
//! - [`strategies`] - Built-in container strategies
//! - [`fields`] - Per-container field rules
//! - [`patterns`] - Shared text patterns

pub mod fields;
pub mod patterns;
pub mod strategies;

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use scraper::ElementRef;
use tracing::{debug, trace};

use farescout_core::{ClockTime, FlightRecord, Price, SourceId};

use crate::document::Document;

pub use fields::{FieldRules, KNOWN_AIRLINES, KNOWN_CITIES};
pub use strategies::{ExactSelector, MarkedContainers, PriceAttributeAnchor, TextAnchor};

// ============================================================================
// Raw Match
// ============================================================================

/// A partially filled flight draft read from one container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawMatch {
    /// Airline name, if recognised.
    pub airline: Option<String>,
    /// Flight number, normalized to `XX-NNNN`.
    pub flight_code: Option<String>,
    /// First plausible fare.
    pub price: Option<Price>,
    /// Distinct clock times in document order.
    pub times: Vec<ClockTime>,
    /// Block time in minutes.
    pub duration_minutes: Option<u32>,
    /// Stop count; `None` when no stop keyword appeared.
    pub stops: Option<u8>,
    /// Departure city.
    pub departure_city: Option<String>,
    /// Arrival city.
    pub arrival_city: Option<String>,
    /// Collapsed text of the container.
    pub container_text: String,
}

impl RawMatch {
    /// First distinct time. Assumes the page prints departure first.
    pub fn departure_time(&self) -> Option<ClockTime> {
        self.times.first().copied()
    }

    /// Second distinct time. Assumes the page prints arrival second.
    pub fn arrival_time(&self) -> Option<ClockTime> {
        self.times.get(1).copied()
    }

    /// Returns true if the draft can become a [`FlightRecord`].
    pub fn is_usable(&self) -> bool {
        self.price.is_some() && !self.times.is_empty()
    }

    /// Key used to drop repeated rows within one extraction pass.
    pub fn identity_key(&self) -> (Option<String>, Option<Price>, Option<ClockTime>) {
        (self.flight_code.clone(), self.price, self.departure_time())
    }

    /// Converts a usable draft into a record.
    ///
    /// Missing airline becomes `"Unknown"`. A missing stop keyword is read as
    /// non-stop, which is a guess, so it is logged.
    pub fn into_record(
        self,
        source: SourceId,
        booking_reference: &str,
        scraped_at: DateTime<Utc>,
    ) -> Option<FlightRecord> {
        let departure_time = Some(self.departure_time()?);
        let arrival_time = self.arrival_time();
        let price = self.price?;

        let stop_count = self.stops.unwrap_or_else(|| {
            debug!(source = %source, "No stop keyword found, assuming non-stop");
            0
        });

        Some(FlightRecord {
            airline: self.airline.unwrap_or_else(|| "Unknown".to_string()),
            flight_code: self.flight_code,
            price,
            departure_time,
            arrival_time,
            duration_minutes: self.duration_minutes,
            stop_count,
            source,
            booking_reference: booking_reference.to_string(),
            departure_city: self.departure_city,
            arrival_city: self.arrival_city,
            scraped_at,
        })
    }
}

// ============================================================================
// Extraction Strategy
// ============================================================================

/// One way of locating candidate flight containers in a document.
pub trait ExtractionStrategy: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Returns candidate containers in document order.
    fn candidates<'a>(&self, doc: &'a Document) -> Vec<ElementRef<'a>>;
}

// ============================================================================
// Extractor
// ============================================================================

/// A strategy chain plus field rules and a candidate cap.
pub struct Extractor {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
    rules: FieldRules,
    max_candidates: usize,
}

impl Extractor {
    /// Creates an extractor with no strategies.
    pub fn new(rules: FieldRules, max_candidates: usize) -> Self {
        Self {
            strategies: Vec::new(),
            rules,
            max_candidates,
        }
    }

    /// Appends a strategy to the end of the chain.
    #[must_use]
    pub fn with_strategy(mut self, strategy: impl ExtractionStrategy + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    /// Overrides the candidate cap.
    #[must_use]
    pub fn with_max_candidates(mut self, max_candidates: usize) -> Self {
        self.max_candidates = max_candidates;
        self
    }

    /// Maximum number of containers examined per page.
    pub fn max_candidates(&self) -> usize {
        self.max_candidates
    }

    /// Strategy names in chain order.
    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Field rules in use.
    pub fn rules(&self) -> &FieldRules {
        &self.rules
    }

    /// Parses `content` and extracts drafts from it.
    pub fn extract_html(&self, content: &str) -> Vec<RawMatch> {
        self.extract_html_capped(content, self.max_candidates)
    }

    /// Like [`extract_html`](Self::extract_html) with a different cap.
    pub fn extract_html_capped(&self, content: &str, max_candidates: usize) -> Vec<RawMatch> {
        let doc = Document::parse(content);
        self.extract_capped(&doc, max_candidates)
    }

    /// Extracts drafts from a parsed document.
    ///
    /// The first strategy that returns any candidate wins. At most
    /// `max_candidates` containers are read; usable drafts that repeat an
    /// earlier identity key are dropped.
    pub fn extract(&self, doc: &Document) -> Vec<RawMatch> {
        self.extract_capped(doc, self.max_candidates)
    }

    fn extract_capped(&self, doc: &Document, max_candidates: usize) -> Vec<RawMatch> {
        let Some((name, candidates)) = self.first_candidates(doc) else {
            debug!("No strategy found candidate containers");
            return Vec::new();
        };

        debug!(strategy = name, count = candidates.len(), "Candidate containers found");

        let mut seen = HashSet::new();
        let mut matches = Vec::new();
        for container in candidates.into_iter().take(max_candidates) {
            let draft = self.rules.apply(container);
            if draft.is_usable() && !seen.insert(draft.identity_key()) {
                trace!(code = ?draft.flight_code, "Skipping duplicate row");
                continue;
            }
            matches.push(draft);
        }
        matches
    }

    fn first_candidates<'a>(&'a self, doc: &'a Document) -> Option<(&'a str, Vec<ElementRef<'a>>)> {
        self.strategies.iter().find_map(|strategy| {
            let found = strategy.candidates(doc);
            trace!(strategy = strategy.name(), count = found.len(), "Strategy tried");
            (!found.is_empty()).then(|| (strategy.name(), found))
        })
    }
}

impl std::fmt::Debug for Extractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extractor")
            .field("strategies", &self.strategy_names())
            .field("rules", &self.rules)
            .field("max_candidates", &self.max_candidates)
            .finish()
    }
}

#[cfg(test)]
mod tests;
