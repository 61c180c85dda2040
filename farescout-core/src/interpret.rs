//! Pattern-based query interpreter.
//!
//! Understands phrasings such as:
//!
//! - `flight from delhi to chennai on 12 March`
//! - `Mumbai to Goa 2026-11-03`
//! - `BLR → DEL on March 5th 2027`
//! - `cheapest flight from pune to jaipur tomorrow`
//!
//! Year-less dates resolve to the next occurrence on or after "today".

use std::sync::{Arc, LazyLock};

use chrono::{Datelike, Duration, Local, NaiveDate};
use regex::Regex;
use tracing::debug;

use crate::airports::AirportTable;
use crate::error::InterpretError;
use crate::models::{AirportCode, FlightQuery};
use crate::traits::QueryInterpreter;

/// `from X to Y`, stopping at a date-ish word, a digit or punctuation.
static FROM_TO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\bfrom\s+([a-z][a-z .'-]*?)\s+(?:to|→|->)\s+([a-z][a-z .'-]*?)(?:\s+(?:on|for|tomorrow|today|next|in)\b|\s+\d|[,.?!]|$)",
    )
    .expect("Invalid regex")
});

/// `to Y from X`, the destination named first.
static TO_FROM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\bto\s+([a-z][a-z .'-]*?)\s+from\s+([a-z][a-z .'-]*?)(?:\s+(?:on|for|tomorrow|today|next|in)\b|\s+\d|[,.?!]|$)",
    )
    .expect("Invalid regex")
});

/// A standalone `from` or `to`.
static ROLE_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(from|to)\b").expect("Invalid regex"));

/// `X to Y` without a leading "from"; both sides single words.
static BARE_TO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b([a-z]{3,})\s+(?:to|→|->)\s+([a-z]{3,})\b").expect("Invalid regex")
});

/// `2026-03-12`
static ISO_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b").expect("Invalid regex")
});

/// `12/03/2026` (day first)
static DMY_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b").expect("Invalid regex")
});

/// `12 March`, `12th Mar 2027`
static DAY_MONTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(\d{1,2})(?:st|nd|rd|th)?\s+(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?(?:,?\s+(\d{4}))?\b",
    )
    .expect("Invalid regex")
});

/// `March 12`, `Mar 12th, 2027`
static MONTH_DAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+(\d{1,2})(?:st|nd|rd|th)?(?:,?\s+(\d{4}))?\b",
    )
    .expect("Invalid regex")
});

// ============================================================================
// Pattern Interpreter
// ============================================================================

/// A deterministic, offline [`QueryInterpreter`].
#[derive(Debug, Clone)]
pub struct PatternInterpreter {
    airports: Arc<AirportTable>,
    today: Option<NaiveDate>,
}

impl PatternInterpreter {
    /// Creates an interpreter that resolves cities through `airports` and
    /// uses the local calendar date as "today".
    pub fn new(airports: Arc<AirportTable>) -> Self {
        Self {
            airports,
            today: None,
        }
    }

    /// Pins "today" to a fixed date.
    #[must_use]
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Parses `text` synchronously.
    ///
    /// # Errors
    ///
    /// Returns an [`InterpretError`] naming the first missing piece.
    pub fn parse(&self, text: &str) -> Result<FlightQuery, InterpretError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(InterpretError::Empty);
        }

        let (origin, destination) = self.parse_route(trimmed)?;
        if origin == destination {
            return Err(InterpretError::SameAirport(origin.to_string()));
        }

        let date = self
            .parse_date(trimmed)
            .ok_or_else(|| InterpretError::MissingDate(trimmed.to_string()))?;

        debug!(%origin, %destination, %date, "Interpreted query");
        Ok(FlightQuery::new(origin, destination, date, trimmed))
    }

    fn parse_route(&self, text: &str) -> Result<(AirportCode, AirportCode), InterpretError> {
        if let Some(caps) = FROM_TO_RE.captures(text) {
            let origin = self.resolve_place(&caps[1], true);
            let destination = self.resolve_place(&caps[2], true);
            if let (Some(o), Some(d)) = (origin, destination) {
                return Ok((o, d));
            }
        }

        if let Some(caps) = TO_FROM_RE.captures(text) {
            let destination = self.resolve_place(&caps[1], true);
            let origin = self.resolve_place(&caps[2], true);
            if let (Some(o), Some(d)) = (origin, destination) {
                return Ok((o, d));
            }
        }

        if let Some(caps) = BARE_TO_RE.captures(text) {
            let origin = self.resolve_place(&caps[1], false);
            let destination = self.resolve_place(&caps[2], false);
            if let (Some(o), Some(d)) = (origin, destination) {
                return Ok((o, d));
            }
        }

        self.route_from_mentions(text)
    }

    /// Picks the route out of every known city in `text`.
    ///
    /// A city right after `from` is the origin and one right after `to` is the
    /// destination. Cities with no such word fill whichever role is still
    /// open, in reading order.
    fn route_from_mentions(&self, text: &str) -> Result<(AirportCode, AirportCode), InterpretError> {
        let lower = text.to_lowercase();
        let hits = self.airports.find_cities(text);
        let role_words: Vec<(usize, bool)> = ROLE_WORD_RE
            .captures_iter(&lower)
            .filter_map(|caps| caps.get(1))
            .map(|m| (m.start(), m.as_str() == "from"))
            .collect();

        let mut origin: Option<&AirportCode> = None;
        let mut destination: Option<&AirportCode> = None;
        let mut unassigned: Vec<&AirportCode> = Vec::new();

        for (pos, _, code) in &hits {
            // Only a role word between the previous city and this one counts.
            let previous_end = hits
                .iter()
                .filter(|(other, city, _)| other + city.len() <= *pos)
                .map(|(other, city, _)| other + city.len())
                .max()
                .unwrap_or(0);
            let role = role_words
                .iter()
                .rev()
                .find(|(word_pos, _)| *word_pos >= previous_end && word_pos < pos)
                .map(|(_, is_from)| *is_from);

            match role {
                Some(true) if origin.is_none() => origin = Some(*code),
                Some(false) if destination.is_none() => destination = Some(*code),
                _ => unassigned.push(*code),
            }
        }

        let mut rest = unassigned.into_iter();
        let origin = origin
            .or_else(|| rest.next())
            .ok_or_else(|| InterpretError::MissingOrigin(text.to_string()))?;
        let destination = destination
            .or_else(|| rest.next())
            .ok_or_else(|| InterpretError::MissingDestination(text.to_string()))?;
        Ok((origin.clone(), destination.clone()))
    }

    /// With `guess`, any single unknown word falls back to a guessed code.
    /// Without it, only an uppercase three-letter code is accepted.
    fn resolve_place(&self, place: &str, guess: bool) -> Option<AirportCode> {
        let place = place.trim();
        if let Some((_, _, code)) = self.airports.find_cities(place).first() {
            return Some((*code).clone());
        }
        let looks_like_code = place.len() == 3 && place.chars().all(|c| c.is_ascii_uppercase());
        if looks_like_code || (guess && place.split_whitespace().count() == 1) {
            return self.airports.resolve_code(place).ok();
        }
        None
    }

    fn parse_date(&self, text: &str) -> Option<NaiveDate> {
        let today = self.today();
        let lower = text.to_lowercase();

        if let Some(caps) = ISO_DATE_RE.captures(text) {
            return NaiveDate::from_ymd_opt(
                caps[1].parse().ok()?,
                caps[2].parse().ok()?,
                caps[3].parse().ok()?,
            );
        }

        if let Some(caps) = DMY_DATE_RE.captures(text) {
            return NaiveDate::from_ymd_opt(
                caps[3].parse().ok()?,
                caps[2].parse().ok()?,
                caps[1].parse().ok()?,
            );
        }

        if let Some(caps) = DAY_MONTH_RE.captures(text) {
            let day: u32 = caps[1].parse().ok()?;
            let month = month_number(&caps[2])?;
            let year = caps.get(3).and_then(|m| m.as_str().parse().ok());
            return resolve_calendar_date(today, year, month, day);
        }

        if let Some(caps) = MONTH_DAY_RE.captures(text) {
            let month = month_number(&caps[1])?;
            let day: u32 = caps[2].parse().ok()?;
            let year = caps.get(3).and_then(|m| m.as_str().parse().ok());
            return resolve_calendar_date(today, year, month, day);
        }

        if lower.contains("day after tomorrow") {
            return Some(today + Duration::days(2));
        }
        if lower.contains("tomorrow") {
            return Some(today + Duration::days(1));
        }
        if lower.contains("today") || lower.contains("tonight") {
            return Some(today);
        }

        None
    }
}

impl QueryInterpreter for PatternInterpreter {
    fn name(&self) -> &str {
        "pattern"
    }

    fn interpret(
        &self,
        text: &str,
    ) -> impl std::future::Future<Output = Result<FlightQuery, InterpretError>> + Send {
        std::future::ready(self.parse(text))
    }
}

fn month_number(name: &str) -> Option<u32> {
    let prefix = name.get(..3)?.to_ascii_lowercase();
    let month = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

/// An explicit year is taken as-is. Without one, the date rolls forward to
/// the next occurrence on or after `today`.
fn resolve_calendar_date(
    today: NaiveDate,
    year: Option<i32>,
    month: u32,
    day: u32,
) -> Option<NaiveDate> {
    if let Some(year) = year {
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    let this_year = NaiveDate::from_ymd_opt(today.year(), month, day);
    match this_year {
        Some(date) if date >= today => Some(date),
        // Feb 29 may not exist this year; try the next few.
        _ => (1..=4).find_map(|offset| NaiveDate::from_ymd_opt(today.year() + offset, month, day)),
    }
}

// ============================================================================
// Tests
// ============================================================================
