//! Text patterns shared by the extraction strategies and field rules.

use std::sync::LazyLock;

use farescout_core::{ClockTime, Price};
use regex::Regex;
use rust_decimal::Decimal;

/// A flight number as printed inside running text, e.g. `6E-2134` or `QP1375`.
static FLIGHT_CODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Z0-9]{2})-?(\d{3,4})\b").expect("Invalid regex")
});

/// A whole element holding only a flight number, e.g. `IX 1463`.
static FLIGHT_CODE_ELEMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Z0-9]{2})[- ]?(\d{3,4})$").expect("Invalid regex")
});

/// Strict dashed flight number used by the container signature test.
static SIGNATURE_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z0-9]{2}-\d{3,4}").expect("Invalid regex"));

static CLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{2}):(\d{2})\b").expect("Invalid regex"));

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})\s*h\s*(\d{1,2})\s*m").expect("Invalid regex")
});

/// `₹ 4,200`, `Rs. 4200`, `INR 4,200.50`
static AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:₹|\bRs\.?|\bINR)\s*(\d[\d,]*(?:\.\d{1,2})?)").expect("Invalid regex")
});

static CURRENCY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"₹|\bRs\.?\s*\d|\bINR\s*\d").expect("Invalid regex"));

// ============================================================================
// Matchers
// ============================================================================

/// Finds the first flight number in running text, normalized to `XX-NNNN`.
pub fn find_flight_code(text: &str) -> Option<String> {
    FLIGHT_CODE_RE
        .captures(text)
        .map(|caps| format!("{}-{}", &caps[1], &caps[2]))
}

/// Parses an element text that is exactly a flight number.
pub fn parse_flight_code(text: &str) -> Option<String> {
    FLIGHT_CODE_ELEMENT_RE
        .captures(text.trim())
        .map(|caps| format!("{}-{}", &caps[1], &caps[2]))
}

/// Every valid `HH:MM` time in text order. Out-of-range values are skipped.
pub fn find_times(text: &str) -> Vec<ClockTime> {
    CLOCK_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let hour = caps[1].parse().ok()?;
            let minute = caps[2].parse().ok()?;
            ClockTime::new(hour, minute).ok()
        })
        .collect()
}

/// Parses an element text that is exactly one `HH:MM` time.
pub fn parse_time(text: &str) -> Option<ClockTime> {
    let trimmed = text.trim();
    if trimmed.len() == 5 {
        trimmed.parse().ok()
    } else {
        None
    }
}

/// Finds the first duration such as `2h 15m` and returns minutes.
pub fn find_duration_minutes(text: &str) -> Option<u32> {
    let caps = DURATION_RE.captures(text)?;
    let hours: u32 = caps[1].parse().ok()?;
    let minutes: u32 = caps[2].parse().ok()?;
    (minutes < 60).then_some(hours * 60 + minutes)
}

/// Reads the stop count from keywords. `None` when no keyword is present.
pub fn find_stops(text: &str) -> Option<u8> {
    let lower = text.to_lowercase();
    if ["non-stop", "nonstop", "non stop"].iter().any(|k| lower.contains(k)) {
        Some(0)
    } else if lower.contains("1 stop") || lower.contains("1-stop") {
        Some(1)
    } else if lower.contains("2 stop") || lower.contains("2-stop") {
        Some(2)
    } else {
        None
    }
}

/// Parses a bare amount such as `4,200` or `4200.50`.
pub fn parse_amount(text: &str) -> Option<Decimal> {
    let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
    cleaned.parse::<Decimal>().ok()
}

/// Every currency-prefixed amount in text order.
pub fn find_amounts(text: &str) -> Vec<Decimal> {
    AMOUNT_RE
        .captures_iter(text)
        .filter_map(|caps| parse_amount(&caps[1]))
        .collect()
}

/// The first currency amount inside the plausible fare bound.
pub fn first_plausible_price(text: &str) -> Option<Price> {
    find_amounts(text).into_iter().find_map(Price::plausible)
}

/// Returns true if text looks like one flight row: a dashed flight number,
/// a clock time and a currency amount.
pub fn has_flight_signature(text: &str) -> bool {
    SIGNATURE_CODE_RE.is_match(text) && CLOCK_RE.is_match(text) && CURRENCY_RE.is_match(text)
}

// ============================================================================
// Tests
// ============================================================================
