//! Per-container field rules.
//!
//! Each field is read independently from one candidate container: a
//! dedicated sub-element first when the site has one, then a scan of the
//! container's text.

use scraper::ElementRef;

use farescout_core::Price;

use super::RawMatch;
use super::patterns;
use crate::document::{element_text, first_within, select_within};

/// Airline needles in match order, paired with the canonical name.
///
/// `Air India Express` must come before `Air India`.
pub const KNOWN_AIRLINES: &[(&str, &str)] = &[
    ("IndiGo", "IndiGo"),
    ("Air India Express", "Air India Express"),
    ("Air India", "Air India"),
    ("Vistara", "Vistara"),
    ("Akasa", "Akasa Air"),
    ("SpiceJet", "SpiceJet"),
    ("Go First", "Go First"),
    ("Alliance Air", "Alliance Air"),
    ("Star Air", "Star Air"),
];

/// City names recognised in running text.
pub const KNOWN_CITIES: &[&str] = &[
    "Delhi",
    "Mumbai",
    "Bangalore",
    "Bengaluru",
    "Chennai",
    "Kolkata",
    "Hyderabad",
    "Pune",
    "Ahmedabad",
    "Goa",
    "Jaipur",
    "Lucknow",
    "Kochi",
];

// ============================================================================
// Field Rules
// ============================================================================

/// Where to find each field inside a candidate container.
#[derive(Debug, Clone, Copy)]
pub struct FieldRules {
    /// Dedicated airline element.
    pub airline_selector: Option<&'static str>,
    /// Dedicated flight-number element.
    pub flight_code_selector: Option<&'static str>,
    /// Elements that each hold exactly one `HH:MM` time.
    pub time_selector: Option<&'static str>,
    /// Dedicated price element.
    pub price_selector: Option<&'static str>,
    /// `(selector, attribute)` of an element carrying a machine-readable price.
    pub price_attribute: Option<(&'static str, &'static str)>,
    /// Elements holding departure then arrival city.
    pub city_selector: Option<&'static str>,
    /// Airline needles for the text scan.
    pub airlines: &'static [(&'static str, &'static str)],
    /// City names for the text scan.
    pub cities: &'static [&'static str],
}

impl Default for FieldRules {
    fn default() -> Self {
        Self {
            airline_selector: None,
            flight_code_selector: None,
            time_selector: None,
            price_selector: None,
            price_attribute: None,
            city_selector: None,
            airlines: KNOWN_AIRLINES,
            cities: KNOWN_CITIES,
        }
    }
}

impl FieldRules {
    /// Reads every field from one container.
    pub fn apply(&self, container: ElementRef<'_>) -> RawMatch {
        let text = element_text(container);
        let (departure_city, arrival_city) = self.cities(container, &text);

        RawMatch {
            airline: self.airline(container, &text),
            flight_code: self.flight_code(container, &text),
            price: self.price(container, &text),
            times: self.times(container, &text),
            duration_minutes: patterns::find_duration_minutes(&text),
            stops: patterns::find_stops(&text),
            departure_city,
            arrival_city,
            container_text: text,
        }
    }

    fn airline(&self, container: ElementRef<'_>, text: &str) -> Option<String> {
        if let Some(sel) = self.airline_selector {
            let name = first_within(container, sel).map(element_text);
            if let Some(name) = name.filter(|n| !n.is_empty()) {
                return Some(name);
            }
        }
        self.airlines
            .iter()
            .find(|(needle, _)| text.contains(needle))
            .map(|(_, name)| (*name).to_string())
    }

    fn flight_code(&self, container: ElementRef<'_>, text: &str) -> Option<String> {
        if let Some(sel) = self.flight_code_selector {
            let code = select_within(container, sel)
                .into_iter()
                .find_map(|el| patterns::parse_flight_code(&element_text(el)));
            if code.is_some() {
                return code;
            }
        }
        patterns::find_flight_code(text)
    }

    /// First-seen order, duplicates removed.
    fn times(&self, container: ElementRef<'_>, text: &str) -> Vec<farescout_core::ClockTime> {
        let mut times = Vec::new();

        if let Some(sel) = self.time_selector {
            times.extend(
                select_within(container, sel)
                    .into_iter()
                    .filter_map(|el| patterns::parse_time(&element_text(el))),
            );
        }
        // Fewer than two from dedicated elements: fall back to the text.
        if times.len() < 2 {
            times.extend(patterns::find_times(text));
        }

        let mut unique = Vec::with_capacity(times.len());
        for time in times {
            if !unique.contains(&time) {
                unique.push(time);
            }
        }
        unique
    }

    fn price(&self, container: ElementRef<'_>, text: &str) -> Option<Price> {
        if let Some((sel, attr)) = self.price_attribute {
            let attr_price = first_within(container, sel)
                .and_then(|el| el.value().attr(attr))
                .and_then(patterns::parse_amount)
                .and_then(Price::plausible);
            if attr_price.is_some() {
                return attr_price;
            }
        }
        if let Some(sel) = self.price_selector {
            let element_price = first_within(container, sel).and_then(|el| {
                let inner = element_text(el);
                patterns::first_plausible_price(&inner)
                    .or_else(|| patterns::parse_amount(&inner).and_then(Price::plausible))
            });
            if element_price.is_some() {
                return element_price;
            }
        }
        patterns::first_plausible_price(text)
    }

    fn cities(&self, container: ElementRef<'_>, text: &str) -> (Option<String>, Option<String>) {
        if let Some(sel) = self.city_selector {
            let names: Vec<String> = select_within(container, sel)
                .into_iter()
                .map(element_text)
                .filter(|t| t.len() > 2 && patterns::find_times(t).is_empty())
                .collect();
            if names.len() >= 2 {
                return (Some(names[0].clone()), Some(names[1].clone()));
            }
        }

        // Known names in text order.
        let mut found: Vec<(usize, &str)> = self
            .cities
            .iter()
            .filter_map(|city| text.find(city).map(|pos| (pos, *city)))
            .collect();
        found.sort_by_key(|(pos, _)| *pos);
        match found.as_slice() {
            [(_, first), (_, second), ..] => (Some((*first).to_string()), Some((*second).to_string())),
            _ => (None, None),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use rust_decimal::Decimal;

    fn apply(rules: &FieldRules, html: &str) -> RawMatch {
        let doc = Document::parse(html);
        let card = doc.select(".card")[0];
        rules.apply(card)
    }

    #[test]
    fn test_text_scan_defaults() {
        let m = apply(
            &FieldRules::default(),
            r#"<div class="card">
                 <span>Air India Express</span><span>IX-1463</span>
                 <span>Delhi</span><span>21:40</span><span>2h 35m</span>
                 <span>00:15</span><span>Chennai</span><span>Non-stop</span>
                 <span>Save ₹300</span><span>₹5,842</span>
               </div>"#,
        );
        assert_eq!(m.airline.as_deref(), Some("Air India Express"));
        assert_eq!(m.flight_code.as_deref(), Some("IX-1463"));
        assert_eq!(m.price.unwrap().amount(), Decimal::from(5842));
        assert_eq!(m.departure_time().unwrap().to_string(), "21:40");
        assert_eq!(m.arrival_time().unwrap().to_string(), "00:15");
        assert_eq!(m.duration_minutes, Some(155));
        assert_eq!(m.stops, Some(0));
        assert_eq!(m.departure_city.as_deref(), Some("Delhi"));
        assert_eq!(m.arrival_city.as_deref(), Some("Chennai"));
    }

    #[test]
    fn test_dedicated_elements_win() {
        let rules = FieldRules {
            airline_selector: Some("p.airlineName"),
            flight_code_selector: Some("p.fliCode"),
            time_selector: Some("p.time"),
            price_selector: Some("span.fare"),
            city_selector: Some(".city"),
            ..FieldRules::default()
        };
        let m = apply(
            &rules,
            r#"<div class="card">
                 <p class="airlineName">Akasa Air</p><p class="fliCode">QP 1102</p>
                 <p class="time">07:10</p><p class="city">New Delhi</p>
                 <p class="time">09:55</p><p class="city">Bengaluru</p>
                 <span class="fare">₹ 4,410</span> <span>was ₹6,100</span>
                 <span>Flight 6E-2001 also shown</span>
               </div>"#,
        );
        assert_eq!(m.airline.as_deref(), Some("Akasa Air"));
        assert_eq!(m.flight_code.as_deref(), Some("QP-1102"));
        assert_eq!(m.price.unwrap().amount(), Decimal::from(4410));
        assert_eq!(m.times.len(), 2);
        assert_eq!(m.departure_city.as_deref(), Some("New Delhi"));
        assert_eq!(m.arrival_city.as_deref(), Some("Bengaluru"));
        assert_eq!(m.stops, None);
    }

    #[test]
    fn test_implausible_dedicated_price_falls_back_to_text() {
        let rules = FieldRules {
            price_selector: Some("span.fare"),
            ..FieldRules::default()
        };
        let m = apply(
            &rules,
            r#"<div class="card"><span class="fare">₹ 450</span><span>₹3,999</span></div>"#,
        );
        assert_eq!(m.price.unwrap().amount(), Decimal::from(3999));
    }

    #[test]
    fn test_price_attribute() {
        let rules = FieldRules {
            price_attribute: Some(("span[price]", "price")),
            ..FieldRules::default()
        };
        let m = apply(
            &rules,
            r#"<div class="card"><span id="spnPrice0" price="6123">6,123</span></div>"#,
        );
        assert_eq!(m.price.unwrap().amount(), Decimal::from(6123));
    }

    #[test]
    fn test_missing_everything() {
        let m = apply(&FieldRules::default(), r#"<div class="card">Sold out</div>"#);
        assert!(m.airline.is_none());
        assert!(m.flight_code.is_none());
        assert!(m.price.is_none());
        assert!(m.times.is_empty());
        assert!(!m.is_usable());
    }
}
