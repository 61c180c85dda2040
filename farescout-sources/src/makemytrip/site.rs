//! MakeMyTrip request building and page checks.

use std::time::Duration;

use url::Url;

use farescout_core::{AirportTable, FlightQuery, SourceId};
use farescout_fetch::{AdapterError, Extractor, ReadySignal, RenderOptions, SourceSite};

use super::extractor::makemytrip_extractor;
use crate::request::{parse_url, resolve, search_date};

const SEARCH_URL: &str = "https://www.makemytrip.com/flight/search";

/// The bot trap is a bare `200-OK` body.
const TRAP_MARKER: &str = "200-OK";
const TRAP_MAX_LEN: usize = 200;

/// makemytrip.com
#[derive(Debug)]
pub struct MakeMyTripSite {
    extractor: Extractor,
}

impl MakeMyTripSite {
    /// Creates the site with its default extractor.
    pub fn new() -> Self {
        Self {
            extractor: makemytrip_extractor(),
        }
    }
}

impl Default for MakeMyTripSite {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceSite for MakeMyTripSite {
    fn source(&self) -> SourceId {
        SourceId::MakeMyTrip
    }

    fn request_url(&self, query: &FlightQuery, airports: &AirportTable) -> Result<Url, AdapterError> {
        let from = resolve(airports, &query.origin)?;
        let to = resolve(airports, &query.destination)?;
        parse_url(&format!(
            "{SEARCH_URL}?itinerary={from}-{to}-{}&tripType=O&paxType=A-1_C-0_I-0&intl=false&cabinClass=E",
            search_date(query.date)
        ))
    }

    fn render_options(&self) -> RenderOptions {
        RenderOptions::default().stealth().with_profile("mmt")
    }

    fn ready_signal(&self) -> ReadySignal {
        ReadySignal::Selector(".listingCard".to_string())
    }

    fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(100)
    }

    fn ready_timeout(&self) -> Duration {
        Duration::from_secs(45)
    }

    fn settle_delay(&self) -> Duration {
        Duration::from_secs(3)
    }

    fn extractor(&self) -> &Extractor {
        &self.extractor
    }

    fn detect_block(&self, content: &str) -> Option<String> {
        (content.contains(TRAP_MARKER) && content.len() < TRAP_MAX_LEN)
            .then(|| "Bot trap page (200-OK)".to_string())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use farescout_core::AirportCode;

    use super::*;

    #[test]
    fn test_request_url() {
        let query = FlightQuery::new(
            AirportCode::new("DEL").unwrap(),
            AirportCode::new("BOM").unwrap(),
            NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(),
            "",
        );
        let url = MakeMyTripSite::new()
            .request_url(&query, &AirportTable::builtin())
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.makemytrip.com/flight/search?itinerary=DEL-BOM-02/11/2026&tripType=O&paxType=A-1_C-0_I-0&intl=false&cabinClass=E"
        );
    }

    #[test]
    fn test_browser_profile_kept() {
        let options = MakeMyTripSite::new().render_options();
        assert!(options.stealth);
        assert_eq!(options.profile.as_deref(), Some("mmt"));
    }

    #[test]
    fn test_bot_trap() {
        let site = MakeMyTripSite::new();
        assert!(site.detect_block("<html><body>200-OK</body></html>").is_some());
        let long = format!("<html><body>200-OK{}</body></html>", " ".repeat(300));
        assert!(site.detect_block(&long).is_none());
        assert!(site.detect_block("<html></html>").is_none());
    }
}
