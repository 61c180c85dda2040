//! Cleartrip request building.

use std::time::Duration;

use url::Url;

use farescout_core::{AirportTable, FlightQuery, SourceId};
use farescout_fetch::{AdapterError, Extractor, ReadySignal, RenderOptions, SourceSite};

use super::extractor::cleartrip_extractor;
use crate::request::{parse_url, resolve, search_date};

const SEARCH_URL: &str = "https://www.cleartrip.com/flights/results";

/// cleartrip.com
#[derive(Debug)]
pub struct CleartripSite {
    extractor: Extractor,
}

impl CleartripSite {
    /// Creates the site with its default extractor.
    pub fn new() -> Self {
        Self {
            extractor: cleartrip_extractor(),
        }
    }
}

impl Default for CleartripSite {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceSite for CleartripSite {
    fn source(&self) -> SourceId {
        SourceId::Cleartrip
    }

    fn request_url(&self, query: &FlightQuery, airports: &AirportTable) -> Result<Url, AdapterError> {
        let from = resolve(airports, &query.origin)?;
        let to = resolve(airports, &query.destination)?;
        parse_url(&format!(
            "{SEARCH_URL}?adults=1&childs=0&infants=0&class=Economy&from={from}&to={to}&depart_date={}&intl=n&sd=1",
            search_date(query.date)
        ))
    }

    // Any rupee sign means fares have started to render.
    fn render_options(&self) -> RenderOptions {
        RenderOptions::default().stealth()
    }

    fn ready_signal(&self) -> ReadySignal {
        ReadySignal::Text("₹".to_string())
    }

    fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(60)
    }

    fn ready_timeout(&self) -> Duration {
        Duration::from_secs(15)
    }

    fn settle_delay(&self) -> Duration {
        Duration::from_secs(3)
    }

    fn extractor(&self) -> &Extractor {
        &self.extractor
    }
}
