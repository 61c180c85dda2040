//! EaseMyTrip request building.

use std::time::Duration;

use url::Url;

use farescout_core::{AirportTable, FlightQuery, SourceId};
use farescout_fetch::{AdapterError, Extractor, ReadySignal, RenderOptions, SourceSite};

use super::extractor::easemytrip_extractor;
use crate::request::{parse_url, resolve, search_date};

const SEARCH_URL: &str = "https://flight.easemytrip.com/FlightList/Index";

/// easemytrip.com
#[derive(Debug)]
pub struct EaseMyTripSite {
    extractor: Extractor,
}

impl EaseMyTripSite {
    /// Creates the site with its default extractor.
    pub fn new() -> Self {
        Self {
            extractor: easemytrip_extractor(),
        }
    }
}

impl Default for EaseMyTripSite {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceSite for EaseMyTripSite {
    fn source(&self) -> SourceId {
        SourceId::EaseMyTrip
    }

    /// The `srch` parameter is `ORIG-City-India|DEST-City-India|DD/MM/YYYY`.
    fn request_url(&self, query: &FlightQuery, airports: &AirportTable) -> Result<Url, AdapterError> {
        let from = resolve(airports, &query.origin)?;
        let to = resolve(airports, &query.destination)?;
        let srch = format!(
            "{from}-{}-India|{to}-{}-India|{}",
            airports.display_name(&from),
            airports.display_name(&to),
            search_date(query.date)
        );
        parse_url(&format!(
            "{SEARCH_URL}?srch={srch}&px=1-0-0&cbn=0&ar=undefined&isow=true&isdm=true&lang="
        ))
    }

    fn render_options(&self) -> RenderOptions {
        RenderOptions::default().stealth().with_profile("emt")
    }

    fn ready_signal(&self) -> ReadySignal {
        ReadySignal::Selector(r#"span[id^="spnPrice"]"#.to_string())
    }

    fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(60)
    }

    fn ready_timeout(&self) -> Duration {
        Duration::from_secs(30)
    }

    fn settle_delay(&self) -> Duration {
        Duration::from_secs(5)
    }

    fn extractor(&self) -> &Extractor {
        &self.extractor
    }
}
