//! EaseMyTrip descriptor.

use farescout_core::SourceId;
use farescout_fetch::{SiteAdapter, SourceAdapter};

use super::site::EaseMyTripSite;
use crate::descriptor::{CliConfig, SourceDescriptor, SourceMetadata};

/// Returns the EaseMyTrip descriptor.
pub fn easemytrip_descriptor() -> SourceDescriptor {
    SourceDescriptor {
        id: SourceId::EaseMyTrip,
        metadata: SourceMetadata {
            display_name: SourceId::EaseMyTrip.display_name(),
            home_url: "https://www.easemytrip.com/",
            default_enabled: true,
            client_rendered: true,
        },
        cli: CliConfig {
            name: "easemytrip",
            aliases: &["emt"],
        },
        build_adapter: build_easemytrip_adapter,
    }
}

fn build_easemytrip_adapter() -> Box<dyn SourceAdapter> {
    Box::new(SiteAdapter::new(EaseMyTripSite::new()))
}
