//! MakeMyTrip descriptor.

use farescout_core::SourceId;
use farescout_fetch::{SiteAdapter, SourceAdapter};

use super::site::MakeMyTripSite;
use crate::descriptor::{CliConfig, SourceDescriptor, SourceMetadata};

/// Returns the MakeMyTrip descriptor.
pub fn makemytrip_descriptor() -> SourceDescriptor {
    SourceDescriptor {
        id: SourceId::MakeMyTrip,
        metadata: SourceMetadata {
            display_name: SourceId::MakeMyTrip.display_name(),
            home_url: "https://www.makemytrip.com/",
            default_enabled: true,
            client_rendered: true,
        },
        cli: CliConfig {
            name: "makemytrip",
            aliases: &["mmt"],
        },
        build_adapter: build_makemytrip_adapter,
    }
}

fn build_makemytrip_adapter() -> Box<dyn SourceAdapter> {
    Box::new(SiteAdapter::new(MakeMyTripSite::new()))
}
