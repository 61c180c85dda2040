//! Cleartrip descriptor.

use farescout_core::SourceId;
use farescout_fetch::{SiteAdapter, SourceAdapter};

use super::site::CleartripSite;
use crate::descriptor::{CliConfig, SourceDescriptor, SourceMetadata};

/// Returns the Cleartrip descriptor.
pub fn cleartrip_descriptor() -> SourceDescriptor {
    SourceDescriptor {
        id: SourceId::Cleartrip,
        metadata: SourceMetadata {
            display_name: SourceId::Cleartrip.display_name(),
            home_url: "https://www.cleartrip.com/",
            default_enabled: true,
            client_rendered: true,
        },
        cli: CliConfig {
            name: "cleartrip",
            aliases: &["ct"],
        },
        build_adapter: build_cleartrip_adapter,
    }
}

fn build_cleartrip_adapter() -> Box<dyn SourceAdapter> {
    Box::new(SiteAdapter::new(CleartripSite::new()))
}
