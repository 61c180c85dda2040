//! Cleartrip implementation.
//!
//! Card markup uses generated styled-component classes that change between
//! deployments, so the extractor falls back from the exact card class to any
//! `sc-aXZVg` flex row, then to rows around a `Flight Details` link.

mod descriptor;
mod extractor;
mod site;

pub use descriptor::cleartrip_descriptor;
pub use extractor::cleartrip_extractor;
pub use site::CleartripSite;
