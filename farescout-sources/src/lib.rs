// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # FareScout Sources
//!
//! Booking site implementations for FareScout.
//!
//! Each site module includes:
//!
//! - **Descriptor**: Static configuration (metadata, CLI names, adapter)
//! - **Site**: Search URL, readiness signal, timeouts and block detection
//! - **Extractor**: Container strategies and field rules for result pages
//!
//! ## Supported Sites
//!
//! | Site | CLI | Aliases | Container strategy |
//! |------|-----|---------|--------------------|
//! | MakeMyTrip | `makemytrip` | `mmt` | Exact selector |
//! | Cleartrip | `cleartrip` | `ct` | Exact selector, marked containers, text anchor |
//! | EaseMyTrip | `easemytrip` | `emt` | Price attribute anchor |
//!
//! ## Usage
//!
//! ```ignore
//! use farescout_sources::SourceRegistry;
//! use farescout_fetch::FetchContext;
//!
//! let orchestrator = SourceRegistry::build_orchestrator(&[]);
//! let ctx = FetchContext::new();
//! let run = orchestrator.run(&query, &ctx).await;
//! ```

pub mod descriptor;
pub mod registry;
pub mod request;

pub mod cleartrip;
pub mod easemytrip;
pub mod makemytrip;

pub use descriptor::{CliConfig, SourceDescriptor, SourceMetadata};
pub use registry::SourceRegistry;

pub use cleartrip::{CleartripSite, cleartrip_descriptor, cleartrip_extractor};
pub use easemytrip::{EaseMyTripSite, easemytrip_descriptor, easemytrip_extractor};
pub use makemytrip::{MakeMyTripSite, makemytrip_descriptor, makemytrip_extractor};
