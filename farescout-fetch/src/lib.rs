// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # FareScout Fetch
//!
//! Rendering, extraction, and orchestration for FareScout.
//!
//! ## Renderers
//!
//! The [`renderer`] module abstracts "load this URL and give me the page":
//!
//! - [`renderer::browser`] - Playwright-driven Chromium, the default for searches
//! - [`renderer::http`] - reqwest-backed renderer with a domain allowlist
//! - [`renderer::fixture`] - Canned pages for tests and offline runs
//!
//! ## Extraction
//!
//! - [`document::Document`] - Parsed, queryable HTML
//! - [`extract::Extractor`] - Ordered strategy chain plus field rules
//!
//! ## Pipeline
//!
//! - [`adapter::SiteAdapter`] - Drives one site from query to outcome
//! - [`pipeline::Orchestrator`] - Runs adapters in order, isolating failures
//! - [`aggregate::aggregate`] - Merges outcomes and picks the cheapest flight
//! - [`search::FlightSearch`] - Interpreter, orchestrator and aggregator together
//!
//! ## Interpretation
//!
//! - [`interpret::OllamaInterpreter`] - Local language model, with the pattern
//!   interpreter as fallback
//!
//! ## Example
//!
//! ```ignore
//! use farescout_fetch::{FetchContext, FlightSearch, Orchestrator};
//!
//! let ctx = FetchContext::new();
//! let search = FlightSearch::new(interpreter, Orchestrator::with_adapters(adapters));
//! let report = search.run("delhi to mumbai on 12 march", &ctx).await;
//! ```

pub mod adapter;
pub mod aggregate;
pub mod artifacts;
pub mod context;
pub mod document;
pub mod error;
pub mod extract;
pub mod interpret;
pub mod pipeline;
pub mod renderer;
pub mod search;

// Errors
pub use error::{AdapterError, ArtifactError, RenderError};

// Renderers
pub use renderer::{
    BrowserRenderer, DocumentRenderer, HttpRenderer, ReadySignal, RenderOptions, RenderSession,
    StaticRenderer,
    fixture::{FixtureResponse, FixtureStats},
};

// Extraction
pub use document::Document;
pub use extract::{
    ExactSelector, ExtractionStrategy, Extractor, FieldRules, MarkedContainers,
    PriceAttributeAnchor, RawMatch, TextAnchor,
};

// Pipeline
pub use adapter::{SiteAdapter, SourceAdapter, SourceSite};
pub use aggregate::{aggregate, cheapest_of, interpreter_failure_report};
pub use artifacts::{ArtifactSink, MemoryArtifacts, RecordDump};
pub use context::{FetchContext, FetchContextBuilder, FetchSettings};
pub use pipeline::{Orchestrator, OrchestratorRun, SourceAttempt};
pub use interpret::OllamaInterpreter;
pub use search::FlightSearch;
