// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # FareScout Store
//!
//! On-disk state for FareScout.
//!
//! This crate provides:
//!
//! - **SettingsStore**: User preferences loaded from and saved to JSON
//! - **DebugArtifactWriter**: Page snapshots and record dumps per source
//! - **Persistence**: Path defaults and owner-only file writes
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use farescout_store::{DebugArtifactWriter, SettingsStore};
//! use farescout_fetch::FetchContext;
//!
//! let settings = SettingsStore::load_default().await?.get().await;
//! let ctx = FetchContext::builder()
//!     .settings(settings.fetch_settings())
//!     .airports(Arc::new(settings.airport_table()?))
//!     .artifacts(Arc::new(DebugArtifactWriter::new(settings.artifact_dir())))
//!     .build();
//! ```

pub mod artifacts;
pub mod error;
pub mod persistence;
pub mod settings;

pub use artifacts::DebugArtifactWriter;
pub use error::StoreError;
pub use persistence::{
    default_artifact_dir, default_browser_profile_dir, default_cache_dir, default_config_dir,
    default_settings_path, ensure_dir, load_json, load_json_or_default, save_json, write_atomic,
};
pub use settings::{InterpreterKind, LogLevel, RendererKind, Settings, SettingsStore};
