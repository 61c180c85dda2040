//! User settings.
//!
//! A JSON file whose every field has a default, so a partial or empty file
//! is valid. Command-line flags override what is loaded here.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use farescout_core::{AirportTable, SourceId};
use farescout_fetch::FetchSettings;
use farescout_fetch::interpret::{DEFAULT_OLLAMA_MODEL, DEFAULT_OLLAMA_URL};

use crate::error::StoreError;
use crate::persistence::{
    default_artifact_dir, default_browser_profile_dir, default_settings_path, load_json,
    save_json,
};

// ============================================================================
// Settings Types
// ============================================================================

/// User preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Sources asked when none are named on the command line.
    pub enabled_sources: Vec<SourceId>,

    /// Page load timeout for every source, in seconds. Unset keeps each
    /// site's own value.
    pub navigation_timeout_secs: Option<u64>,

    /// Results wait timeout for every source, in seconds.
    pub ready_timeout_secs: Option<u64>,

    /// Time allowed for closing a render session, in seconds.
    pub release_timeout_secs: u64,

    /// Pause after results appear, in milliseconds.
    pub settle_delay_ms: Option<u64>,

    /// Per-source cap on candidate containers.
    pub max_candidates: BTreeMap<SourceId, usize>,

    /// Write page snapshots and record dumps.
    pub debug_artifacts: bool,

    /// Where debug artifacts go. Defaults to the cache directory.
    pub artifact_dir: Option<PathBuf>,

    /// CSV of city and code columns read on top of the built-in airports.
    pub airport_csv: Option<PathBuf>,

    /// Extra `city -> code` airport entries. These win over the CSV.
    pub extra_airports: BTreeMap<String, String>,

    /// How result pages are loaded.
    pub renderer: RendererKind,

    /// Node.js binary that runs the browser driver. Defaults to `node`.
    pub node_path: Option<PathBuf>,

    /// Where persistent browser profiles live. Defaults to the cache
    /// directory.
    pub browser_profile_dir: Option<PathBuf>,

    /// Show the browser window instead of running headless.
    pub browser_headed: bool,

    /// How free-text queries are read.
    pub interpreter: InterpreterKind,

    /// Base URL of the Ollama server.
    pub ollama_url: String,

    /// Model the Ollama interpreter asks.
    pub ollama_model: String,

    /// Log level used when no `RUST_LOG` is set.
    pub log_level: LogLevel,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled_sources: SourceId::all().to_vec(),
            navigation_timeout_secs: None,
            ready_timeout_secs: None,
            release_timeout_secs: farescout_fetch::context::DEFAULT_RELEASE_TIMEOUT.as_secs(),
            settle_delay_ms: None,
            max_candidates: BTreeMap::new(),
            debug_artifacts: false,
            artifact_dir: None,
            airport_csv: None,
            extra_airports: BTreeMap::new(),
            renderer: RendererKind::default(),
            node_path: None,
            browser_profile_dir: None,
            browser_headed: false,
            interpreter: InterpreterKind::default(),
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            ollama_model: DEFAULT_OLLAMA_MODEL.to_string(),
            log_level: LogLevel::default(),
        }
    }
}

impl Settings {
    /// Checks values that deserialize fine but make no sense.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Config` naming the first bad value.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.release_timeout_secs == 0 {
            return Err(StoreError::Config(
                "release_timeout_secs must be positive".to_string(),
            ));
        }
        if matches!(self.navigation_timeout_secs, Some(0)) {
            return Err(StoreError::Config(
                "navigation_timeout_secs must be positive".to_string(),
            ));
        }
        if matches!(self.ready_timeout_secs, Some(0)) {
            return Err(StoreError::Config(
                "ready_timeout_secs must be positive".to_string(),
            ));
        }
        if self.interpreter == InterpreterKind::Ollama {
            if !self.ollama_url.starts_with("http://") && !self.ollama_url.starts_with("https://") {
                return Err(StoreError::Config(format!(
                    "ollama_url must be an http(s) URL, got \"{}\"",
                    self.ollama_url
                )));
            }
            if self.ollama_model.trim().is_empty() {
                return Err(StoreError::Config("ollama_model must not be empty".to_string()));
            }
        }
        if let Some((source, _)) = self.max_candidates.iter().find(|(_, max)| **max == 0) {
            return Err(StoreError::Config(format!(
                "max_candidates for {source} must be positive"
            )));
        }
        Ok(())
    }

    /// Returns true if `source` is asked by default.
    pub fn is_source_enabled(&self, source: SourceId) -> bool {
        self.enabled_sources.contains(&source)
    }

    /// Adapter settings derived from these preferences.
    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            release_timeout: Duration::from_secs(self.release_timeout_secs),
            navigation_timeout: self.navigation_timeout_secs.map(Duration::from_secs),
            ready_timeout: self.ready_timeout_secs.map(Duration::from_secs),
            settle_delay: self.settle_delay_ms.map(Duration::from_millis),
            max_candidates: self.max_candidates.iter().map(|(k, v)| (*k, *v)).collect(),
            debug_artifacts: self.debug_artifacts,
        }
    }

    /// The built-in airport table extended with `airport_csv`, then with
    /// `extra_airports`.
    ///
    /// A CSV file that cannot be read or lacks the needed columns is logged
    /// and skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if an `extra_airports` entry has a malformed code.
    pub fn airport_table(&self) -> Result<AirportTable, StoreError> {
        let mut table = AirportTable::builtin();
        if let Some(path) = &self.airport_csv {
            table = match std::fs::File::open(path) {
                Ok(file) => match table.clone().with_csv(file) {
                    Ok(extended) => {
                        info!(path = %path.display(), cities = extended.len(), "Loaded airport CSV");
                        extended
                    }
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Ignoring airport CSV");
                        table
                    }
                },
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Could not open airport CSV");
                    table
                }
            };
        }
        Ok(table.with_entries(&self.extra_airports)?)
    }

    /// Resolved browser profile directory.
    pub fn browser_profile_dir(&self) -> PathBuf {
        self.browser_profile_dir
            .clone()
            .unwrap_or_else(default_browser_profile_dir)
    }

    /// Resolved debug artifact directory.
    pub fn artifact_dir(&self) -> PathBuf {
        self.artifact_dir.clone().unwrap_or_else(default_artifact_dir)
    }
}

/// Page loading backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RendererKind {
    /// Headless Chromium through Playwright; runs the sites' scripts.
    #[default]
    Browser,
    /// Plain HTTP requests; only sees server-rendered markup.
    Http,
}

impl std::fmt::Display for RendererKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RendererKind::Browser => write!(f, "browser"),
            RendererKind::Http => write!(f, "http"),
        }
    }
}

impl std::str::FromStr for RendererKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "browser" | "chromium" => Ok(RendererKind::Browser),
            "http" => Ok(RendererKind::Http),
            other => Err(format!("unknown renderer \"{other}\" (expected browser or http)")),
        }
    }
}

/// Free-text query reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InterpreterKind {
    /// Offline pattern matching.
    #[default]
    Pattern,
    /// A local Ollama model, falling back to patterns.
    Ollama,
}

impl std::fmt::Display for InterpreterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InterpreterKind::Pattern => write!(f, "pattern"),
            InterpreterKind::Ollama => write!(f, "ollama"),
        }
    }
}

impl std::str::FromStr for InterpreterKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pattern" => Ok(InterpreterKind::Pattern),
            "ollama" | "llm" => Ok(InterpreterKind::Ollama),
            other => Err(format!(
                "unknown interpreter \"{other}\" (expected pattern or ollama)"
            )),
        }
    }
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Errors only.
    Error,
    /// Warnings and errors.
    #[default]
    Warn,
    /// Progress per source.
    Info,
    /// Strategy and field decisions.
    Debug,
    /// Everything.
    Trace,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

// ============================================================================
// Settings Store
// ============================================================================

/// Settings bound to the file they came from.
#[derive(Debug)]
pub struct SettingsStore {
    settings: RwLock<Settings>,
    path: PathBuf,
}

impl SettingsStore {
    /// Creates a store holding defaults.
    pub fn new(path: PathBuf) -> Self {
        Self {
            settings: RwLock::new(Settings::default()),
            path,
        }
    }

    /// Loads settings from the default path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but holds invalid values.
    pub async fn load_default() -> Result<Self, StoreError> {
        Self::load(default_settings_path()).await
    }

    /// Loads settings from a path.
    ///
    /// A missing file yields defaults. An unparseable file is logged and
    /// replaced by defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the parsed settings fail validation.
    pub async fn load(path: PathBuf) -> Result<Self, StoreError> {
        let settings = if path.exists() {
            info!(path = %path.display(), "Loading settings");
            load_json(&path).await.unwrap_or_else(|e| {
                warn!(error = %e, "Failed to load settings, using defaults");
                Settings::default()
            })
        } else {
            debug!(path = %path.display(), "Settings file not found, using defaults");
            Settings::default()
        };
        settings.validate()?;

        Ok(Self {
            settings: RwLock::new(settings),
            path,
        })
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets a copy of the current settings.
    pub async fn get(&self) -> Settings {
        self.settings.read().await.clone()
    }

    /// Updates settings in memory.
    pub async fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut Settings),
    {
        let mut settings = self.settings.write().await;
        f(&mut settings);
    }

    /// Saves settings to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings are invalid or cannot be written.
    pub async fn save(&self) -> Result<(), StoreError> {
        let settings = self.settings.read().await;
        settings.validate()?;
        save_json(&self.path, &*settings).await?;
        info!(path = %self.path.display(), "Settings saved");
        Ok(())
    }
}
