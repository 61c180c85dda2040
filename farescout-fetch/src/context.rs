//! Fetch context shared by every source adapter.
//!
//! The context bundles the collaborators adapters need: the document
//! renderer, the airport table, settings, and an optional debug artifact
//! sink.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use farescout_core::{AirportTable, SourceId};

use crate::artifacts::ArtifactSink;
use crate::renderer::{DocumentRenderer, HttpRenderer};

/// Default time allowed for releasing a render session.
pub const DEFAULT_RELEASE_TIMEOUT: Duration = Duration::from_secs(5);

// ============================================================================
// Fetch Settings
// ============================================================================

/// Settings for source adapters. `None` means "use the site's own value".
#[derive(Debug, Clone)]
pub struct FetchSettings {
    /// Time allowed for releasing a session.
    pub release_timeout: Duration,
    /// Navigation timeout override.
    pub navigation_timeout: Option<Duration>,
    /// Ready-signal timeout override.
    pub ready_timeout: Option<Duration>,
    /// Settle delay override.
    pub settle_delay: Option<Duration>,
    /// Per-source candidate cap overrides.
    pub max_candidates: HashMap<SourceId, usize>,
    /// Whether to write debug artifacts when a sink is configured.
    pub debug_artifacts: bool,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            release_timeout: DEFAULT_RELEASE_TIMEOUT,
            navigation_timeout: None,
            ready_timeout: None,
            settle_delay: None,
            max_candidates: HashMap::new(),
            debug_artifacts: false,
        }
    }
}

impl FetchSettings {
    /// Skips every settle delay. Useful against canned pages.
    #[must_use]
    pub fn without_settle(mut self) -> Self {
        self.settle_delay = Some(Duration::ZERO);
        self
    }

    /// Sets the release timeout.
    #[must_use]
    pub fn with_release_timeout(mut self, timeout: Duration) -> Self {
        self.release_timeout = timeout;
        self
    }

    /// Overrides the candidate cap for one source.
    #[must_use]
    pub fn with_max_candidates(mut self, source: SourceId, max: usize) -> Self {
        self.max_candidates.insert(source, max);
        self
    }

    /// Enables debug artifacts.
    #[must_use]
    pub fn with_debug_artifacts(mut self) -> Self {
        self.debug_artifacts = true;
        self
    }

    /// Candidate cap override for `source`, if any.
    pub fn max_candidates_for(&self, source: SourceId) -> Option<usize> {
        self.max_candidates.get(&source).copied()
    }
}

// ============================================================================
// Fetch Context
// ============================================================================

/// Context passed to every adapter.
pub struct FetchContext {
    /// Page renderer.
    pub renderer: Arc<dyn DocumentRenderer>,
    /// City and airport lookups.
    pub airports: Arc<AirportTable>,
    /// Adapter settings.
    pub settings: FetchSettings,
    /// Debug artifact sink.
    pub artifacts: Option<Arc<dyn ArtifactSink>>,
}

impl FetchContext {
    /// Creates a context with the HTTP renderer and built-in airports.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a builder for customizing the context.
    pub fn builder() -> FetchContextBuilder {
        FetchContextBuilder::new()
    }

    /// Returns the artifact sink when artifacts are enabled.
    pub fn artifact_sink(&self) -> Option<&dyn ArtifactSink> {
        if self.settings.debug_artifacts {
            self.artifacts.as_deref()
        } else {
            None
        }
    }
}

impl Default for FetchContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FetchContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchContext")
            .field("renderer", &self.renderer.name())
            .field("airports", &self.airports.len())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Fetch Context Builder
// ============================================================================

/// Builder for constructing a [`FetchContext`].
#[derive(Default)]
pub struct FetchContextBuilder {
    renderer: Option<Arc<dyn DocumentRenderer>>,
    airports: Option<Arc<AirportTable>>,
    settings: FetchSettings,
    artifacts: Option<Arc<dyn ArtifactSink>>,
}

impl FetchContextBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the renderer.
    #[must_use]
    pub fn renderer(mut self, renderer: Arc<dyn DocumentRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Sets the airport table.
    #[must_use]
    pub fn airports(mut self, airports: Arc<AirportTable>) -> Self {
        self.airports = Some(airports);
        self
    }

    /// Sets the adapter settings.
    #[must_use]
    pub fn settings(mut self, settings: FetchSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the artifact sink.
    #[must_use]
    pub fn artifacts(mut self, sink: Arc<dyn ArtifactSink>) -> Self {
        self.artifacts = Some(sink);
        self
    }

    /// Builds the fetch context.
    pub fn build(self) -> FetchContext {
        if self.settings.debug_artifacts && self.artifacts.is_none() {
            warn!("Debug artifacts enabled but no artifact sink configured");
        }

        FetchContext {
            renderer: self
                .renderer
                .unwrap_or_else(|| Arc::new(HttpRenderer::for_booking_sites())),
            airports: self
                .airports
                .unwrap_or_else(|| Arc::new(AirportTable::builtin())),
            settings: self.settings,
            artifacts: self.artifacts,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
