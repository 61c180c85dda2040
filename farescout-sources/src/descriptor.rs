//! Source descriptor system.
//!
//! A descriptor holds the static configuration of one booking site:
//! metadata, CLI names, and how to build its adapter.

use farescout_core::SourceId;
use farescout_fetch::SourceAdapter;

// ============================================================================
// Source Descriptor
// ============================================================================

/// Complete descriptor for a booking site.
pub struct SourceDescriptor {
    /// Source identifier.
    pub id: SourceId,
    /// Display metadata.
    pub metadata: SourceMetadata,
    /// Command-line names.
    pub cli: CliConfig,
    /// Builds a fresh adapter.
    pub build_adapter: fn() -> Box<dyn SourceAdapter>,
}

impl SourceDescriptor {
    /// Returns the display name.
    pub fn display_name(&self) -> &str {
        self.metadata.display_name
    }

    /// Returns the CLI name.
    pub fn cli_name(&self) -> &str {
        self.cli.name
    }

    /// Builds the adapter for this source.
    pub fn build_adapter(&self) -> Box<dyn SourceAdapter> {
        (self.build_adapter)()
    }
}

impl std::fmt::Debug for SourceDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceDescriptor")
            .field("id", &self.id)
            .field("metadata", &self.metadata)
            .field("cli", &self.cli)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Metadata
// ============================================================================

/// Human-facing details of a source.
#[derive(Debug, Clone)]
pub struct SourceMetadata {
    /// Name shown to users.
    pub display_name: &'static str,
    /// Site home page.
    pub home_url: &'static str,
    /// Whether the source runs when none are selected explicitly.
    pub default_enabled: bool,
    /// Whether results are rendered by client-side script, in which case a
    /// plain HTTP renderer usually sees no flights.
    pub client_rendered: bool,
}

// ============================================================================
// CLI Config
// ============================================================================

/// Names accepted on the command line.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Primary name.
    pub name: &'static str,
    /// Alternative names.
    pub aliases: &'static [&'static str],
}
