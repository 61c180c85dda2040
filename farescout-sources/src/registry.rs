//! Source registry for managing all source descriptors.
//!
//! The registry provides static access to every booking site and is the
//! central point for turning a source selection into an orchestrator.

use std::collections::HashMap;
use std::sync::OnceLock;

use tracing::debug;

use farescout_core::SourceId;
use farescout_fetch::Orchestrator;

use crate::cleartrip::cleartrip_descriptor;
use crate::descriptor::SourceDescriptor;
use crate::easemytrip::easemytrip_descriptor;
use crate::makemytrip::makemytrip_descriptor;

// ============================================================================
// Static Registry
// ============================================================================

static DESCRIPTORS: OnceLock<Vec<SourceDescriptor>> = OnceLock::new();

static CLI_NAME_MAP: OnceLock<HashMap<String, SourceId>> = OnceLock::new();

/// Descriptors in orchestration order.
fn init_descriptors() -> Vec<SourceDescriptor> {
    vec![
        makemytrip_descriptor(),
        cleartrip_descriptor(),
        easemytrip_descriptor(),
    ]
}

fn build_cli_name_map(descriptors: &[SourceDescriptor]) -> HashMap<String, SourceId> {
    let mut map = HashMap::new();

    for desc in descriptors {
        map.insert(desc.cli.name.to_string(), desc.id);
        for alias in desc.cli.aliases {
            map.insert((*alias).to_string(), desc.id);
        }
    }

    map
}

// ============================================================================
// Source Registry
// ============================================================================

/// Global registry of all source descriptors.
pub struct SourceRegistry;

impl SourceRegistry {
    /// Returns all source descriptors in orchestration order.
    pub fn all() -> &'static [SourceDescriptor] {
        DESCRIPTORS.get_or_init(init_descriptors)
    }

    /// Gets a source descriptor by id.
    pub fn get(id: SourceId) -> Option<&'static SourceDescriptor> {
        Self::all().iter().find(|d| d.id == id)
    }

    /// Returns the CLI name to source id mapping.
    pub fn cli_name_map() -> &'static HashMap<String, SourceId> {
        CLI_NAME_MAP.get_or_init(|| build_cli_name_map(Self::all()))
    }

    /// Looks up a source by CLI name or alias, case-insensitively.
    pub fn get_by_cli_name(name: &str) -> Option<&'static SourceDescriptor> {
        let id = Self::cli_name_map().get(&name.trim().to_ascii_lowercase())?;
        Self::get(*id)
    }

    /// Returns all enabled-by-default sources.
    pub fn default_enabled() -> Vec<&'static SourceDescriptor> {
        Self::all()
            .iter()
            .filter(|d| d.metadata.default_enabled)
            .collect()
    }

    /// Returns the number of registered sources.
    pub fn count() -> usize {
        Self::all().len()
    }

    /// Returns all source ids.
    pub fn kinds() -> Vec<SourceId> {
        Self::all().iter().map(|d| d.id).collect()
    }

    /// Builds an orchestrator over the selected sources.
    ///
    /// Adapters run in registry order whatever order `selected` lists them
    /// in. An empty selection means every default-enabled source.
    pub fn build_orchestrator(selected: &[SourceId]) -> Orchestrator {
        let adapters = Self::all()
            .iter()
            .filter(|d| {
                if selected.is_empty() {
                    d.metadata.default_enabled
                } else {
                    selected.contains(&d.id)
                }
            })
            .map(SourceDescriptor::build_adapter)
            .collect();

        let orchestrator = Orchestrator::with_adapters(adapters);
        debug!(sources = ?orchestrator.sources(), "Built orchestrator");
        orchestrator
    }
}

// ============================================================================
// Tests
// ============================================================================
