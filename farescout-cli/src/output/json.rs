//! JSON output formatting.

use anyhow::Result;
use serde::Serialize;

use farescout_sources::SourceDescriptor;

// ============================================================================
// Output Types
// ============================================================================

/// JSON output for one booking site.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceOutput {
    pub id: String,
    pub name: String,
    pub cli_name: String,
    pub aliases: Vec<String>,
    pub home_url: String,
    pub default_enabled: bool,
    pub client_rendered: bool,
}

impl From<&SourceDescriptor> for SourceOutput {
    fn from(desc: &SourceDescriptor) -> Self {
        Self {
            id: desc.id.cli_name().to_string(),
            name: desc.display_name().to_string(),
            cli_name: desc.cli_name().to_string(),
            aliases: desc.cli.aliases.iter().map(ToString::to_string).collect(),
            home_url: desc.metadata.home_url.to_string(),
            default_enabled: desc.metadata.default_enabled,
            client_rendered: desc.metadata.client_rendered,
        }
    }
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter, compact or pretty.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }

    /// Formats the sources listing.
    pub fn format_sources(&self, sources: &[SourceDescriptor]) -> Result<String> {
        let outputs: Vec<SourceOutput> = sources.iter().map(SourceOutput::from).collect();
        self.format(&outputs)
    }
}
