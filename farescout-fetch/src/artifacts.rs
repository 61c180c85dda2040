//! Debug artifact output.
//!
//! Adapters hand page snapshots and record dumps to an [`ArtifactSink`] when
//! one is configured. Artifacts are write-only; nothing reads them back.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use farescout_core::{FlightRecord, SourceId};

use crate::error::ArtifactError;

/// Records extracted from one source, as written to `{prefix}_flight_details.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordDump {
    /// Site display name.
    pub platform: String,
    /// Route and date searched.
    pub search_query: String,
    /// Search URL.
    pub url: String,
    /// When the dump was taken.
    pub timestamp: DateTime<Utc>,
    /// Extracted records.
    pub flights: Vec<FlightRecord>,
}

/// Destination for debug artifacts.
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    /// Stores the rendered page of `source`.
    async fn write_page(&self, source: SourceId, content: &str) -> Result<(), ArtifactError>;

    /// Stores the records extracted from `source`.
    async fn write_records(&self, source: SourceId, dump: &RecordDump) -> Result<(), ArtifactError>;
}

// ============================================================================
// Memory Artifacts
// ============================================================================

/// In-memory sink, handy for tests.
#[derive(Debug, Default)]
pub struct MemoryArtifacts {
    pages: Mutex<Vec<(SourceId, String)>>,
    dumps: Mutex<Vec<(SourceId, RecordDump)>>,
}

impl MemoryArtifacts {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pages written so far.
    pub fn pages(&self) -> Vec<(SourceId, String)> {
        self.pages.lock().map(|p| p.clone()).unwrap_or_default()
    }

    /// Record dumps written so far.
    pub fn dumps(&self) -> Vec<(SourceId, RecordDump)> {
        self.dumps.lock().map(|d| d.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ArtifactSink for MemoryArtifacts {
    async fn write_page(&self, source: SourceId, content: &str) -> Result<(), ArtifactError> {
        if let Ok(mut pages) = self.pages.lock() {
            pages.push((source, content.to_string()));
        }
        Ok(())
    }

    async fn write_records(&self, source: SourceId, dump: &RecordDump) -> Result<(), ArtifactError> {
        if let Ok(mut dumps) = self.dumps.lock() {
            dumps.push((source, dump.clone()));
        }
        Ok(())
    }
}
