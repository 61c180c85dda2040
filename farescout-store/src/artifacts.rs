//! Debug artifacts on disk.
//!
//! For each source the writer keeps the last rendered page as
//! `{prefix}_page.html` and the extracted records as
//! `{prefix}_flight_details.json`, overwriting earlier runs.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use farescout_core::SourceId;
use farescout_fetch::{ArtifactError, ArtifactSink, RecordDump};

use crate::error::StoreError;
use crate::persistence::write_atomic;

/// Writes debug artifacts under one directory.
#[derive(Debug, Clone)]
pub struct DebugArtifactWriter {
    dir: PathBuf,
}

impl DebugArtifactWriter {
    /// Creates a writer for `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the page snapshot for `source`.
    pub fn page_path(&self, source: SourceId) -> PathBuf {
        self.dir.join(format!("{}_page.html", source.prefix()))
    }

    /// Path of the record dump for `source`.
    pub fn records_path(&self, source: SourceId) -> PathBuf {
        self.dir
            .join(format!("{}_flight_details.json", source.prefix()))
    }
}

fn into_artifact_error(e: StoreError) -> ArtifactError {
    match e {
        StoreError::Io(e) => ArtifactError::Io(e),
        StoreError::Serialization(e) => ArtifactError::Serialization(e),
        other => ArtifactError::Io(std::io::Error::other(other.to_string())),
    }
}

#[async_trait]
impl ArtifactSink for DebugArtifactWriter {
    async fn write_page(&self, source: SourceId, content: &str) -> Result<(), ArtifactError> {
        let path = self.page_path(source);
        write_atomic(&path, content.as_bytes())
            .await
            .map_err(into_artifact_error)?;
        debug!(source = %source, path = %path.display(), "Page snapshot written");
        Ok(())
    }

    async fn write_records(&self, source: SourceId, dump: &RecordDump) -> Result<(), ArtifactError> {
        let path = self.records_path(source);
        let json = serde_json::to_string_pretty(dump)?;
        write_atomic(&path, json.as_bytes())
            .await
            .map_err(into_artifact_error)?;
        debug!(source = %source, path = %path.display(), count = dump.flights.len(), "Record dump written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn test_writes_named_files() {
        let temp_dir = TempDir::new().unwrap();
        let writer = DebugArtifactWriter::new(temp_dir.path().join("artifacts"));

        writer
            .write_page(SourceId::EaseMyTrip, "<html>emt</html>")
            .await
            .unwrap();
        let dump = RecordDump {
            platform: "EaseMyTrip".to_string(),
            search_query: "DEL -> BOM on 2026-11-02".to_string(),
            url: "https://flight.easemytrip.com/".to_string(),
            timestamp: Utc::now(),
            flights: Vec::new(),
        };
        writer.write_records(SourceId::EaseMyTrip, &dump).await.unwrap();

        let page = tokio::fs::read_to_string(temp_dir.path().join("artifacts/emt_page.html"))
            .await
            .unwrap();
        assert_eq!(page, "<html>emt</html>");

        let json = tokio::fs::read_to_string(
            temp_dir.path().join("artifacts/emt_flight_details.json"),
        )
        .await
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["platform"], "EaseMyTrip");
        assert_eq!(value["searchQuery"], "DEL -> BOM on 2026-11-02");
    }

    #[tokio::test]
    async fn test_overwrites_previous_run() {
        let temp_dir = TempDir::new().unwrap();
        let writer = DebugArtifactWriter::new(temp_dir.path());

        writer.write_page(SourceId::Cleartrip, "first").await.unwrap();
        writer.write_page(SourceId::Cleartrip, "second").await.unwrap();

        let page = tokio::fs::read_to_string(writer.page_path(SourceId::Cleartrip))
            .await
            .unwrap();
        assert_eq!(page, "second");
    }
}
