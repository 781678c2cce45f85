//! Offline store snapshots.
//!
//! A snapshot is the raw server document written as pretty JSON, so a
//! report can be rerun later against exactly what the server returned.

use std::path::Path;

use tracing::info;

use crate::error::FetchError;

use super::types::StoresPayload;
use super::MarketSource;

/// Write a raw store document to disk.
pub async fn save_snapshot(path: &Path, raw: &serde_json::Value) -> Result<(), FetchError> {
    let body =
        serde_json::to_vec_pretty(raw).map_err(|e| FetchError::Parse(e.to_string()))?;
    tokio::fs::write(path, body)
        .await
        .map_err(|source| FetchError::Snapshot {
            path: path.display().to_string(),
            source,
        })?;
    info!(path = %path.display(), "Saved snapshot");
    Ok(())
}

/// Read a store document from disk.
pub async fn load_snapshot(path: &Path) -> Result<StoresPayload, FetchError> {
    let body = tokio::fs::read(path)
        .await
        .map_err(|source| FetchError::Snapshot {
            path: path.display().to_string(),
            source,
        })?;
    let raw: serde_json::Value = serde_json::from_slice(&body)
        .map_err(|e| FetchError::Parse(format!("{}: {}", path.display(), e)))?;
    StoresPayload::from_value(raw)
}

/// Market source backed by a snapshot file.
#[derive(Debug, Clone)]
pub struct SnapshotSource {
    path: std::path::PathBuf,
}

impl SnapshotSource {
    /// Serve stores from `path`.
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl MarketSource for SnapshotSource {
    async fn fetch_stores(&self) -> Result<StoresPayload, FetchError> {
        load_snapshot(&self.path).await
    }
}
