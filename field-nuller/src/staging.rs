use crate::types::{Batch, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// JSON file holding the built batches between construction and dispatch.
pub struct StagingStore {
    path: PathBuf,
}

impl StagingStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Pretty-printed JSON; parent directories are created as needed.
    pub async fn write(&self, batches: &[Batch]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(batches)?;
        tokio::fs::write(&self.path, json).await?;
        info!("Staged {} batches at {}", batches.len(), self.path.display());
        Ok(())
    }

    /// Read back batches written by `write`.
    pub async fn read(&self) -> Result<Vec<Batch>> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let batches = serde_json::from_str(&content)?;
        Ok(batches)
    }
}
