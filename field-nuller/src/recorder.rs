use crate::traits::OutcomeSink;
use crate::types::{BatchOutcome, ErrorDocument, Identifier, Result, RunSummary};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const RESPONSE_SUFFIX: &str = "_response.json";
const ERROR_SUFFIX: &str = "_error.json";

/// `batch_0007_response.json` for a success, `batch_0007_error.json` for a failure.
pub fn artifact_name(outcome: &BatchOutcome) -> String {
    let suffix = if outcome.is_success() { RESPONSE_SUFFIX } else { ERROR_SUFFIX };
    format!("batch_{:04}{}", outcome.batch_index(), suffix)
}

/// Persists one JSON artifact per batch outcome under `results_dir`.
pub struct ResultRecorder {
    results_dir: PathBuf,
}

impl ResultRecorder {
    pub fn new(results_dir: impl Into<PathBuf>) -> Self {
        Self {
            results_dir: results_dir.into(),
        }
    }

    /// Location of the result artifacts
    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }

    /// Idempotent.
    pub async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.results_dir).await?;
        Ok(())
    }

    /// Write the artifact for one outcome, creating the results directory
    /// first. Returns the path written.
    pub async fn write_outcome(&self, outcome: &BatchOutcome) -> Result<PathBuf> {
        self.ensure_dir().await?;

        let json = match outcome {
            BatchOutcome::Success { response_body, .. } => serde_json::to_string_pretty(response_body)?,
            BatchOutcome::Failure {
                error_message,
                batch,
                timestamp,
                ..
            } => serde_json::to_string_pretty(&ErrorDocument {
                error: error_message.clone(),
                batch: batch.clone(),
                timestamp: *timestamp,
            })?,
        };

        let path = self.results_dir.join(artifact_name(outcome));
        tokio::fs::write(&path, json).await?;
        debug!("Wrote {}", path.display());
        Ok(path)
    }

    /// Counts outcomes; never touches the disk.
    pub fn summarize(outcomes: &[BatchOutcome]) -> RunSummary {
        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        RunSummary {
            total_batches: outcomes.len(),
            succeeded,
            failed: outcomes.len() - succeeded,
            unrecorded: 0,
            not_attempted: 0,
        }
    }
}

#[async_trait]
impl OutcomeSink for ResultRecorder {
    async fn record(&self, outcome: &BatchOutcome) -> Result<()> {
        self.write_outcome(outcome).await.map(|_| ())
    }
}

/// Identifiers of every batch recorded as failed, in batch order. Feed the
/// result back to a new run to retry just those records.
pub async fn collect_failed_identifiers(results_dir: impl AsRef<Path>) -> Result<Vec<Identifier>> {
    let results_dir = results_dir.as_ref();
    let mut error_files = Vec::new();

    let mut entries = tokio::fs::read_dir(results_dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with("batch_") && name.ends_with(ERROR_SUFFIX) {
            error_files.push(entry.path());
        }
    }
    // Zero-padded names sort by batch index.
    error_files.sort();

    let mut identifiers = Vec::new();
    for path in &error_files {
        let content = tokio::fs::read_to_string(path).await?;
        let document: ErrorDocument = serde_json::from_str(&content)?;
        identifiers.extend(document.batch.identifiers().cloned());
    }

    info!(
        "Found {} failed identifiers across {} error artifacts in {}",
        identifiers.len(),
        error_files.len(),
        results_dir.display()
    );
    Ok(identifiers)
}
