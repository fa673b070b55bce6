use crate::types::{Identifier, NullerError, Result};
use std::path::Path;
use tracing::{debug, info};

/// Reads newline-delimited contact identifiers.
pub struct IdentifierLoader;

impl IdentifierLoader {
    /// Split on LF or CRLF, trim, drop blank lines, keep order.
    pub fn load_str(source: &str) -> Result<Vec<Identifier>> {
        let identifiers: Vec<Identifier> = source.lines().filter_map(Identifier::parse).collect();

        if identifiers.is_empty() {
            return Err(NullerError::EmptyInput);
        }

        debug!("Parsed {} identifiers", identifiers.len());
        Ok(identifiers)
    }

    pub async fn load_path(path: impl AsRef<Path>) -> Result<Vec<Identifier>> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await?;
        let identifiers = Self::load_str(&content)?;
        info!("Loaded {} identifiers from {}", identifiers.len(), path.display());
        Ok(identifiers)
    }
}
