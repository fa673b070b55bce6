use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Upper bound on records per update request
pub const MAX_BATCH_SIZE: usize = 100;

/// Opaque, trimmed, non-empty name of a contact record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    /// Returns `None` when the trimmed value is empty.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Field names the operator asked to clear. Never empty, no blank names,
/// duplicates collapsed in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSet {
    names: Vec<String>,
}

impl FieldSet {
    /// Parse a comma-separated list as typed at the prompt.
    pub fn parse(input: &str) -> Result<Self> {
        if input.trim().is_empty() {
            return Err(NullerError::NoFields);
        }
        Self::from_names(input.split(','))
    }

    /// Validate already-split names. Positions in errors are 1-based.
    pub fn from_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut unique: Vec<String> = Vec::new();
        for (position, name) in names.into_iter().enumerate() {
            let name = name.as_ref().trim();
            if name.is_empty() {
                return Err(NullerError::InvalidFieldName { position: position + 1 });
            }
            if !unique.iter().any(|existing| existing == name) {
                unique.push(name.to_string());
            }
        }

        if unique.is_empty() {
            return Err(NullerError::NoFields);
        }

        Ok(Self { names: unique })
    }

    /// Number of distinct field names
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

/// JSON `null`: the remote API reads it as "clear this field".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cleared;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRecord {
    pub id: Identifier,
    pub fields: BTreeMap<String, Cleared>,
}

impl UpdateRecord {
    /// Record that sets every field in `fields` to null for `id`.
    pub fn clearing(id: Identifier, fields: &FieldSet) -> Self {
        Self {
            id,
            fields: fields.iter().map(|name| (name.to_string(), Cleared)).collect(),
        }
    }
}

/// One update request worth of records. This is also the request body shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    pub items: Vec<UpdateRecord>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Identifiers of the records in this batch, in request order
    pub fn identifiers(&self) -> impl Iterator<Item = &Identifier> {
        self.items.iter().map(|record| &record.id)
    }
}

/// Terminal result of dispatching one batch. `batch_index` is 1-based.
#[derive(Debug, Clone)]
pub enum BatchOutcome {
    Success {
        batch_index: usize,
        response_body: serde_json::Value,
    },
    Failure {
        batch_index: usize,
        error_message: String,
        batch: Batch,
        timestamp: DateTime<Utc>,
    },
}

impl BatchOutcome {
    pub fn batch_index(&self) -> usize {
        match self {
            Self::Success { batch_index, .. } | Self::Failure { batch_index, .. } => *batch_index,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Persisted shape of a failed batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDocument {
    pub error: String,
    pub batch: Batch,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total_batches: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Outcomes whose result artifact could not be written.
    pub unrecorded: usize,
    /// Batches never dispatched because the run was interrupted.
    pub not_attempted: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} succeeded, {} failed of {} batches",
            self.succeeded, self.failed, self.total_batches
        )?;
        if self.unrecorded > 0 {
            write!(f, " ({} results not saved)", self.unrecorded)?;
        }
        if self.not_attempted > 0 {
            write!(f, " ({} not attempted)", self.not_attempted)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunReport {
    /// Operator answered no at the confirmation prompt.
    Declined,
    Completed(RunSummary),
    Interrupted(RunSummary),
}

impl RunReport {
    /// Process exit status: a finished run is 0 even when batches failed.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Declined | Self::Completed(_) => 0,
            Self::Interrupted(_) => 130,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NullerError {
    #[error("Input contains no identifiers")]
    EmptyInput,

    #[error("No field names supplied")]
    NoFields,

    #[error("Field name at position {position} is blank")]
    InvalidFieldName { position: usize },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Interrupted by operator")]
    Interrupted,

    #[error("Prompt error: {0}")]
    Prompt(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, NullerError>;
