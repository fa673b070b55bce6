use crate::types::{Batch, FieldSet, Identifier, UpdateRecord, MAX_BATCH_SIZE};
use tracing::debug;

/// Groups identifiers into fixed-size batches of field-clearing records.
#[derive(Debug, Clone, Copy)]
pub struct BatchBuilder {
    batch_size: usize,
}

impl Default for BatchBuilder {
    fn default() -> Self {
        Self::new(MAX_BATCH_SIZE)
    }
}

impl BatchBuilder {
    /// `batch_size` is clamped to `1..=MAX_BATCH_SIZE`.
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.clamp(1, MAX_BATCH_SIZE),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Contiguous, order-preserving partition; only the last batch may be short.
    pub fn build(&self, identifiers: &[Identifier], fields: &FieldSet) -> Vec<Batch> {
        let batches: Vec<Batch> = identifiers
            .chunks(self.batch_size)
            .map(|chunk| Batch {
                items: chunk
                    .iter()
                    .map(|id| UpdateRecord::clearing(id.clone(), fields))
                    .collect(),
            })
            .collect();

        debug!(
            "Built {} batches from {} identifiers ({} fields each)",
            batches.len(),
            identifiers.len(),
            fields.len()
        );
        batches
    }
}
