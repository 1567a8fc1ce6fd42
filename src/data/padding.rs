// ============================================================
// Layer 4 — Padding
// ============================================================
// Three pieces:
//
//   pad_sequence()            resize one id sequence
//   padding_lengths()         decide target lengths for a batch
//   pad_all()                 apply them to every instance
//
// Sequences are padded with 0 at the FRONT and truncated from
// the FRONT, so the tail always survives:
//
//   [5, 6, 7, 8] → length 2 → [7, 8]
//   [5, 6]       → length 4 → [0, 0, 5, 6]
//
// In question data the question itself sits at the end of a
// long set-up, and that is the part the model must see.
//
// Target lengths are the per-dimension maximum over all
// instances, unless the caller overrides a dimension.

use crate::domain::dimension::{PaddingLengths, PaddingOverrides};
use crate::domain::error::{DataError, Result};
use crate::domain::traits::IndexedInstance;

pub const PADDING_ID: u32 = 0;

/// Resize `sequence` to exactly `length`, keeping its tail.
pub fn pad_sequence(sequence: &[u32], length: usize) -> Vec<u32> {
    let kept = sequence.len().min(length);
    let mut padded = vec![PADDING_ID; length - kept];
    padded.extend_from_slice(&sequence[sequence.len() - kept..]);
    padded
}

/// Per-dimension maximum of the natural lengths of `instances`.
/// Empty input gives an empty mapping.
pub fn max_lengths<T: IndexedInstance>(instances: &[T]) -> PaddingLengths {
    let mut lengths = PaddingLengths::new();
    for instance in instances {
        lengths.max_with(&instance.get_lengths());
    }
    lengths
}

/// The mapping every instance will be padded to: the data maximum,
/// with any set override taking precedence.
pub fn padding_lengths<T: IndexedInstance>(instances: &[T], overrides: &PaddingOverrides) -> PaddingLengths {
    let mut lengths = max_lengths(instances);
    tracing::info!("Instance max lengths: {}", lengths);
    lengths.apply_overrides(overrides);
    lengths
}

/// Pad every instance to the same `lengths`. All or nothing: the
/// first failure aborts, wrapped in `DataError::AtInstance`.
pub fn pad_all<T: IndexedInstance>(instances: Vec<T>, lengths: &PaddingLengths) -> Result<Vec<T>> {
    tracing::info!("Padding {} instances to lengths: {}", instances.len(), lengths);
    instances
        .into_iter()
        .enumerate()
        .map(|(position, instance)| {
            let index = instance.index();
            instance.pad(lengths).map_err(|e| {
                tracing::error!(position, ?index, "Padding failed: {e}");
                DataError::at_instance(position, index, e)
            })
        })
        .collect()
}
