// ============================================================
// Layer 4 — Training Batcher
// ============================================================
// Implements Burn's Batcher trait to stack exported
// TrainingExamples into tensors.
//
// Examples carry one IntArray per input slot and their rank
// depends on the instance variant (a sentence slot is [w], a
// background slot is [b, w], a question of backgrounds is
// [n, b, w]). So each slot is flattened per example:
//
//   Input:  N examples, slot k of shape S_k
//   Output: inputs[k]       Int tensor [N, prod(S_k)]
//           input_shapes[k] S_k, to reshape on the model side
//           labels          Float tensor [N, label_width]
//
// All examples must already be padded to the same shapes.
//
// Reference: Burn Book §4 (Batcher)

use burn::{data::dataloader::batcher::Batcher, prelude::*, tensor::TensorData};

use crate::domain::error::{DataError, Result};
use crate::domain::training::TrainingExample;

// ─── TrainingBatch ────────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct TrainingBatch<B: Backend> {
    /// One tensor per input slot, shape [batch_size, elements per example]
    pub inputs: Vec<Tensor<B, 2, Int>>,

    /// Per-example shape of each slot before flattening
    pub input_shapes: Vec<Vec<usize>>,

    /// One-hot labels, shape [batch_size, label_width]
    pub labels: Tensor<B, 2>,
}

// ─── TrainingBatcher ──────────────────────────────────────────────────────────
#[derive(Clone, Debug)]
pub struct TrainingBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> TrainingBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }

    /// Stack `items`, checking that every example has the same slot
    /// count, slot shapes and label width as the first one.
    pub fn try_batch(&self, items: Vec<TrainingExample>) -> Result<TrainingBatch<B>> {
        let Some(first) = items.first() else {
            return Err(DataError::shape("cannot batch zero examples"));
        };
        let batch_size   = items.len();
        let input_shapes: Vec<Vec<usize>> = first.inputs.iter().map(|a| a.shape.clone()).collect();
        let label_width  = first.label.len();

        for (i, item) in items.iter().enumerate() {
            let shapes: Vec<&Vec<usize>> = item.inputs.iter().map(|a| &a.shape).collect();
            if shapes.len() != input_shapes.len() || shapes.iter().zip(&input_shapes).any(|(a, b)| *a != b) {
                return Err(DataError::shape(format!(
                    "example {i} has input shapes {shapes:?}, expected {input_shapes:?}"
                )));
            }
            if item.label.len() != label_width {
                return Err(DataError::shape(format!(
                    "example {i} has label width {}, expected {label_width}",
                    item.label.len()
                )));
            }
        }

        // ── Flatten each slot across the batch ───────────────────────────────
        let inputs = input_shapes
            .iter()
            .enumerate()
            .map(|(slot, shape)| {
                let width: usize = shape.iter().product();
                let flat: Vec<i32> = items
                    .iter()
                    .flat_map(|item| item.inputs[slot].data.iter().map(|&x| x as i32))
                    .collect();
                Tensor::<B, 2, Int>::from_data(TensorData::new(flat, [batch_size, width]), &self.device)
            })
            .collect();

        let labels_flat: Vec<f32> = items.iter().flat_map(|item| item.label.iter().copied()).collect();
        let labels = Tensor::<B, 2>::from_data(TensorData::new(labels_flat, [batch_size, label_width]), &self.device);

        Ok(TrainingBatch { inputs, input_shapes, labels })
    }
}

// ─── Burn Batcher Trait Implementation ────────────────────────────────────────
/// # Panics
/// Burn's Batcher cannot fail, so examples that do not stack
/// (unpadded data, mixed variants) panic here. Use `try_batch`
/// to get the error instead.
impl<B: Backend> Batcher<TrainingExample, TrainingBatch<B>> for TrainingBatcher<B> {
    fn batch(&self, items: Vec<TrainingExample>) -> TrainingBatch<B> {
        match self.try_batch(items) {
            Ok(batch) => batch,
            Err(e) => panic!("cannot batch training examples: {e}"),
        }
    }
}
