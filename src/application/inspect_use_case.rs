// ============================================================
// Layer 2 — Inspect Use Case
// ============================================================
// Loads the artifacts of a previous `prepare` run and checks that
// they stack: the first batch is pushed through the
// TrainingBatcher on the CPU backend.

use anyhow::{Context, Result};
use burn::backend::NdArray;

use crate::application::prepare_use_case::PrepareConfig;
use crate::data::batcher::TrainingBatcher;
use crate::domain::dimension::PaddingLengths;
use crate::infra::artifact::ArtifactStore;

type InspectBackend = NdArray;

/// What `inspect` found in an output directory
#[derive(Debug, Clone)]
pub struct InspectReport {
    /// The config of the run, if it was saved
    pub config:          Option<PrepareConfig>,
    pub padding_lengths: PaddingLengths,
    pub instances:       usize,
    /// Per-example shape of each input slot
    pub input_shapes:    Vec<Vec<usize>>,
    pub label_width:     usize,
    /// Dims of each input tensor in the first batch
    pub batch_dims:      Vec<[usize; 2]>,
}

pub struct InspectUseCase {
    store:      ArtifactStore,
    batch_size: usize,
}

impl InspectUseCase {
    pub fn new(output_dir: &str, batch_size: usize) -> Self {
        Self { store: ArtifactStore::new(output_dir), batch_size: batch_size.max(1) }
    }

    pub fn execute(&self) -> Result<InspectReport> {
        let config          = self.store.load_config()?;
        let padding_lengths = self.store.load_padding_lengths()?;
        let examples        = self.store.load_training_data()?;

        let Some(first) = examples.first() else {
            return Ok(InspectReport {
                config,
                padding_lengths,
                instances:    0,
                input_shapes: Vec::new(),
                label_width:  0,
                batch_dims:   Vec::new(),
            });
        };
        let input_shapes = first.inputs.iter().map(|a| a.shape.clone()).collect();
        let label_width  = first.label.len();

        let device  = Default::default();
        let batcher = TrainingBatcher::<InspectBackend>::new(device);
        let head    = examples.iter().take(self.batch_size).cloned().collect();
        let batch   = batcher
            .try_batch(head)
            .context("Saved training data does not stack into tensors")?;
        let batch_dims = batch.inputs.iter().map(|t| t.dims()).collect();
        tracing::debug!("First batch labels: {:?}", batch.labels.dims());

        Ok(InspectReport {
            config,
            padding_lengths,
            instances: examples.len(),
            input_shapes,
            label_width,
            batch_dims,
        })
    }
}
