// ============================================================
// Layer 6 — Artifact Store
// ============================================================
// Saves and restores the output of a `prepare` run.
//
// What gets written to the output directory:
//   1. training_data.json    — padded (inputs, label) per instance
//   2. padding_lengths.json  — the lengths everything was padded to
//   3. prepare_config.json   — the configuration of the run
//   (tokenizer.json is written by the IndexerStore)
//
// The padding lengths are saved separately so a later run can
// pass them back as overrides and produce tensors of exactly the
// same shape.

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};

use crate::application::prepare_use_case::PrepareConfig;
use crate::domain::dimension::PaddingLengths;
use crate::domain::training::TrainingExample;

const TRAINING_DATA_FILE:   &str = "training_data.json";
const PADDING_LENGTHS_FILE: &str = "padding_lengths.json";
const CONFIG_FILE:          &str = "prepare_config.json";

pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// The directory is created by the first save, not here.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn create_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create output directory '{}'", self.dir.display()))
    }

    pub fn save_training_data(&self, examples: &[TrainingExample]) -> Result<()> {
        self.create_dir()?;
        let path = self.dir.join(TRAINING_DATA_FILE);
        let json = serde_json::to_string(examples)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write training data to '{}'", path.display()))?;
        tracing::info!("Saved {} training examples to '{}'", examples.len(), path.display());
        Ok(())
    }

    pub fn load_training_data(&self) -> Result<Vec<TrainingExample>> {
        let path = self.dir.join(TRAINING_DATA_FILE);
        let json = fs::read_to_string(&path)
            .with_context(|| {
                format!(
                    "Cannot read training data from '{}'. Have you run 'prepare' first?",
                    path.display()
                )
            })?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn save_padding_lengths(&self, lengths: &PaddingLengths) -> Result<()> {
        self.create_dir()?;
        let path = self.dir.join(PADDING_LENGTHS_FILE);
        fs::write(&path, serde_json::to_string_pretty(lengths)?)
            .with_context(|| format!("Cannot write padding lengths to '{}'", path.display()))?;
        tracing::debug!("Saved padding lengths to '{}'", path.display());
        Ok(())
    }

    pub fn load_padding_lengths(&self) -> Result<PaddingLengths> {
        let path = self.dir.join(PADDING_LENGTHS_FILE);
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read padding lengths from '{}'", path.display()))?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn save_config(&self, cfg: &PrepareConfig) -> Result<()> {
        self.create_dir()?;
        let path = self.dir.join(CONFIG_FILE);
        fs::write(&path, serde_json::to_string_pretty(cfg)?)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;
        tracing::debug!("Saved prepare config to '{}'", path.display());
        Ok(())
    }

    /// The config of the run that wrote this directory, if any.
    pub fn load_config(&self) -> Result<Option<PrepareConfig>> {
        let path = self.dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read config from '{}'", path.display()))?;
        let cfg = serde_json::from_str(&json)
            .with_context(|| format!("Cannot parse config in '{}'", path.display()))?;
        Ok(Some(cfg))
    }
}
