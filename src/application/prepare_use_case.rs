// ============================================================
// Layer 2 — PrepareUseCase
// ============================================================
// Orchestrates the full preparation pipeline in order:
//
//   Step 1: Read and merge instance files   (Layer 4 - data)
//   Step 2: Attach background, if given     (Layer 4 - data)
//   Step 3: Group into questions, if asked  (Layer 4 - data)
//   Step 4: Truncate to max_instances       (Layer 4 - data)
//   Step 5: Fit or load the indexer         (Layer 6 - infra)
//   Step 6: Index every instance            (Layer 4 - data)
//   Step 7: Pad to common lengths           (Layer 4 - data)
//   Step 8: Export (shuffled or in order)   (Layer 4 - data)
//   Step 9: Save artifacts                  (Layer 6 - infra)
//
// Dataset statistics are collected after steps 1, 3 and 4. The
// output directory is only written in Step 9, so a failed run
// leaves nothing behind for a later run to pick up.

use anyhow::{bail, Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::data::{
    any_dataset::AnyDataset,
    dataset::Dataset,
    loader::{read_background_from_file, InstanceFileLoader},
};
use crate::domain::dimension::{PaddingLengths, PaddingOverrides};
use crate::domain::label::Label;
use crate::domain::training::TrainingExample;
use crate::domain::traits::Instance;
use crate::infra::{
    artifact::ArtifactStore,
    indexer::{DataIndexer, IndexerStore},
    metrics::{StageStats, StatsLogger},
};

// ─── Preparation Configuration ───────────────────────────────────────────────
// Everything a prepare run needs. Saved next to the artifacts as
// prepare_config.json so a run can be reproduced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepareConfig {
    pub inputs:        Vec<String>,
    pub default_label: Option<bool>,
    pub background:    Option<String>,
    pub questions:     bool,
    pub max_instances: Option<usize>,
    pub padding:       PaddingOverrides,
    pub vocab_size:    usize,
    pub seed:          Option<u64>,
    pub shuffle:       bool,
    pub output_dir:    String,
}

impl Default for PrepareConfig {
    fn default() -> Self {
        Self {
            inputs:        Vec::new(),
            default_label: None,
            background:    None,
            questions:     false,
            max_instances: None,
            padding:       PaddingOverrides::default(),
            vocab_size:    10_000,
            seed:          None,
            shuffle:       true,
            output_dir:    "prepared".to_string(),
        }
    }
}

/// What a finished run produced
#[derive(Debug, Clone)]
pub struct PrepareSummary {
    pub instances:       usize,
    pub padding_lengths: PaddingLengths,
    pub output_dir:      String,
}

// ─── PrepareUseCase ──────────────────────────────────────────────────────────
pub struct PrepareUseCase {
    config: PrepareConfig,
}

impl PrepareUseCase {
    pub fn new(config: PrepareConfig) -> Self {
        Self { config }
    }

    /// Execute the full preparation pipeline end to end
    pub fn execute(&self) -> Result<PrepareSummary> {
        let cfg = &self.config;
        if cfg.inputs.is_empty() {
            bail!("No input files given. Pass at least one --input.");
        }

        let mut rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None       => StdRng::from_entropy(),
        };
        let mut run = Run {
            cfg,
            artifacts: ArtifactStore::new(&cfg.output_dir),
            stages:    Vec::new(),
            rng:       &mut rng,
        };

        // ── Step 1: Read and merge instance files ────────────────────────────
        let dataset = self.read_inputs()?;
        run.stages.push(StageStats::new("read", dataset.len(), dataset.label_counts()));

        // ── Step 2: Attach background ────────────────────────────────────────
        let dataset = match (&cfg.background, dataset) {
            (None, dataset) => dataset,
            (Some(path), AnyDataset::Text(sentences)) => {
                read_background_from_file(sentences, Path::new(path))
                    .with_context(|| format!("Cannot read background file '{path}'"))?
                    .into()
            }
            (Some(_), other) => bail!(
                "Background can only be attached to sentence instances, not {} instances",
                other.kind()
            ),
        };

        match dataset {
            AnyDataset::Text(d)        => run.group_and_finish(d),
            AnyDataset::Background(d)  => run.group_and_finish(d),
            AnyDataset::LogicalForm(d) => run.group_and_finish(d),
        }
    }

    fn read_inputs(&self) -> Result<AnyDataset> {
        let default_label = Label::from(self.config.default_label);
        let mut merged: Option<AnyDataset> = None;
        for input in &self.config.inputs {
            let loaded = InstanceFileLoader::new(input, default_label)
                .load()
                .with_context(|| format!("Cannot read instances from '{input}'"))?;
            tracing::info!("Read {} {} instances from '{}'", loaded.len(), loaded.kind(), input);
            merged = Some(match merged {
                None       => loaded,
                Some(prev) => prev
                    .merge(loaded)
                    .with_context(|| format!("Cannot merge '{input}' with the previous inputs"))?,
            });
        }
        merged.context("No input files given")
    }
}

// State shared by the typed steps of one run. Nothing is written
// to the output directory before Step 9.
struct Run<'a> {
    cfg:       &'a PrepareConfig,
    artifacts: ArtifactStore,
    stages:    Vec<StageStats>,
    rng:       &'a mut StdRng,
}

impl Run<'_> {
    // ── Step 3: Group into questions ─────────────────────────────────────────
    fn group_and_finish<T: Instance>(&mut self, dataset: Dataset<T>) -> Result<PrepareSummary> {
        if !self.cfg.questions {
            return self.finish(dataset);
        }
        let questions = dataset.to_question_dataset()?;
        self.stages.push(StageStats::new("questions", questions.len(), questions.label_counts()));
        self.finish(questions)
    }

    fn finish<T: Instance>(&mut self, dataset: Dataset<T>) -> Result<PrepareSummary> {
        let cfg = self.cfg;

        // ── Step 4: Truncate ─────────────────────────────────────────────────
        let dataset = match cfg.max_instances {
            Some(max) => {
                let truncated = dataset.truncate(max, &mut *self.rng);
                self.stages.push(StageStats::new("truncate", truncated.len(), truncated.label_counts()));
                truncated
            }
            None => dataset,
        };

        // ── Step 5: Fit or reuse the indexer ─────────────────────────────────
        let indexer_store = IndexerStore::new(&cfg.output_dir);
        let indexer = match indexer_store.load()? {
            Some(existing) => self.check_reused_indexer(existing)?,
            None => {
                tracing::info!("Fitting new indexer (vocab_size={})", cfg.vocab_size);
                DataIndexer::fit(&dataset, cfg.vocab_size)?
            }
        };

        // ── Step 6: Index ────────────────────────────────────────────────────
        let indexed = dataset.to_indexed_dataset(&indexer)?;

        // ── Step 7: Pad ──────────────────────────────────────────────────────
        let (mut padded, lengths) = indexed.pad_instances(&cfg.padding)?;
        tracing::info!("Padded {} instances to {}", padded.len(), lengths);

        // ── Step 8: Export ───────────────────────────────────────────────────
        let examples: Vec<TrainingExample> = if cfg.shuffle {
            let (inputs, labels) = padded.shuffled_training_data(&mut *self.rng)?;
            inputs
                .into_iter()
                .zip(labels)
                .map(|(inputs, label)| TrainingExample { inputs, label })
                .collect()
        } else {
            padded.training_examples()?
        };

        // ── Step 9: Save artifacts ───────────────────────────────────────────
        indexer_store.save(&indexer)?;
        self.artifacts.save_padding_lengths(&lengths)?;
        self.artifacts.save_training_data(&examples)?;
        self.artifacts.save_config(cfg)?;
        let stats = StatsLogger::new(&cfg.output_dir)?;
        for stage in &self.stages {
            stats.log(stage)?;
        }

        Ok(PrepareSummary {
            instances:       examples.len(),
            padding_lengths: lengths,
            output_dir:      cfg.output_dir.clone(),
        })
    }

    /// A tokenizer.json left by an earlier run is only reused when it
    /// was fitted with the same vocabulary size.
    fn check_reused_indexer(&self, existing: DataIndexer) -> Result<DataIndexer> {
        let cfg = self.cfg;
        match self.artifacts.load_config()? {
            Some(previous) if previous.vocab_size != cfg.vocab_size => bail!(
                "'{}' holds a tokenizer fitted with --vocab-size {}, but this run asks for {}. \
                 Use a fresh --output-dir.",
                cfg.output_dir,
                previous.vocab_size,
                cfg.vocab_size
            ),
            Some(_) => {}
            None if existing.vocab_size() > cfg.vocab_size => bail!(
                "'{}' holds a tokenizer with {} ids, more than --vocab-size {}. \
                 Use a fresh --output-dir.",
                cfg.output_dir,
                existing.vocab_size(),
                cfg.vocab_size
            ),
            None => tracing::warn!(
                "Reusing a tokenizer with {} ids from '{}' that has no prepare_config.json",
                existing.vocab_size(),
                cfg.output_dir
            ),
        }
        tracing::info!("Reusing existing indexer with {} ids", existing.vocab_size());
        Ok(existing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dimension::Dimension;
    use std::fs;

    fn write(dir: &Path, name: &str, content: &str) -> String {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path.display().to_string()
    }

    fn config(dir: &Path, inputs: Vec<String>) -> PrepareConfig {
        PrepareConfig {
            inputs,
            seed:       Some(7),
            output_dir: dir.join("out").display().to_string(),
            ..Default::default()
        }
    }

    const EIGHT_OPTIONS: &str = "\
0\tthe sky is blue\t1
1\tthe sky is green\t0
2\tthe sky is red\t0
3\tthe sky is plaid and striped\t0
4\tgrass is red\t0
5\tgrass is green\t1
6\tgrass is blue\t0
7\tgrass is purple\t0
";

    #[test]
    fn test_sentences_are_padded_and_saved() {
        let dir = tempfile::tempdir().unwrap();
        let input = write(dir.path(), "train.tsv", "the sky is blue\t1\nsnow\t0\n");
        let cfg = PrepareConfig { shuffle: false, ..config(dir.path(), vec![input]) };

        let summary = PrepareUseCase::new(cfg.clone()).execute().unwrap();
        assert_eq!(summary.instances, 2);
        assert_eq!(summary.padding_lengths.get(Dimension::WordSequenceLength), Some(4));

        let store = ArtifactStore::new(&cfg.output_dir);
        let examples = store.load_training_data().unwrap();
        assert_eq!(examples[0].label, vec![0.0, 1.0]);
        assert_eq!(examples[1].label, vec![1.0, 0.0]);
        assert_eq!(examples[1].inputs[0].shape, vec![4]);
        assert_eq!(&examples[1].inputs[0].data[..3], &[0, 0, 0]);
        assert!(Path::new(&cfg.output_dir).join("tokenizer.json").exists());
        assert!(Path::new(&cfg.output_dir).join("stats.csv").exists());
    }

    #[test]
    fn test_questions_get_option_labels() {
        let dir = tempfile::tempdir().unwrap();
        let input = write(dir.path(), "questions.tsv", EIGHT_OPTIONS);
        let cfg = PrepareConfig {
            questions: true,
            shuffle:   false,
            ..config(dir.path(), vec![input])
        };

        let summary = PrepareUseCase::new(cfg.clone()).execute().unwrap();
        assert_eq!(summary.instances, 2);
        assert_eq!(summary.padding_lengths.get(Dimension::NumOptions), Some(4));
        assert_eq!(summary.padding_lengths.get(Dimension::WordSequenceLength), Some(6));

        let examples = ArtifactStore::new(&cfg.output_dir).load_training_data().unwrap();
        assert_eq!(examples[0].label, vec![1.0, 0.0, 0.0, 0.0]);
        assert_eq!(examples[1].label, vec![0.0, 1.0, 0.0, 0.0]);
        assert_eq!(examples[0].inputs[0].shape, vec![4, 6]);
    }

    #[test]
    fn test_overrides_win_over_data() {
        let dir = tempfile::tempdir().unwrap();
        let input = write(dir.path(), "questions.tsv", EIGHT_OPTIONS);
        let cfg = PrepareConfig {
            questions: true,
            padding:   PaddingOverrides {
                word_sequence_length: Some(3),
                num_options:          Some(5),
                ..Default::default()
            },
            ..config(dir.path(), vec![input])
        };

        let summary = PrepareUseCase::new(cfg.clone()).execute().unwrap();
        assert_eq!(summary.padding_lengths.get(Dimension::WordSequenceLength), Some(3));
        assert_eq!(summary.padding_lengths.get(Dimension::NumOptions), Some(5));

        let examples = ArtifactStore::new(&cfg.output_dir).load_training_data().unwrap();
        for example in &examples {
            assert_eq!(example.inputs[0].shape, vec![5, 3]);
            assert_eq!(example.label.len(), 5);
        }
    }

    #[test]
    fn test_mixed_input_kinds_fail_to_merge() {
        let dir = tempfile::tempdir().unwrap();
        let sentences = write(dir.path(), "train.tsv", "the sky is blue\t1\n");
        let forms = write(dir.path(), "train.lf", "blue(sky)\t1\n");

        let err = PrepareUseCase::new(config(dir.path(), vec![sentences, forms]))
            .execute()
            .unwrap_err();
        assert!(format!("{err:#}").contains("different types"));
    }

    #[test]
    fn test_background_needs_sentences() {
        let dir = tempfile::tempdir().unwrap();
        let forms = write(dir.path(), "train.lf", "blue(sky)\t1\n");
        let background = write(dir.path(), "background.tsv", "0\tthe sky is blue\n");
        let cfg = PrepareConfig {
            background: Some(background),
            ..config(dir.path(), vec![forms])
        };

        let err = PrepareUseCase::new(cfg).execute().unwrap_err();
        assert!(err.to_string().contains("logical-form"));
    }

    #[test]
    fn test_truncation_keeps_requested_count() {
        let dir = tempfile::tempdir().unwrap();
        let input = write(dir.path(), "train.tsv", EIGHT_OPTIONS);
        let cfg = PrepareConfig { max_instances: Some(3), ..config(dir.path(), vec![input]) };

        let summary = PrepareUseCase::new(cfg).execute().unwrap();
        assert_eq!(summary.instances, 3);
    }

    #[test]
    fn test_no_inputs_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(PrepareUseCase::new(config(dir.path(), Vec::new())).execute().is_err());
    }

    #[test]
    fn test_failed_run_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let unlabelled = write(dir.path(), "unlabelled.tsv", "plants grow\n");
        let cfg = config(dir.path(), vec![unlabelled]);

        let err = PrepareUseCase::new(cfg.clone()).execute().unwrap_err();
        assert!(format!("{err:#}").contains("position 0"));
        assert!(!Path::new(&cfg.output_dir).exists());

        let labelled = write(dir.path(), "labelled.tsv", "plants need light\t1\n");
        let cfg = PrepareConfig { shuffle: false, ..config(dir.path(), vec![labelled]) };
        PrepareUseCase::new(cfg.clone()).execute().unwrap();

        let examples = ArtifactStore::new(&cfg.output_dir).load_training_data().unwrap();
        assert_eq!(examples[0].inputs[0].data.len(), 3);
        assert!(examples[0].inputs[0].data.iter().all(|id| *id > 1));
    }

    #[test]
    fn test_reused_tokenizer_needs_same_vocab_size() {
        let dir = tempfile::tempdir().unwrap();
        let input = write(dir.path(), "train.tsv", "the sky is blue\t1\n");
        let cfg = PrepareConfig { vocab_size: 100, ..config(dir.path(), vec![input]) };
        PrepareUseCase::new(cfg.clone()).execute().unwrap();

        let smaller = PrepareConfig { vocab_size: 50, ..cfg.clone() };
        let err = PrepareUseCase::new(smaller).execute().unwrap_err();
        assert!(err.to_string().contains("--vocab-size 100"), "{err}");

        assert!(PrepareUseCase::new(cfg).execute().is_ok());
    }
}
