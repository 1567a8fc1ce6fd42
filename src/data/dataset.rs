// ============================================================
// Layer 4 — Dataset
// ============================================================
// An ordered collection of instances of one kind. The same
// container serves raw datasets (TextInstance, ...) and indexed
// ones (IndexedSentence, ...); the operations available depend
// on what the element type can do:
//
//   any T             merge, truncate
//   T: Labeled        question-shape check, label counts
//   T: Instance       group into questions, index
//   T: IndexedInstance  padding, training export
//
// Padding consumes the dataset and returns the padded one; the
// caller rebinds. Randomness (truncate, shuffled export) comes
// from an Rng the caller passes in, so runs can be seeded.
//
// Dataset<T> also implements Burn's Dataset trait so a Burn
// DataLoader can read exported examples directly.

use burn::data::dataset::Dataset as BurnDataset;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::data::instance::QuestionInstance;
use crate::data::padding;
use crate::domain::dimension::{PaddingLengths, PaddingOverrides};
use crate::domain::error::{DataError, Result};
use crate::domain::label::Label;
use crate::domain::traits::{IndexedInstance, Indexer, Instance, Labeled};
use crate::domain::training::{IntArray, TrainingExample};

/// Options per question when grouping flat instances.
pub const OPTIONS_PER_QUESTION: usize = 4;

/// Parallel input and label sequences, one entry per instance.
pub type TrainingData = (Vec<Vec<IntArray>>, Vec<Vec<f32>>);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset<T> {
    instances: Vec<T>,
}

impl<T> Dataset<T> {
    pub fn new(instances: Vec<T>) -> Self {
        Self { instances }
    }

    pub fn instances(&self) -> &[T] {
        &self.instances
    }

    pub fn into_instances(self) -> Vec<T> {
        self.instances
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Concatenate, `self` first. Both sides have the same element
    /// type; merging different kinds goes through `AnyDataset`.
    pub fn merge(mut self, other: Dataset<T>) -> Self {
        self.instances.extend(other.instances);
        self
    }

    /// Keep a uniformly random subset of `max_instances` elements.
    /// A dataset that is already small enough is returned as is.
    pub fn truncate<R: Rng + ?Sized>(self, max_instances: usize, rng: &mut R) -> Self {
        if self.instances.len() <= max_instances {
            return self;
        }
        let mut instances = self.instances;
        instances.shuffle(rng);
        instances.truncate(max_instances);
        tracing::debug!("Truncated dataset to {} instances", max_instances);
        Self { instances }
    }
}

// ─── Labels and question grouping ─────────────────────────────────────────────
/// Label summary of a dataset, logged after reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCounts {
    pub positive: usize,
    pub negative: usize,
    pub unknown:  usize,
}

impl<T: Labeled> Dataset<T> {
    pub fn label_counts(&self) -> LabelCounts {
        let mut counts = LabelCounts::default();
        for instance in &self.instances {
            match instance.label() {
                Label::Binary(true)  => counts.positive += 1,
                Label::Binary(false) => counts.negative += 1,
                _                    => counts.unknown += 1,
            }
        }
        counts
    }

    /// True when the instances are sentences of four-choice questions:
    /// the count is a multiple of four and every group of four has
    /// exactly one true label and three false ones.
    pub fn can_be_converted_to_questions(&self) -> bool {
        self.question_shape_problem().is_none()
    }

    fn question_shape_problem(&self) -> Option<String> {
        if self.instances.iter().any(|instance| instance.is_question()) {
            return Some("dataset already contains question instances".to_string());
        }
        if self.instances.len() % OPTIONS_PER_QUESTION != 0 {
            return Some(format!(
                "{} instances is not a multiple of {OPTIONS_PER_QUESTION}",
                self.instances.len()
            ));
        }
        for (i, group) in question_groups(&self.instances).enumerate() {
            let trues = group.iter().filter(|o| o.label().is_true()).count();
            let falses = group.iter().filter(|o| o.label().is_false()).count();
            if trues != 1 || falses != OPTIONS_PER_QUESTION - 1 {
                return Some(format!(
                    "question {i} has {trues} true and {falses} false labels"
                ));
            }
        }
        None
    }
}

/// The stride-4 columns `instances[k::4]` zipped back together.
/// Row j of that zip is `instances[4j..4j + 4]`, so each question
/// is four consecutive instances.
fn question_groups<T>(instances: &[T]) -> impl Iterator<Item = &[T]> {
    instances.chunks_exact(OPTIONS_PER_QUESTION)
}

impl<T: Instance> Dataset<T> {
    /// Group every four instances into one question whose label is
    /// the position of its true option.
    pub fn to_question_dataset(&self) -> Result<Dataset<QuestionInstance<T>>> {
        if let Some(problem) = self.question_shape_problem() {
            return Err(DataError::NotQuestionShaped(problem));
        }
        let questions: Vec<_> = question_groups(&self.instances)
            .map(|group| QuestionInstance::new(group.to_vec()))
            .collect();
        tracing::info!("Grouped {} instances into {} questions", self.instances.len(), questions.len());
        Ok(Dataset::new(questions))
    }

    pub fn to_indexed_dataset<X: Indexer>(&self, indexer: &X) -> Result<Dataset<T::Indexed>> {
        let indexed = self.instances
            .iter()
            .map(|instance| indexer.index_instance(instance))
            .collect::<Result<Vec<_>>>()?;
        Ok(Dataset::new(indexed))
    }
}

// ─── Padding and export ───────────────────────────────────────────────────────
impl<T: IndexedInstance> Dataset<T> {
    pub fn padding_lengths(&self, overrides: &PaddingOverrides) -> PaddingLengths {
        padding::padding_lengths(&self.instances, overrides)
    }

    /// Pad every instance to the data maximum, or to the override
    /// where one is set. Returns the padded dataset and the lengths used.
    pub fn pad_instances(self, overrides: &PaddingOverrides) -> Result<(Self, PaddingLengths)> {
        let lengths = self.padding_lengths(overrides);
        let padded = self.pad_to(&lengths)?;
        Ok((padded, lengths))
    }

    pub fn pad_to(self, lengths: &PaddingLengths) -> Result<Self> {
        Ok(Self::new(padding::pad_all(self.instances, lengths)?))
    }

    /// (inputs, labels) in dataset order.
    pub fn as_training_data(&self) -> Result<TrainingData> {
        let mut inputs = Vec::with_capacity(self.instances.len());
        let mut labels = Vec::with_capacity(self.instances.len());
        for example in self.training_examples()? {
            inputs.push(example.inputs);
            labels.push(example.label);
        }
        Ok((inputs, labels))
    }

    /// Shuffle the instances in place, then export.
    pub fn shuffled_training_data<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<TrainingData> {
        self.instances.shuffle(rng);
        self.as_training_data()
    }

    pub fn training_examples(&self) -> Result<Vec<TrainingExample>> {
        self.instances
            .iter()
            .enumerate()
            .map(|(position, instance)| {
                instance.as_training_data().map_err(|e| {
                    tracing::error!(position, index = ?instance.index(), "Export failed: {e}");
                    DataError::at_instance(position, instance.index(), e)
                })
            })
            .collect()
    }
}

// ─── Burn Dataset Trait Implementation ────────────────────────────────────────
impl<T: Clone + Send + Sync> BurnDataset<T> for Dataset<T> {
    fn get(&self, index: usize) -> Option<T> {
        self.instances.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.instances.len()
    }
}
