// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The seams of the data pipeline:
//
//   Labeled          → anything a Dataset can reason about when
//                      grouping instances into questions
//   Instance         → a raw, text-level example that an Indexer
//                      can turn into an IndexedInstance
//   Indexer          → vocabulary lookup (token → stable id)
//   IndexedInstance  → an example made of ids, which can report
//                      its lengths, pad itself and export arrays
//
// Every concrete variant (sentence, logical form, background,
// question) implements the whole capability set; questions are
// generic over the variant of their options.

use std::fmt;

use crate::domain::dimension::PaddingLengths;
use crate::domain::error::{DataError, Result};
use crate::domain::label::Label;
use crate::domain::training::{one_hot, IntArray, TrainingExample};

// ─── Labeled ──────────────────────────────────────────────────────────────────
pub trait Labeled {
    fn label(&self) -> Label;

    /// Position of the example in its source file, if known.
    fn index(&self) -> Option<usize>;

    /// True for composite question instances.
    fn is_question(&self) -> bool {
        false
    }
}

// ─── Indexer ──────────────────────────────────────────────────────────────────
/// Maps text to integer ids. Implementations must be referentially
/// transparent and agree on an out-of-vocabulary id.
pub trait Indexer {
    /// Tokenise and index a sentence.
    fn index_text(&self, text: &str) -> Result<Vec<u32>>;

    /// Index a single, already tokenised symbol.
    fn index_symbol(&self, symbol: &str) -> Result<u32>;

    fn index_instance<I: Instance>(&self, raw: &I) -> Result<I::Indexed>
    where
        Self: Sized,
    {
        raw.to_indexed_instance(self)
    }
}

// ─── Instance ─────────────────────────────────────────────────────────────────
pub trait Instance: Labeled + Clone + fmt::Debug {
    type Indexed: IndexedInstance;

    /// Free text of this instance. An indexer being fitted splits it
    /// the same way `index_text` does.
    fn texts(&self) -> Vec<&str>;

    /// Whole symbols that are indexed to one id each.
    fn symbols(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    fn to_indexed_instance<X: Indexer>(&self, indexer: &X) -> Result<Self::Indexed>;
}

// ─── IndexedInstance ──────────────────────────────────────────────────────────
pub trait IndexedInstance: Labeled + Clone + fmt::Debug {
    /// A zero-content instance of the same variant, used as filler
    /// when a question needs more options.
    fn empty_instance() -> Self
    where
        Self: Sized;

    /// The natural, unpadded lengths of this instance.
    fn get_lengths(&self) -> PaddingLengths;

    /// Pad (or truncate) every dimension this variant owns to the
    /// lengths in `lengths`. Missing dimensions are an error.
    fn pad(self, lengths: &PaddingLengths) -> Result<Self>
    where
        Self: Sized;

    /// The input arrays of a padded instance. Does not look at the label.
    fn training_inputs(&self) -> Result<Vec<IntArray>>;

    /// One-hot label: `[1, 0]` for false, `[0, 1]` for true.
    fn training_label(&self) -> Result<Vec<f32>> {
        match self.label() {
            Label::Binary(value) => Ok(one_hot(2, usize::from(value))),
            _ => Err(DataError::UnlabeledInstance { index: self.index() }),
        }
    }

    fn as_training_data(&self) -> Result<TrainingExample> {
        Ok(TrainingExample {
            inputs: self.training_inputs()?,
            label:  self.training_label()?,
        })
    }
}
