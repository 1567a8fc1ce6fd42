// ============================================================
// Layer 3 — Padding Dimensions
// ============================================================
// Names the axes an instance can be padded along, and the
// mapping from axis to length that flows through get_lengths()
// and pad().
//
//   word_sequence_length → token ids of a sentence (and of each
//                          background snippet, same encoder)
//   transition_length    → shift/reduce ops of a logical form
//   background_sentences → number of background snippets
//   num_options          → number of answer options per question
//
// Each instance variant reports only the dimensions it owns;
// the padding coordinator unions them across a dataset.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::error::{DataError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    WordSequenceLength,
    TransitionLength,
    BackgroundSentences,
    NumOptions,
}

impl Dimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::WordSequenceLength  => "word_sequence_length",
            Dimension::TransitionLength    => "transition_length",
            Dimension::BackgroundSentences => "background_sentences",
            Dimension::NumOptions          => "num_options",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── PaddingLengths ──────────────────────────────────────────────────────────
/// A length per padding dimension.
///
/// Used both for the natural lengths an instance reports and for
/// the target lengths every instance is padded to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaddingLengths(BTreeMap<Dimension, usize>);

impl PaddingLengths {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy for literals in callers and tests.
    pub fn with(mut self, dim: Dimension, length: usize) -> Self {
        self.0.insert(dim, length);
        self
    }

    pub fn set(&mut self, dim: Dimension, length: usize) {
        self.0.insert(dim, length);
    }

    /// Length for a dimension the caller requires.
    ///
    /// A missing key means the mapping did not come from an
    /// aggregation over this instance type: that is a pipeline bug,
    /// so it is an error rather than a silent default.
    pub fn require(&self, dim: Dimension) -> Result<usize> {
        self.0.get(&dim).copied().ok_or(DataError::MissingPaddingKey(dim))
    }

    pub fn get(&self, dim: Dimension) -> Option<usize> {
        self.0.get(&dim).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Dimension, usize)> + '_ {
        self.0.iter().map(|(d, l)| (*d, *l))
    }

    /// Raise every dimension to at least the value in `other`,
    /// adding dimensions this mapping does not have yet.
    pub fn max_with(&mut self, other: &PaddingLengths) {
        for (dim, length) in other.iter() {
            let entry = self.0.entry(dim).or_insert(0);
            *entry = (*entry).max(length);
        }
    }

    /// Replace computed lengths with the overrides that are set.
    /// Overrides for dimensions this mapping does not contain are ignored.
    pub fn apply_overrides(&mut self, overrides: &PaddingOverrides) {
        for (dim, length) in self.0.iter_mut() {
            if let Some(value) = overrides.get(*dim) {
                *length = value;
            }
        }
    }
}

impl fmt::Display for PaddingLengths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|(d, l)| format!("{d}={l}")).collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}

// ─── PaddingOverrides ────────────────────────────────────────────────────────
/// User-supplied target lengths. `None` means "use the value
/// computed from the data".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaddingOverrides {
    pub word_sequence_length: Option<usize>,
    pub transition_length:    Option<usize>,
    pub background_sentences: Option<usize>,
    pub num_options:          Option<usize>,
}

impl PaddingOverrides {
    pub fn get(&self, dim: Dimension) -> Option<usize> {
        match dim {
            Dimension::WordSequenceLength  => self.word_sequence_length,
            Dimension::TransitionLength    => self.transition_length,
            Dimension::BackgroundSentences => self.background_sentences,
            Dimension::NumOptions          => self.num_options,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_missing_key_is_error() {
        let lengths = PaddingLengths::new().with(Dimension::WordSequenceLength, 4);
        assert_eq!(lengths.require(Dimension::WordSequenceLength).unwrap(), 4);
        assert!(matches!(
            lengths.require(Dimension::TransitionLength),
            Err(DataError::MissingPaddingKey(Dimension::TransitionLength))
        ));
    }

    #[test]
    fn test_max_with_unions_keys() {
        let mut a = PaddingLengths::new().with(Dimension::WordSequenceLength, 3);
        let b = PaddingLengths::new()
            .with(Dimension::WordSequenceLength, 5)
            .with(Dimension::TransitionLength, 2);
        a.max_with(&b);
        assert_eq!(a.get(Dimension::WordSequenceLength), Some(5));
        assert_eq!(a.get(Dimension::TransitionLength), Some(2));
    }

    #[test]
    fn test_overrides_only_touch_present_dimensions() {
        let mut lengths = PaddingLengths::new().with(Dimension::WordSequenceLength, 5);
        let overrides = PaddingOverrides {
            word_sequence_length: Some(7),
            num_options: Some(4),
            ..Default::default()
        };
        lengths.apply_overrides(&overrides);
        assert_eq!(lengths.get(Dimension::WordSequenceLength), Some(7));
        assert_eq!(lengths.get(Dimension::NumOptions), None);
    }

    #[test]
    fn test_serialises_with_snake_case_keys() {
        let lengths = PaddingLengths::new().with(Dimension::NumOptions, 4);
        let json = serde_json::to_string(&lengths).unwrap();
        assert_eq!(json, r#"{"num_options":4}"#);
    }
}
