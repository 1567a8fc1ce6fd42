// ============================================================
// Layer 4 — Indexed Instances
// ============================================================
// An instance after vocabulary lookup: only integer ids, whose
// meaning lives in the indexer.
//
//   IndexedSentence       word_indices
//   IndexedLogicalForm    word_indices + transitions
//   IndexedBackground     word_indices + background_indices
//   IndexedQuestion<T>    options: Vec<T> + correct option index
//
// The logical-form and background variants wrap an
// IndexedSentence as `base` and extend what it reports, so
// word_indices padding is defined in exactly one place.
//
// pad() consumes the instance and returns the padded one.

use serde::{Deserialize, Serialize};

use crate::data::padding::{pad_sequence, PADDING_ID};
use crate::domain::dimension::{Dimension, PaddingLengths};
use crate::domain::error::{DataError, Result};
use crate::domain::label::Label;
use crate::domain::traits::{IndexedInstance, Labeled};
use crate::domain::training::{one_hot, IntArray};

// ─── IndexedSentence ──────────────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedSentence {
    pub word_indices: Vec<u32>,
    pub label:        Label,
    pub index:        Option<usize>,
}

impl IndexedSentence {
    pub fn new(word_indices: Vec<u32>, label: impl Into<Label>, index: Option<usize>) -> Self {
        Self { word_indices, label: label.into(), index }
    }
}

impl Labeled for IndexedSentence {
    fn label(&self) -> Label {
        self.label
    }

    fn index(&self) -> Option<usize> {
        self.index
    }
}

impl IndexedInstance for IndexedSentence {
    fn empty_instance() -> Self {
        Self::new(Vec::new(), Label::Unset, None)
    }

    fn get_lengths(&self) -> PaddingLengths {
        PaddingLengths::new().with(Dimension::WordSequenceLength, self.word_indices.len())
    }

    fn pad(self, lengths: &PaddingLengths) -> Result<Self> {
        let length = lengths.require(Dimension::WordSequenceLength)?;
        Ok(Self { word_indices: pad_sequence(&self.word_indices, length), ..self })
    }

    fn training_inputs(&self) -> Result<Vec<IntArray>> {
        Ok(vec![IntArray::from_vec(self.word_indices.clone())])
    }
}

// ─── IndexedLogicalForm ───────────────────────────────────────────────────────
/// A tree-structured instance: symbols in `base.word_indices` and
/// the shift/reduce ops that rebuild the tree. The two sequences
/// are padded to independent lengths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedLogicalForm {
    pub base:        IndexedSentence,
    pub transitions: Vec<u32>,
}

impl IndexedLogicalForm {
    pub fn new(word_indices: Vec<u32>, transitions: Vec<u32>, label: impl Into<Label>, index: Option<usize>) -> Self {
        Self { base: IndexedSentence::new(word_indices, label, index), transitions }
    }
}

impl Labeled for IndexedLogicalForm {
    fn label(&self) -> Label {
        self.base.label
    }

    fn index(&self) -> Option<usize> {
        self.base.index
    }
}

impl IndexedInstance for IndexedLogicalForm {
    fn empty_instance() -> Self {
        Self { base: IndexedSentence::empty_instance(), transitions: Vec::new() }
    }

    fn get_lengths(&self) -> PaddingLengths {
        self.base.get_lengths().with(Dimension::TransitionLength, self.transitions.len())
    }

    fn pad(self, lengths: &PaddingLengths) -> Result<Self> {
        let transition_length = lengths.require(Dimension::TransitionLength)?;
        Ok(Self {
            base:        self.base.pad(lengths)?,
            transitions: pad_sequence(&self.transitions, transition_length),
        })
    }

    fn training_inputs(&self) -> Result<Vec<IntArray>> {
        let mut inputs = self.base.training_inputs()?;
        inputs.push(IntArray::from_vec(self.transitions.clone()));
        Ok(inputs)
    }
}

// ─── IndexedBackground ────────────────────────────────────────────────────────
/// A sentence plus indexed background snippets. Sentence and
/// snippets go through the same encoder, so they share the
/// word_sequence_length dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedBackground {
    pub base:               IndexedSentence,
    pub background_indices: Vec<Vec<u32>>,
}

impl IndexedBackground {
    pub fn new(word_indices: Vec<u32>, background_indices: Vec<Vec<u32>>, label: impl Into<Label>, index: Option<usize>) -> Self {
        Self { base: IndexedSentence::new(word_indices, label, index), background_indices }
    }
}

impl Labeled for IndexedBackground {
    fn label(&self) -> Label {
        self.base.label
    }

    fn index(&self) -> Option<usize> {
        self.base.index
    }
}

impl IndexedInstance for IndexedBackground {
    fn empty_instance() -> Self {
        Self { base: IndexedSentence::empty_instance(), background_indices: Vec::new() }
    }

    fn get_lengths(&self) -> PaddingLengths {
        let longest_snippet = self.background_indices.iter().map(Vec::len).max().unwrap_or(0);
        let word_length = self.base.word_indices.len().max(longest_snippet);
        PaddingLengths::new()
            .with(Dimension::WordSequenceLength, word_length)
            .with(Dimension::BackgroundSentences, self.background_indices.len())
    }

    /// Snippet count is cut from the end (the first snippets are kept)
    /// and grown with all-padding snippets; each snippet is then
    /// padded like a sentence.
    fn pad(self, lengths: &PaddingLengths) -> Result<Self> {
        let word_length = lengths.require(Dimension::WordSequenceLength)?;
        let num_snippets = lengths.require(Dimension::BackgroundSentences)?;

        let mut background = self.background_indices;
        background.truncate(num_snippets);
        background.resize_with(num_snippets, || vec![PADDING_ID]);

        let background_indices = background
            .iter()
            .map(|snippet| pad_sequence(snippet, word_length))
            .collect();

        Ok(Self { base: self.base.pad(lengths)?, background_indices })
    }

    fn training_inputs(&self) -> Result<Vec<IntArray>> {
        let mut inputs = self.base.training_inputs()?;
        let width = self.base.word_indices.len();
        inputs.push(IntArray::from_rows(&self.background_indices, width)?);
        Ok(inputs)
    }
}

// ─── IndexedQuestion ──────────────────────────────────────────────────────────
/// A multiple-choice question over options of one variant `T`.
///
/// The question has no word sequence of its own; everything lives
/// in `options`. Its label is the index of the correct option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedQuestion<T> {
    pub options: Vec<T>,
    pub label:   Label,
}

impl<T> IndexedQuestion<T> {
    pub fn new(options: Vec<T>, label: Label) -> Self {
        Self { options, label }
    }
}

impl<T> Labeled for IndexedQuestion<T> {
    fn label(&self) -> Label {
        self.label
    }

    fn index(&self) -> Option<usize> {
        None
    }

    fn is_question(&self) -> bool {
        true
    }
}

impl<T: IndexedInstance> IndexedInstance for IndexedQuestion<T> {
    fn empty_instance() -> Self {
        Self::new(Vec::new(), Label::Unset)
    }

    fn get_lengths(&self) -> PaddingLengths {
        let mut lengths = PaddingLengths::new();
        for option in &self.options {
            lengths.max_with(&option.get_lengths());
        }
        lengths.set(Dimension::NumOptions, self.options.len());
        lengths
    }

    /// Grows by appending empty options of the same variant, shrinks
    /// by dropping options from the end, then pads every option.
    fn pad(self, lengths: &PaddingLengths) -> Result<Self> {
        let num_options = lengths.require(Dimension::NumOptions)?;

        let mut options = self.options;
        options.truncate(num_options);
        options.resize_with(num_options, T::empty_instance);

        let options = options
            .into_iter()
            .map(|option| option.pad(lengths))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { options, label: self.label })
    }

    /// One array per input slot, each stacking that slot across all
    /// options: a question of logical forms exports
    /// `[words: [n, w], transitions: [n, t]]`, not n pairs.
    fn training_inputs(&self) -> Result<Vec<IntArray>> {
        let per_option = self.options
            .iter()
            .map(|option| option.training_inputs())
            .collect::<Result<Vec<_>>>()?;

        let Some(first) = per_option.first() else {
            return Ok(Vec::new());
        };
        let num_slots = first.len();
        if let Some(bad) = per_option.iter().position(|inputs| inputs.len() != num_slots) {
            return Err(DataError::shape(format!(
                "option {bad} has {} input arrays, option 0 has {num_slots}",
                per_option[bad].len()
            )));
        }

        (0..num_slots)
            .map(|slot| {
                let column: Vec<IntArray> = per_option.iter().map(|inputs| inputs[slot].clone()).collect();
                IntArray::stack(&column)
            })
            .collect()
    }

    fn training_label(&self) -> Result<Vec<f32>> {
        match self.label {
            Label::OptionIndex(correct) if correct < self.options.len() => {
                Ok(one_hot(self.options.len(), correct))
            }
            Label::OptionIndex(correct) => Err(DataError::InvalidOptionLabel {
                label:       correct,
                num_options: self.options.len(),
            }),
            _ => Err(DataError::UnlabeledInstance { index: None }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lengths(word: usize) -> PaddingLengths {
        PaddingLengths::new().with(Dimension::WordSequenceLength, word)
    }

    #[test]
    fn test_sentence_pad_keeps_label_and_index() {
        let s = IndexedSentence::new(vec![1, 6, 7, 1, 6, 8], true, Some(25));
        let padded = s.pad(&lengths(4)).unwrap();
        assert_eq!(padded.word_indices, vec![7, 1, 6, 8]);
        assert_eq!(padded.label, Label::Binary(true));
        assert_eq!(padded.index, Some(25));
    }

    #[test]
    fn test_sentence_training_data() {
        let t = IndexedSentence::new(vec![3, 4], true, None).as_training_data().unwrap();
        assert_eq!(t.inputs, vec![IntArray::from_vec(vec![3, 4])]);
        assert_eq!(t.label, vec![0.0, 1.0]);

        let f = IndexedSentence::new(vec![3, 4], false, None).as_training_data().unwrap();
        assert_eq!(f.label, vec![1.0, 0.0]);
    }

    #[test]
    fn test_unlabeled_export_fails() {
        let s = IndexedSentence::new(vec![3, 4], Label::Unset, Some(9));
        assert!(matches!(
            s.as_training_data(),
            Err(DataError::UnlabeledInstance { index: Some(9) })
        ));
    }

    #[test]
    fn test_logical_form_pads_dimensions_independently() {
        let lf = IndexedLogicalForm::new(vec![4, 5, 6], vec![1, 1, 2, 1, 2], true, None);
        assert_eq!(lf.get_lengths(), lengths(3).with(Dimension::TransitionLength, 5));

        let target = lengths(5).with(Dimension::TransitionLength, 3);
        let padded = lf.pad(&target).unwrap();
        assert_eq!(padded.base.word_indices, vec![0, 0, 4, 5, 6]);
        assert_eq!(padded.transitions, vec![2, 1, 2]);
    }

    #[test]
    fn test_logical_form_needs_transition_length() {
        let lf = IndexedLogicalForm::new(vec![4], vec![1], true, None);
        assert!(matches!(
            lf.pad(&lengths(3)),
            Err(DataError::MissingPaddingKey(Dimension::TransitionLength))
        ));
    }

    #[test]
    fn test_logical_form_exports_two_slots() {
        let lf = IndexedLogicalForm::new(vec![4, 5], vec![1, 1, 2], false, None);
        let t = lf.as_training_data().unwrap();
        assert_eq!(t.inputs.len(), 2);
        assert_eq!(t.inputs[1].data, vec![1, 1, 2]);
    }

    #[test]
    fn test_background_word_length_covers_snippets() {
        let bg = IndexedBackground::new(vec![1, 2], vec![vec![3, 4, 5, 6], vec![7]], true, None);
        let l = bg.get_lengths();
        assert_eq!(l.get(Dimension::WordSequenceLength), Some(4));
        assert_eq!(l.get(Dimension::BackgroundSentences), Some(2));
    }

    #[test]
    fn test_background_pad_grows_and_truncates() {
        let bg = IndexedBackground::new(vec![1, 2], vec![vec![3, 4, 5], vec![7]], true, None);

        let grown = bg.clone().pad(&lengths(3).with(Dimension::BackgroundSentences, 3)).unwrap();
        assert_eq!(grown.base.word_indices, vec![0, 1, 2]);
        assert_eq!(grown.background_indices, vec![vec![3, 4, 5], vec![0, 0, 7], vec![0, 0, 0]]);

        let cut = bg.pad(&lengths(2).with(Dimension::BackgroundSentences, 1)).unwrap();
        assert_eq!(cut.background_indices, vec![vec![4, 5]]);
    }

    #[test]
    fn test_background_export_shapes() {
        let bg = IndexedBackground::new(vec![1, 2], vec![vec![3]], false, None)
            .pad(&lengths(3).with(Dimension::BackgroundSentences, 2))
            .unwrap();
        let t = bg.as_training_data().unwrap();
        assert_eq!(t.inputs[0].shape, vec![3]);
        assert_eq!(t.inputs[1].shape, vec![2, 3]);
    }

    #[test]
    fn test_question_lengths_aggregate_options() {
        let q = IndexedQuestion::new(
            vec![
                IndexedSentence::new(vec![1, 2, 3], false, None),
                IndexedSentence::new(vec![1], true, None),
            ],
            Label::OptionIndex(1),
        );
        let l = q.get_lengths();
        assert_eq!(l.get(Dimension::NumOptions), Some(2));
        assert_eq!(l.get(Dimension::WordSequenceLength), Some(3));
        assert!(IndexedQuestion::<IndexedSentence>::empty_instance().options.is_empty());
    }

    #[test]
    fn test_question_growth_duplicates_empty_options() {
        let q = IndexedQuestion::new(
            vec![
                IndexedLogicalForm::new(vec![1, 2], vec![1, 1, 2], true, None),
                IndexedLogicalForm::new(vec![3], vec![1], false, None),
            ],
            Label::OptionIndex(0),
        );
        let target = lengths(2).with(Dimension::TransitionLength, 3).with(Dimension::NumOptions, 4);
        let padded = q.pad(&target).unwrap();
        assert_eq!(padded.options.len(), 4);
        let filler = IndexedLogicalForm::empty_instance().pad(&target).unwrap();
        assert_eq!(padded.options[2], filler);
        assert_eq!(padded.options[3], filler);
        assert_eq!(padded.options[3].transitions, vec![0, 0, 0]);
    }

    #[test]
    fn test_question_shrink_drops_tail_options() {
        let q = IndexedQuestion::new(
            vec![
                IndexedSentence::new(vec![1], true, Some(0)),
                IndexedSentence::new(vec![2], false, Some(1)),
                IndexedSentence::new(vec![3], false, Some(2)),
            ],
            Label::OptionIndex(0),
        );
        let padded = q.pad(&lengths(1).with(Dimension::NumOptions, 2)).unwrap();
        let kept: Vec<_> = padded.options.iter().map(|o| o.index).collect();
        assert_eq!(kept, vec![Some(0), Some(1)]);
    }

    #[test]
    fn test_question_export_transposes_slots() {
        let q = IndexedQuestion::new(
            vec![
                IndexedLogicalForm::new(vec![1, 2], vec![1, 1, 2], false, None),
                IndexedLogicalForm::new(vec![3, 4], vec![1, 2, 2], true, None),
            ],
            Label::OptionIndex(1),
        );
        let t = q.as_training_data().unwrap();
        assert_eq!(t.inputs.len(), 2);
        assert_eq!(t.inputs[0].shape, vec![2, 2]);
        assert_eq!(t.inputs[0].data, vec![1, 2, 3, 4]);
        assert_eq!(t.inputs[1].shape, vec![2, 3]);
        assert_eq!(t.label, vec![0.0, 1.0]);
    }

    #[test]
    fn test_question_export_with_filler_options() {
        // Filler options are unlabeled; only the question label matters.
        let q = IndexedQuestion::new(vec![IndexedSentence::new(vec![5], true, None)], Label::OptionIndex(0))
            .pad(&lengths(2).with(Dimension::NumOptions, 4))
            .unwrap();
        let t = q.as_training_data().unwrap();
        assert_eq!(t.inputs[0].shape, vec![4, 2]);
        assert_eq!(t.label, vec![1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_question_of_backgrounds_grows_to_full_slots() {
        let q = IndexedQuestion::new(
            vec![
                IndexedBackground::new(vec![3, 4], vec![vec![5], vec![6, 7]], false, None),
                IndexedBackground::new(vec![8], vec![vec![9, 10, 11]], true, None),
            ],
            Label::OptionIndex(1),
        );
        let target = lengths(3)
            .with(Dimension::BackgroundSentences, 2)
            .with(Dimension::NumOptions, 3);
        let t = q.pad(&target).unwrap().as_training_data().unwrap();

        assert_eq!(t.inputs.len(), 2);
        assert_eq!(t.inputs[0].shape, vec![3, 3]);
        assert_eq!(t.inputs[0].data, vec![0, 3, 4, 0, 0, 8, 0, 0, 0]);
        assert_eq!(t.inputs[1].shape, vec![3, 2, 3]);
        assert_eq!(t.inputs[1].data, vec![
            0, 0, 5, 0, 6, 7,
            9, 10, 11, 0, 0, 0,
            0, 0, 0, 0, 0, 0,
        ]);
        assert_eq!(t.label, vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_question_unpadded_options_fail_fast() {
        let q = IndexedQuestion::new(
            vec![IndexedSentence::new(vec![1, 2], true, None), IndexedSentence::new(vec![3], false, None)],
            Label::OptionIndex(0),
        );
        assert!(matches!(q.as_training_data(), Err(DataError::ShapeMismatch(_))));
    }

    #[test]
    fn test_question_label_out_of_range() {
        let q = IndexedQuestion::new(vec![IndexedSentence::new(vec![1], true, None)], Label::OptionIndex(3));
        assert!(matches!(
            q.training_label(),
            Err(DataError::InvalidOptionLabel { label: 3, num_options: 1 })
        ));
    }
}
