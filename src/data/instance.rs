// ============================================================
// Layer 4 — Raw Instances
// ============================================================
// Text-level examples, before vocabulary lookup.
//
//   TextInstance           → one sentence with a true/false label
//   BackgroundTextInstance → a sentence plus background snippets
//   LogicalFormInstance    → a tree written as pred(arg, ...)
//   QuestionInstance<T>    → four (or more) options of one kind,
//                            labelled with the correct option
//
// Line format shared by sentence and logical-form files:
//
//   text
//   index<TAB>text
//   text<TAB>label
//   index<TAB>text<TAB>label
//
// where label is 1/0 or true/false. A line without a label takes
// the default label the caller passes in.

use serde::{Deserialize, Serialize};

use crate::data::indexed::{IndexedBackground, IndexedLogicalForm, IndexedQuestion, IndexedSentence};
use crate::data::logical_form;
use crate::domain::error::{DataError, Result};
use crate::domain::label::Label;
use crate::domain::traits::{Indexer, Instance, Labeled};

/// Split one instance line into (index, text, label).
/// `line_no` is only used for error messages.
fn parse_fields(line: &str, default_label: Label, line_no: usize) -> Result<(Option<usize>, String, Label)> {
    let fields: Vec<&str> = line.split('\t').collect();
    let parse_index = |field: &str| {
        field.trim().parse::<usize>()
            .map_err(|_| DataError::parse(line_no, format!("invalid instance index '{field}'")))
    };
    let parse_label = |field: &str| {
        Label::parse_binary(field)
            .ok_or_else(|| DataError::parse(line_no, format!("invalid label '{field}'")))
    };

    match fields.as_slice() {
        [text] => Ok((None, text.to_string(), default_label)),
        [first, second] => match first.trim().parse::<usize>() {
            Ok(index) => Ok((Some(index), second.to_string(), default_label)),
            Err(_) => Ok((None, first.to_string(), parse_label(second)?)),
        },
        [index, text, label] => Ok((Some(parse_index(index)?), text.to_string(), parse_label(label)?)),
        _ => Err(DataError::parse(line_no, format!("expected 1 to 3 tab-separated fields, found {}", fields.len()))),
    }
}

// ─── TextInstance ─────────────────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextInstance {
    pub text:  String,
    pub label: Label,
    pub index: Option<usize>,
}

impl TextInstance {
    pub fn new(text: impl Into<String>, label: impl Into<Label>, index: Option<usize>) -> Self {
        Self { text: text.into(), label: label.into(), index }
    }

    pub fn read_from_line(line: &str, default_label: Label, line_no: usize) -> Result<Self> {
        let (index, text, label) = parse_fields(line, default_label, line_no)?;
        Ok(Self { text, label, index })
    }
}

impl Labeled for TextInstance {
    fn label(&self) -> Label {
        self.label
    }

    fn index(&self) -> Option<usize> {
        self.index
    }
}

impl Instance for TextInstance {
    type Indexed = IndexedSentence;

    fn texts(&self) -> Vec<&str> {
        vec![self.text.as_str()]
    }

    fn to_indexed_instance<X: Indexer>(&self, indexer: &X) -> Result<IndexedSentence> {
        Ok(IndexedSentence::new(indexer.index_text(&self.text)?, self.label, self.index))
    }
}

// ─── BackgroundTextInstance ───────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundTextInstance {
    pub text:       String,
    pub background: Vec<String>,
    pub label:      Label,
    pub index:      Option<usize>,
}

impl BackgroundTextInstance {
    pub fn new(text: impl Into<String>, background: Vec<String>, label: impl Into<Label>, index: Option<usize>) -> Self {
        Self { text: text.into(), background, label: label.into(), index }
    }
}

impl From<TextInstance> for BackgroundTextInstance {
    fn from(instance: TextInstance) -> Self {
        Self::new(instance.text, Vec::new(), instance.label, instance.index)
    }
}

impl Labeled for BackgroundTextInstance {
    fn label(&self) -> Label {
        self.label
    }

    fn index(&self) -> Option<usize> {
        self.index
    }
}

impl Instance for BackgroundTextInstance {
    type Indexed = IndexedBackground;

    fn texts(&self) -> Vec<&str> {
        std::iter::once(self.text.as_str())
            .chain(self.background.iter().map(String::as_str))
            .collect()
    }

    fn to_indexed_instance<X: Indexer>(&self, indexer: &X) -> Result<IndexedBackground> {
        let word_indices = indexer.index_text(&self.text)?;
        let background_indices = self.background
            .iter()
            .map(|snippet| indexer.index_text(snippet))
            .collect::<Result<Vec<_>>>()?;
        Ok(IndexedBackground::new(word_indices, background_indices, self.label, self.index))
    }
}

// ─── LogicalFormInstance ──────────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicalFormInstance {
    pub logical_form: String,
    pub label:        Label,
    pub index:        Option<usize>,
}

impl LogicalFormInstance {
    pub fn new(logical_form: impl Into<String>, label: impl Into<Label>, index: Option<usize>) -> Self {
        Self { logical_form: logical_form.into(), label: label.into(), index }
    }

    /// Same line format as sentences; the form is validated here
    /// so a malformed line is reported with its line number.
    pub fn read_from_line(line: &str, default_label: Label, line_no: usize) -> Result<Self> {
        let (index, logical_form, label) = parse_fields(line, default_label, line_no)?;
        logical_form::parse(&logical_form).map_err(|e| match e {
            DataError::Parse { message, .. } => DataError::parse(line_no, message),
            other => other,
        })?;
        Ok(Self { logical_form, label, index })
    }
}

impl Labeled for LogicalFormInstance {
    fn label(&self) -> Label {
        self.label
    }

    fn index(&self) -> Option<usize> {
        self.index
    }
}

impl Instance for LogicalFormInstance {
    type Indexed = IndexedLogicalForm;

    fn texts(&self) -> Vec<&str> {
        Vec::new()
    }

    fn symbols(&self) -> Result<Vec<String>> {
        Ok(logical_form::parse(&self.logical_form)?.symbols)
    }

    fn to_indexed_instance<X: Indexer>(&self, indexer: &X) -> Result<IndexedLogicalForm> {
        let parsed = logical_form::parse(&self.logical_form)?;
        let word_indices = parsed.symbols
            .iter()
            .map(|s| indexer.index_symbol(s))
            .collect::<Result<Vec<_>>>()?;
        Ok(IndexedLogicalForm::new(word_indices, parsed.transitions, self.label, self.index))
    }
}

// ─── QuestionInstance ─────────────────────────────────────────────────────────
/// A multiple-choice question: the options are complete instances
/// of one kind, the label is the index of the correct option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionInstance<T> {
    pub options: Vec<T>,
    pub label:   Label,
}

impl<T: Labeled> QuestionInstance<T> {
    /// Build a question from its options, labelled with the position
    /// of the single option marked true (Unset if there is none).
    pub fn new(options: Vec<T>) -> Self {
        let label = options
            .iter()
            .position(|o| o.label().is_true())
            .map(Label::OptionIndex)
            .unwrap_or(Label::Unset);
        Self { options, label }
    }
}

impl<T> Labeled for QuestionInstance<T> {
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

impl<T: Instance> Instance for QuestionInstance<T> {
    type Indexed = IndexedQuestion<T::Indexed>;

    fn texts(&self) -> Vec<&str> {
        self.options.iter().flat_map(|o| o.texts()).collect()
    }

    fn symbols(&self) -> Result<Vec<String>> {
        let mut symbols = Vec::new();
        for option in &self.options {
            symbols.extend(option.symbols()?);
        }
        Ok(symbols)
    }

    fn to_indexed_instance<X: Indexer>(&self, indexer: &X) -> Result<Self::Indexed> {
        let options = self.options
            .iter()
            .map(|o| o.to_indexed_instance(indexer))
            .collect::<Result<Vec<_>>>()?;
        Ok(IndexedQuestion::new(options, self.label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::indexer::DataIndexer;
    use std::collections::HashMap;

    /// Indexer over a fixed word list; unknown words map to 1.
    /// Text is split by the real tokenizer pipeline.
    struct FixedIndexer {
        ids:      HashMap<String, u32>,
        splitter: DataIndexer,
    }

    impl FixedIndexer {
        fn new(words: &[&str]) -> Self {
            Self {
                ids:      words.iter().enumerate().map(|(i, w)| (w.to_string(), i as u32 + 2)).collect(),
                splitter: DataIndexer::untrained().unwrap(),
            }
        }
    }

    impl Indexer for FixedIndexer {
        fn index_text(&self, text: &str) -> Result<Vec<u32>> {
            self.splitter
                .pre_tokenize(text)?
                .iter()
                .map(|w| self.index_symbol(w))
                .collect()
        }

        fn index_symbol(&self, symbol: &str) -> Result<u32> {
            let normalized = self.splitter.normalize(symbol)?;
            Ok(self.ids.get(&normalized).copied().unwrap_or(1))
        }
    }

    #[test]
    fn test_read_line_variants() {
        let plain = TextInstance::read_from_line("the sky is blue", Label::Unset, 1).unwrap();
        assert_eq!(plain.index, None);
        assert_eq!(plain.label, Label::Unset);

        let indexed = TextInstance::read_from_line("7\tthe sky is blue", Label::Binary(true), 1).unwrap();
        assert_eq!(indexed.index, Some(7));
        assert_eq!(indexed.label, Label::Binary(true));

        let labelled = TextInstance::read_from_line("the sky is green\t0", Label::Binary(true), 1).unwrap();
        assert_eq!(labelled.index, None);
        assert_eq!(labelled.label, Label::Binary(false));

        let full = TextInstance::read_from_line("3\tthe sky is blue\t1", Label::Unset, 1).unwrap();
        assert_eq!(full, TextInstance::new("the sky is blue", true, Some(3)));
    }

    #[test]
    fn test_read_line_bad_label_reports_line() {
        let err = TextInstance::read_from_line("x\ty\tmaybe", Label::Unset, 12).unwrap_err();
        assert!(matches!(err, DataError::Parse { line: 12, .. }));
    }

    #[test]
    fn test_text_instance_indexing() {
        let indexer = FixedIndexer::new(&["the", "sky"]);
        let instance = TextInstance::new("The sky glows", true, Some(4));
        let indexed = indexer.index_instance(&instance).unwrap();
        assert_eq!(indexed.word_indices, vec![2, 3, 1]);
        assert_eq!(indexed.label, Label::Binary(true));
        assert_eq!(indexed.index, Some(4));
    }

    #[test]
    fn test_logical_form_indexing() {
        let indexer = FixedIndexer::new(&["for", "oxygen"]);
        let instance = LogicalFormInstance::read_from_line("for(plant, oxygen)\t1", Label::Unset, 1).unwrap();
        let indexed = instance.to_indexed_instance(&indexer).unwrap();
        assert_eq!(indexed.base.word_indices, vec![2, 1, 3]);
        assert_eq!(indexed.transitions, vec![1, 1, 2, 1, 2]);
    }

    #[test]
    fn test_malformed_logical_form_line() {
        let err = LogicalFormInstance::read_from_line("for(plant", Label::Unset, 5).unwrap_err();
        assert!(matches!(err, DataError::Parse { line: 5, .. }));
    }

    #[test]
    fn test_background_indexing() {
        let indexer = FixedIndexer::new(&["leaves", "are", "green"]);
        let instance = BackgroundTextInstance::new(
            "leaves are green",
            vec!["green leaves".to_string(), "sun".to_string()],
            false,
            Some(0),
        );
        let indexed = instance.to_indexed_instance(&indexer).unwrap();
        assert_eq!(indexed.base.word_indices, vec![2, 3, 4]);
        assert_eq!(indexed.background_indices, vec![vec![4, 2], vec![1]]);
        assert_eq!(instance.texts(), vec!["leaves are green", "green leaves", "sun"]);
    }

    #[test]
    fn test_question_label_is_true_position() {
        let options = vec![
            TextInstance::new("a", false, None),
            TextInstance::new("b", false, None),
            TextInstance::new("c", true, None),
            TextInstance::new("d", false, None),
        ];
        let question = QuestionInstance::new(options);
        assert_eq!(question.label, Label::OptionIndex(2));
        assert!(question.is_question());
    }
}
