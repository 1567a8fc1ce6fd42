// ============================================================
// Layer 3 — Data Errors
// ============================================================
// Every failure the data pipeline can raise. These are fatal:
// the batch-preparation step aborts on the first one, there is
// no partial-success mode.
//
//   MissingPaddingKey   → pad() called with an incomplete mapping
//   TypeMismatch        → merge() of two different dataset kinds
//   UnlabeledInstance   → training export of an instance without label
//   InvalidOptionLabel  → question label is not a valid option index
//   ShapeMismatch       → options of one question disagree on shape
//   NotQuestionShaped   → grouping into questions was not possible
//   Parse / Indexer / Io → reading and vocabulary collaborators
//   AtInstance          → any of the above, tagged with the position
//                         of the instance that raised it

use thiserror::Error;

use crate::domain::dimension::Dimension;

/// Result type for the data pipeline.
pub type Result<T> = std::result::Result<T, DataError>;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("padding lengths are missing required dimension '{0}'")]
    MissingPaddingKey(Dimension),

    #[error("cannot merge datasets with different types ({left} vs {right})")]
    TypeMismatch { left: String, right: String },

    #[error("cannot make training data out of unlabeled instance (index {index:?})")]
    UnlabeledInstance { index: Option<usize> },

    #[error("question label {label} is out of range for {num_options} options")]
    InvalidOptionLabel { label: usize, num_options: usize },

    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("dataset cannot be converted to four-choice questions: {0}")]
    NotQuestionShaped(String),

    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("indexer error: {0}")]
    Indexer(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("instance at position {position} (index {index:?}): {error}")]
    AtInstance {
        position: usize,
        index:    Option<usize>,
        error:    Box<DataError>,
    },
}

impl DataError {
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        DataError::Parse { line, message: message.into() }
    }

    pub fn shape(message: impl Into<String>) -> Self {
        DataError::ShapeMismatch(message.into())
    }

    pub fn at_instance(position: usize, index: Option<usize>, error: DataError) -> Self {
        DataError::AtInstance { position, index, error: Box::new(error) }
    }
}
