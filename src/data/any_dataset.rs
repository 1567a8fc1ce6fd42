// ============================================================
// Layer 4 — Dataset of Any Kind
// ============================================================
// Dataset<T> is typed, so merging a raw dataset with an indexed
// one does not compile. Files read at run time are different:
// the kind of each input is only known once we look at it, so
// the loader returns an AnyDataset and merging two of different
// kinds is a run-time TypeMismatch error.

use crate::data::dataset::{Dataset, LabelCounts};
use crate::data::instance::{BackgroundTextInstance, LogicalFormInstance, TextInstance};
use crate::domain::error::{DataError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum AnyDataset {
    Text(Dataset<TextInstance>),
    Background(Dataset<BackgroundTextInstance>),
    LogicalForm(Dataset<LogicalFormInstance>),
}

impl AnyDataset {
    pub fn kind(&self) -> &'static str {
        match self {
            AnyDataset::Text(_)        => "text",
            AnyDataset::Background(_)  => "background",
            AnyDataset::LogicalForm(_) => "logical-form",
        }
    }

    pub fn len(&self) -> usize {
        match self {
            AnyDataset::Text(d)        => d.len(),
            AnyDataset::Background(d)  => d.len(),
            AnyDataset::LogicalForm(d) => d.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn label_counts(&self) -> LabelCounts {
        match self {
            AnyDataset::Text(d)        => d.label_counts(),
            AnyDataset::Background(d)  => d.label_counts(),
            AnyDataset::LogicalForm(d) => d.label_counts(),
        }
    }

    /// Concatenate two datasets of the same kind, `self` first.
    pub fn merge(self, other: AnyDataset) -> Result<AnyDataset> {
        match (self, other) {
            (AnyDataset::Text(a), AnyDataset::Text(b)) => Ok(AnyDataset::Text(a.merge(b))),
            (AnyDataset::Background(a), AnyDataset::Background(b)) => Ok(AnyDataset::Background(a.merge(b))),
            (AnyDataset::LogicalForm(a), AnyDataset::LogicalForm(b)) => Ok(AnyDataset::LogicalForm(a.merge(b))),
            (a, b) => Err(DataError::TypeMismatch {
                left:  a.kind().to_string(),
                right: b.kind().to_string(),
            }),
        }
    }
}

impl From<Dataset<TextInstance>> for AnyDataset {
    fn from(d: Dataset<TextInstance>) -> Self {
        AnyDataset::Text(d)
    }
}

impl From<Dataset<BackgroundTextInstance>> for AnyDataset {
    fn from(d: Dataset<BackgroundTextInstance>) -> Self {
        AnyDataset::Background(d)
    }
}

impl From<Dataset<LogicalFormInstance>> for AnyDataset {
    fn from(d: Dataset<LogicalFormInstance>) -> Self {
        AnyDataset::LogicalForm(d)
    }
}
