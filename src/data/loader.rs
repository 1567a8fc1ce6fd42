// ============================================================
// Layer 4 — Instance File Loader
// ============================================================
// Reads line-based instance files into datasets.
//
//   sentences.tsv   one TextInstance per line
//   forms.lf        one LogicalFormInstance per line
//   background.tsv  index<TAB>snippet<TAB>snippet...
//
// The kind of an instance file comes from its extension: `.lf`
// is a logical-form file, anything else is sentences.
//
// Background lines are matched to instances by index. Lines
// whose index matches no instance are skipped.
//
// Blank lines are ignored everywhere; line numbers in errors
// are 1-based and count blank lines.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::data::any_dataset::AnyDataset;
use crate::data::dataset::{Dataset, LabelCounts};
use crate::data::instance::{BackgroundTextInstance, LogicalFormInstance, TextInstance};
use crate::domain::error::{DataError, Result};
use crate::domain::label::Label;

pub const LOGICAL_FORM_EXTENSION: &str = "lf";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    LogicalForm,
}

impl InputKind {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(LOGICAL_FORM_EXTENSION) => InputKind::LogicalForm,
            _ => InputKind::Text,
        }
    }
}

/// Non-blank lines with their 1-based line numbers.
fn numbered_lines(content: &str) -> impl Iterator<Item = (usize, &str)> {
    content
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
}

pub fn read_text_lines(content: &str, default_label: Label) -> Result<Dataset<TextInstance>> {
    let instances = numbered_lines(content)
        .map(|(no, line)| TextInstance::read_from_line(line, default_label, no))
        .collect::<Result<Vec<_>>>()?;
    let dataset = Dataset::new(instances);
    log_counts("sentence", dataset.label_counts());
    Ok(dataset)
}

pub fn read_logical_form_lines(content: &str, default_label: Label) -> Result<Dataset<LogicalFormInstance>> {
    let instances = numbered_lines(content)
        .map(|(no, line)| LogicalFormInstance::read_from_line(line, default_label, no))
        .collect::<Result<Vec<_>>>()?;
    let dataset = Dataset::new(instances);
    log_counts("logical form", dataset.label_counts());
    Ok(dataset)
}

fn log_counts(what: &str, counts: LabelCounts) {
    tracing::info!(
        "Finished reading {} dataset; there are {} positives, {} negatives, and {} unknown",
        what,
        counts.positive,
        counts.negative,
        counts.unknown,
    );
}

/// Attach background snippets to the instances of `dataset`.
///
/// Every instance becomes a BackgroundTextInstance, in the original
/// order. Instances without an index cannot be matched and keep an
/// empty background.
pub fn read_background_lines(dataset: Dataset<TextInstance>, content: &str) -> Result<Dataset<BackgroundTextInstance>> {
    let mut instances: Vec<BackgroundTextInstance> = dataset
        .into_instances()
        .into_iter()
        .map(BackgroundTextInstance::from)
        .collect();

    let mut by_index: HashMap<usize, Vec<usize>> = HashMap::new();
    for (position, instance) in instances.iter().enumerate() {
        if let Some(index) = instance.index {
            by_index.entry(index).or_default().push(position);
        }
    }
    let unindexed = instances.len() - by_index.values().map(Vec::len).sum::<usize>();
    if unindexed > 0 {
        tracing::warn!("{} instances have no index and cannot receive background", unindexed);
    }

    let mut matched = 0usize;
    let mut skipped = 0usize;
    for (no, line) in numbered_lines(content) {
        let mut fields = line.split('\t');
        let index_field = fields.next().unwrap_or_default();
        let index = index_field
            .trim()
            .parse::<usize>()
            .map_err(|_| DataError::parse(no, format!("invalid background index '{index_field}'")))?;

        let Some(positions) = by_index.get(&index) else {
            skipped += 1;
            continue;
        };
        let snippets: Vec<String> = fields
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        for &position in positions {
            instances[position].background.extend(snippets.iter().cloned());
        }
        matched += 1;
    }

    tracing::info!(
        "Background: {} lines matched, {} lines with unknown index skipped",
        matched,
        skipped
    );
    Ok(Dataset::new(instances))
}

// ─── InstanceFileLoader ───────────────────────────────────────────────────────
/// Reads one instance file, deciding its kind from the extension.
pub struct InstanceFileLoader {
    path:          PathBuf,
    default_label: Label,
}

impl InstanceFileLoader {
    pub fn new(path: impl Into<PathBuf>, default_label: Label) -> Self {
        Self { path: path.into(), default_label }
    }

    pub fn kind(&self) -> InputKind {
        InputKind::from_path(&self.path)
    }

    pub fn load(&self) -> Result<AnyDataset> {
        let content = fs::read_to_string(&self.path)?;
        tracing::debug!("Read '{}' ({} bytes)", self.path.display(), content.len());
        Ok(match self.kind() {
            InputKind::Text        => read_text_lines(&content, self.default_label)?.into(),
            InputKind::LogicalForm => read_logical_form_lines(&content, self.default_label)?.into(),
        })
    }
}

pub fn read_background_from_file(dataset: Dataset<TextInstance>, path: &Path) -> Result<Dataset<BackgroundTextInstance>> {
    let content = fs::read_to_string(path)?;
    read_background_lines(dataset, &content)
}
