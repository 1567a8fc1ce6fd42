// ============================================================
// Layer 6 — Dataset Statistics Logger
// ============================================================
// Records the size and label balance of the dataset after each
// pipeline stage to a CSV file.
//
// Stages recorded by `prepare`:
//   - read:      after reading and merging the input files
//   - questions: after grouping into four-choice questions
//   - truncate:  after random truncation to --max-instances
//
// Output file: <output-dir>/stats.csv
//
// Example CSV output:
//   stage,instances,positive,negative,unknown
//   read,400,100,300,0
//   questions,100,0,0,100
//
// Question instances carry an option index, not a true/false
// label, so they are counted as unknown.

use anyhow::Result;
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};
use serde::{Deserialize, Serialize};

use crate::data::dataset::LabelCounts;

/// One row of the statistics file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageStats {
    pub stage:     String,
    pub instances: usize,
    pub counts:    LabelCounts,
}

impl StageStats {
    pub fn new(stage: impl Into<String>, instances: usize, counts: LabelCounts) -> Self {
        Self { stage: stage.into(), instances, counts }
    }
}

pub struct StatsLogger {
    csv_path: PathBuf,
}

impl StatsLogger {
    /// Create a new StatsLogger.
    /// Writes the CSV header if the file doesn't exist yet.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        let csv_path = dir.join("stats.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "stage,instances,positive,negative,unknown")?;
            tracing::debug!("Created stats CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one stage as a new row.
    pub fn log(&self, s: &StageStats) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)?;

        writeln!(
            f,
            "{},{},{},{},{}",
            s.stage,
            s.instances,
            s.counts.positive,
            s.counts.negative,
            s.counts.unknown,
        )?;

        tracing::info!(
            "Stage '{}': {} instances ({} positive, {} negative, {} unknown)",
            s.stage,
            s.instances,
            s.counts.positive,
            s.counts.negative,
            s.counts.unknown,
        );

        Ok(())
    }

    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_are_appended() {
        let dir = tempfile::tempdir().unwrap();
        let logger = StatsLogger::new(dir.path()).unwrap();
        logger.log(&StageStats::new("read", 8, LabelCounts { positive: 2, negative: 6, unknown: 0 })).unwrap();
        logger.log(&StageStats::new("questions", 2, LabelCounts { positive: 0, negative: 0, unknown: 2 })).unwrap();

        let content = fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, vec![
            "stage,instances,positive,negative,unknown",
            "read,8,2,6,0",
            "questions,2,0,0,2",
        ]);
    }
}
