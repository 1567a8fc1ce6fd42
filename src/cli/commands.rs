// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands: `prepare` and `inspect`
// and all their configurable flags.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → usize, bool, etc.)

use clap::{Args, Subcommand};
use crate::application::prepare_use_case::PrepareConfig;
use crate::domain::dimension::PaddingOverrides;

/// The two top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read instance files and write padded training data
    Prepare(PrepareArgs),

    /// Print what a previous `prepare` run produced
    Inspect(InspectArgs),
}

/// All arguments for the `prepare` command.
#[derive(Args, Debug)]
pub struct PrepareArgs {
    /// Instance file to read; repeat to merge several files.
    /// Files ending in .lf hold logical forms, anything else sentences.
    #[arg(long = "input", required = true)]
    pub inputs: Vec<String>,

    /// Label for lines that carry none (true or false)
    #[arg(long)]
    pub default_label: Option<bool>,

    /// Background file: index<TAB>snippet<TAB>snippet...
    #[arg(long)]
    pub background: Option<String>,

    /// Group every four consecutive instances into one question
    #[arg(long)]
    pub questions: bool,

    /// Randomly keep at most this many instances
    #[arg(long)]
    pub max_instances: Option<usize>,

    /// Fixed word sequence length instead of the data maximum
    #[arg(long)]
    pub max_word_sequence_length: Option<usize>,

    /// Fixed transition length for logical forms
    #[arg(long)]
    pub max_transition_length: Option<usize>,

    /// Fixed number of background sentences per instance
    #[arg(long)]
    pub max_background_sentences: Option<usize>,

    /// Fixed number of options per question
    #[arg(long)]
    pub max_num_options: Option<usize>,

    /// Vocabulary size, padding and unknown ids included
    #[arg(long, default_value_t = 10_000)]
    pub vocab_size: usize,

    /// Seed for truncation and shuffling
    #[arg(long)]
    pub seed: Option<u64>,

    /// Keep instances in file order in the exported data
    #[arg(long)]
    pub no_shuffle: bool,

    /// Directory for the tokenizer, training data and stats
    #[arg(long, default_value = "prepared")]
    pub output_dir: String,
}

/// Convert CLI PrepareArgs into the application-layer PrepareConfig.
/// The application layer never sees clap types.
impl From<PrepareArgs> for PrepareConfig {
    fn from(a: PrepareArgs) -> Self {
        PrepareConfig {
            inputs:        a.inputs,
            default_label: a.default_label,
            background:    a.background,
            questions:     a.questions,
            max_instances: a.max_instances,
            padding:       PaddingOverrides {
                word_sequence_length: a.max_word_sequence_length,
                transition_length:    a.max_transition_length,
                background_sentences: a.max_background_sentences,
                num_options:          a.max_num_options,
            },
            vocab_size:    a.vocab_size,
            seed:          a.seed,
            shuffle:       !a.no_shuffle,
            output_dir:    a.output_dir,
        }
    }
}

/// All arguments for the `inspect` command
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Directory written by `prepare`
    #[arg(long, default_value = "prepared")]
    pub output_dir: String,

    /// Number of examples stacked into the test batch
    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    #[test]
    fn test_prepare_args_become_config() {
        let cli = Cli::try_parse_from([
            "mcqa-prep", "prepare",
            "--input", "a.tsv", "--input", "b.tsv",
            "--questions",
            "--max-num-options", "5",
            "--no-shuffle",
            "--seed", "3",
        ]).unwrap();
        let Commands::Prepare(args) = cli.command else {
            panic!("expected prepare");
        };
        let cfg = PrepareConfig::from(args);
        assert_eq!(cfg.inputs, vec!["a.tsv", "b.tsv"]);
        assert!(cfg.questions);
        assert!(!cfg.shuffle);
        assert_eq!(cfg.seed, Some(3));
        assert_eq!(cfg.padding.num_options, Some(5));
        assert_eq!(cfg.padding.word_sequence_length, None);
        assert_eq!(cfg.vocab_size, 10_000);
    }

    #[test]
    fn test_prepare_requires_input() {
        assert!(Cli::try_parse_from(["mcqa-prep", "prepare"]).is_err());
    }
}
