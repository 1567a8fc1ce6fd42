// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All work is delegated to Layer 2 (application).
//
// Two commands are supported:
//   1. `prepare` — turns instance files into padded training data
//   2. `inspect` — prints the shapes of a prepared directory

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, InspectArgs, PrepareArgs};

/// The main CLI struct. clap reads the fields and generates
/// argument parsing code via the Parser derive macro.
#[derive(Parser, Debug)]
#[command(
    name = "mcqa-prep",
    version = "0.1.0",
    about = "Pad multiple-choice QA instances into fixed-shape training data."
)]
pub struct Cli {
    /// The subcommand to run (prepare or inspect)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Prepare(args) => run_prepare(args),
            Commands::Inspect(args) => run_inspect(args),
        }
    }
}

fn run_prepare(args: PrepareArgs) -> Result<()> {
    use crate::application::prepare_use_case::PrepareUseCase;

    tracing::info!("Preparing {} input file(s)", args.inputs.len());

    let summary = PrepareUseCase::new(args.into()).execute()?;

    println!(
        "Prepared {} instances padded to {} in '{}'.",
        summary.instances, summary.padding_lengths, summary.output_dir
    );
    Ok(())
}

fn run_inspect(args: InspectArgs) -> Result<()> {
    use crate::application::inspect_use_case::InspectUseCase;

    let report = InspectUseCase::new(&args.output_dir, args.batch_size).execute()?;

    if let Some(cfg) = &report.config {
        println!("Inputs:          {}", cfg.inputs.join(", "));
        println!("Vocab size:      {}", cfg.vocab_size);
        println!("Questions:       {}", cfg.questions);
    }
    println!("Padding lengths: {}", report.padding_lengths);
    println!("Instances:       {}", report.instances);
    println!("Label width:     {}", report.label_width);
    for (slot, (shape, dims)) in report.input_shapes.iter().zip(&report.batch_dims).enumerate() {
        println!("Input {slot}:         shape {shape:?}, first batch {dims:?}");
    }
    Ok(())
}
