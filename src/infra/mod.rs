// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Handles the concerns that touch the output directory:
//
//   indexer.rs   — Vocabulary
//                  Fits a word-level tokenizer on the dataset
//                  if none exists, or loads a previously saved
//                  one, so every run indexes text the same way.
//
//   artifact.rs  — Prepared data persistence
//                  Saves/loads the padded training data, the
//                  padding lengths and the PrepareConfig as JSON.
//
//   metrics.rs   — Dataset statistics
//                  Writes per-stage instance and label counts to
//                  a CSV file.

/// Vocabulary fitting, saving, and loading
pub mod indexer;

/// Prepared data saving and loading
pub mod artifact;

/// Dataset statistics CSV logger
pub mod metrics;
