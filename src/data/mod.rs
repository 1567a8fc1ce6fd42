// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from instance files to stackable training arrays.
//
// The pipeline flows in this order:
//
//   instance files (.tsv / .lf)
//       │
//       ▼
//   loader            → raw datasets (AnyDataset), background
//       │
//       ▼
//   Dataset<T>        → merge, truncate, group into questions
//       │
//       ▼
//   Indexer           → Dataset<T::Indexed> (ids only)
//       │
//       ▼
//   padding           → one target length per dimension,
//                       every instance padded to it
//       │
//       ▼
//   as_training_data  → (inputs, labels)
//       │
//       ▼
//   TrainingBatcher   → Burn tensors
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Raw, text-level instances
pub mod instance;

/// Instances after vocabulary lookup, and their padding rules
pub mod indexed;

/// Logical form → symbols + shift/reduce transitions
pub mod logical_form;

/// Sequence padding and target-length aggregation
pub mod padding;

/// The typed Dataset container
pub mod dataset;

/// Run-time tagged datasets for merging files of unknown kind
pub mod any_dataset;

/// Reads instance and background files
pub mod loader;

/// Implements Burn's Batcher trait for exported examples
pub mod batcher;
