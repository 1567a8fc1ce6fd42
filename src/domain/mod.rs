// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain types and traits shared by every other layer:
//
//   label      → Unset / Binary / OptionIndex
//   dimension  → padding axes and length mappings
//   training   → exported arrays (IntArray, TrainingExample)
//   traits     → Labeled, Instance, Indexer, IndexedInstance
//   error      → DataError
//
// No file I/O and no Burn types in this layer.

pub mod label;

pub mod dimension;

pub mod training;

pub mod traits;

pub mod error;
