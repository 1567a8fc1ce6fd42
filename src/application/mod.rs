// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates the other layers to accomplish one
// command (prepare or inspect).
//
// Rules for this layer:
//   - No padding or indexing logic here (that's Layer 4)
//   - No printing here (that's Layer 1)
//   - No direct file formats (that's Layer 4 and 6)
//   - Only workflow coordination

// Instance files → padded training data
pub mod prepare_use_case;

// Reading back and checking prepared data
pub mod inspect_use_case;
