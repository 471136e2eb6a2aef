// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Filesystem concerns shared by training and inference:
//
//   artifact.rs        — The trained artifact directory: weights
//                        (two recognised file names), tokenizer,
//                        model config; save, verify and load.
//
//   checkpoint.rs      — Per-epoch checkpoints with retention.
//
//   tokenizer_store.rs — Base tokenizer loading, word-level
//                        tokenizer building, truncation/padding
//                        configuration and persistence.
//
//   metrics.rs         — Per-epoch metrics CSV.

/// Trained artifact layout, save, verification and load
pub mod artifact;

/// Per-epoch checkpoints with retention
pub mod checkpoint;

/// Tokenizer loading, building and saving
pub mod tokenizer_store;

/// Training metrics CSV logger
pub mod metrics;
