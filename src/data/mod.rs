// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from labelled questions to tensor batches:
//
//   BuiltinExamples / JsonlExampleLoader
//       │
//       ▼
//   Preprocessor      → normalises whitespace and tatweel
//       │
//       ▼
//   split_train_val   → seeded 80/20 split
//       │
//       ▼
//   encode_texts      → EncodedBatch (input_ids, attention_mask, ...)
//       │
//       ▼
//   QuestionDataset   → implements Burn's Dataset trait
//       │
//       ▼
//   ClassificationBatcher → stacks items into tensors for the DataLoader

/// Built-in and JSONL example sources
pub mod loader;

/// Cleans and normalises question text
pub mod preprocessor;

/// Seeded train/validation split
pub mod splitter;

/// Tokenizer output keyed by field name
pub mod encoding;

/// Implements Burn's Dataset trait over an encoded split
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;
