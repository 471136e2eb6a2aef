// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// Burn model code lives here; the batcher in Layer 4 and the
// record I/O in Layer 6 are the only other places that touch
// tensors.
//
//   backend.rs    — Backend aliases: NdArray (default) or Wgpu
//                   for inference, Autodiff over it for training
//
//   model.rs      — Transformer encoder sequence classifier:
//                   token + position embeddings, self-attention
//                   blocks with padding masks, masked mean
//                   pooling, tanh pooler, linear class head
//
//   trainer.rs    — AdamW fine-tuning loop with per-epoch
//                   evaluation, checkpoints and metrics
//
//   inferencer.rs — Loads an artifact and labels one question
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)
//            Devlin et al. (2019) BERT

/// Backend type aliases and device selection
pub mod backend;

/// Transformer encoder classifier
pub mod model;

/// Fine-tuning loop with validation and checkpointing
pub mod trainer;

/// Inference engine: loads an artifact and predicts a label
pub mod inferencer;
