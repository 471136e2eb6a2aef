// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands, `train` and `predict`, and all
// their configurable flags.

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::application::train_use_case::TrainConfig;
use crate::infra::artifact::WeightsFormat;

/// The two top-level subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fine-tune the question classifier and save an artifact directory
    Train(TrainArgs),

    /// Classify one JSON request `{"text": "..."}` with a trained artifact.
    /// Only the first positional argument is read; any further ones are ignored.
    Predict(PredictArgs),
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Directory that receives the trained artifact
    #[arg(long)]
    pub output_dir: PathBuf,

    /// JSONL file of {"text", "label"} examples (built-in table if omitted)
    #[arg(long)]
    pub dataset: Option<PathBuf>,

    /// Pretrained tokenizer.json; a word-level tokenizer is built if omitted
    #[arg(long)]
    pub base_tokenizer: Option<PathBuf>,

    /// Burn record (.mpk or .mpk.gz) to fine-tune from
    #[arg(long)]
    pub base_weights: Option<PathBuf>,

    /// Directory for per-epoch checkpoints
    #[arg(long, default_value = "results")]
    pub checkpoint_dir: PathBuf,

    /// Directory for the metrics CSV
    #[arg(long, default_value = "logs")]
    pub logging_dir: PathBuf,

    #[arg(long, default_value_t = 2e-5)]
    pub learning_rate: f64,

    #[arg(long, default_value_t = 4)]
    pub train_batch_size: usize,

    #[arg(long, default_value_t = 4)]
    pub eval_batch_size: usize,

    /// Number of full passes through the training data
    #[arg(long, default_value_t = 3)]
    pub epochs: usize,

    /// AdamW decoupled weight decay
    #[arg(long, default_value_t = 0.01)]
    pub weight_decay: f64,

    /// Checkpoints kept in --checkpoint-dir (0 keeps all)
    #[arg(long, default_value_t = 1)]
    pub save_total_limit: usize,

    /// Optimiser steps between training-loss log lines
    #[arg(long, default_value_t = 10)]
    pub logging_steps: usize,

    /// Seed for the split, shuffling and weight initialisation
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Share of examples held out for validation
    #[arg(long, default_value_t = 0.2)]
    pub val_fraction: f64,

    /// Truncation length; also the size of the position table
    #[arg(long, default_value_t = 128)]
    pub max_seq_len: usize,

    /// Hidden dimension of the encoder
    #[arg(long, default_value_t = 128)]
    pub d_model: usize,

    /// Attention heads; d_model must be divisible by num_heads
    #[arg(long, default_value_t = 4)]
    pub num_heads: usize,

    #[arg(long, default_value_t = 2)]
    pub num_layers: usize,

    /// Inner dimension of the feed-forward network
    #[arg(long, default_value_t = 512)]
    pub d_ff: usize,

    #[arg(long, default_value_t = 0.1)]
    pub dropout: f64,

    /// Vocabulary cap when building a word-level tokenizer
    #[arg(long, default_value_t = 30522)]
    pub vocab_size: usize,

    /// compact → model.mpk.gz, full → model.mpk
    #[arg(long, value_enum, default_value_t = WeightsFormat::Compact)]
    pub weights_format: WeightsFormat,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            output_dir:       a.output_dir,
            dataset:          a.dataset,
            base_tokenizer:   a.base_tokenizer,
            base_weights:     a.base_weights,
            checkpoint_dir:   a.checkpoint_dir,
            logging_dir:      a.logging_dir,
            learning_rate:    a.learning_rate,
            train_batch_size: a.train_batch_size,
            eval_batch_size:  a.eval_batch_size,
            epochs:           a.epochs,
            weight_decay:     a.weight_decay,
            save_total_limit: a.save_total_limit,
            logging_steps:    a.logging_steps,
            seed:             a.seed,
            val_fraction:     a.val_fraction,
            max_seq_len:      a.max_seq_len,
            d_model:          a.d_model,
            num_heads:        a.num_heads,
            num_layers:       a.num_layers,
            d_ff:             a.d_ff,
            dropout:          a.dropout,
            vocab_size:       a.vocab_size,
            weights_format:   a.weights_format,
        }
    }
}

/// All arguments for the `predict` command
#[derive(Args, Debug)]
pub struct PredictArgs {
    /// JSON request, e.g. '{"text": "ما هو ناتج ضرب 5 × 4؟"}'
    #[arg(allow_hyphen_values = true)]
    pub request: Option<String>,

    /// Extra positional arguments, ignored
    #[arg(hide = true, allow_hyphen_values = true)]
    pub ignored: Vec<String>,

    /// Trained artifact directory
    #[arg(long, env = "QUESTION_CLASSIFIER_ARTIFACT_DIR")]
    pub artifact_dir: Option<PathBuf>,
}
