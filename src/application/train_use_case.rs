// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load and clean examples    (Layer 4 - data)
//   Step 2: Split train/validation     (Layer 4 - data)
//   Step 3: Load or build tokenizer    (Layer 6 - infra)
//   Step 4: Encode splits, datasets    (Layer 4 - data)
//   Step 5: Model config               (Layer 5 - ml)
//   Step 6: Fine-tune                  (Layer 5 - ml)
//   Step 7: Save and verify artifact   (Layer 6 - infra)
//
// Errors in steps 1-6 propagate. Step 7 never fails the run:
// its outcome is returned as a SaveReport and logged.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokenizers::Tokenizer;

use crate::data::{
    dataset::QuestionDataset,
    encoding::encode_texts,
    loader::{BuiltinExamples, JsonlExampleLoader},
    preprocessor::Preprocessor,
    splitter::split_train_val,
};
use crate::domain::{
    example::{Example, Label},
    traits::ExampleSource,
};
use crate::infra::{
    artifact::{ArtifactStore, DirState, WeightsFormat},
    checkpoint::CheckpointManager,
    metrics::MetricsLogger,
    tokenizer_store::{configure, id_space, TokenizerStore},
};
use crate::ml::{
    backend::InferBackend,
    model::{Classifier, ClassifierConfig},
    trainer::run_training,
};

// ─── Training Configuration ──────────────────────────────────────────────────
// All settings for a training run. Saved as train_config.json
// next to the weights so a run can be reproduced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
    pub output_dir:       PathBuf,
    pub dataset:          Option<PathBuf>,
    pub base_tokenizer:   Option<PathBuf>,
    pub base_weights:     Option<PathBuf>,
    pub checkpoint_dir:   PathBuf,
    pub logging_dir:      PathBuf,
    pub learning_rate:    f64,
    pub train_batch_size: usize,
    pub eval_batch_size:  usize,
    pub epochs:           usize,
    pub weight_decay:     f64,
    pub save_total_limit: usize,
    pub logging_steps:    usize,
    pub seed:             u64,
    pub val_fraction:     f64,
    pub max_seq_len:      usize,
    pub d_model:          usize,
    pub num_heads:        usize,
    pub num_layers:       usize,
    pub d_ff:             usize,
    pub dropout:          f64,
    pub vocab_size:       usize,
    pub weights_format:   WeightsFormat,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            output_dir:       PathBuf::from("trained_model"),
            dataset:          None,
            base_tokenizer:   None,
            base_weights:     None,
            checkpoint_dir:   PathBuf::from("results"),
            logging_dir:      PathBuf::from("logs"),
            learning_rate:    2e-5,
            train_batch_size: 4,
            eval_batch_size:  4,
            epochs:           3,
            weight_decay:     0.01,
            save_total_limit: 1,
            logging_steps:    10,
            seed:             42,
            val_fraction:     0.2,
            max_seq_len:      128,
            d_model:          128,
            num_heads:        4,
            num_layers:       2,
            d_ff:             512,
            dropout:          0.1,
            vocab_size:       30522,
            weights_format:   WeightsFormat::Compact,
        }
    }
}

// ─── SaveReport ──────────────────────────────────────────────────────────────
/// Outcome of the save + verify step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveReport {
    /// Artifact written; the directory listing at verification time
    Saved { files: Vec<String> },
    /// SaveVerificationFailed: the run still counts as complete
    VerificationFailed { reason: String },
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end
    pub fn execute(&self) -> Result<SaveReport> {
        let cfg = &self.config;

        // ── Step 1: Load and clean examples ───────────────────────────────────
        let examples = self.load_examples()?;
        if examples.len() < 2 {
            anyhow::bail!("Need at least 2 examples to train, found {}", examples.len());
        }
        tracing::info!("Loaded {} examples", examples.len());

        // ── Step 2: Train / validation split ──────────────────────────────────
        let (train, val) = split_train_val(examples, cfg.val_fraction, cfg.seed);
        if train.is_empty() {
            anyhow::bail!("Training split is empty (val_fraction={})", cfg.val_fraction);
        }
        tracing::info!("Split: {} train, {} validation", train.len(), val.len());

        // ── Step 3: Tokenizer ─────────────────────────────────────────────────
        let all_texts: Vec<String> = train.iter().chain(&val).map(|ex| ex.text.clone()).collect();
        let mut tokenizer = TokenizerStore::load_or_build(
            cfg.base_tokenizer.as_deref(), &all_texts, cfg.vocab_size,
        )?;
        configure(&mut tokenizer, cfg.max_seq_len)?;

        // ── Step 4: Encode splits into datasets ───────────────────────────────
        let train_dataset = to_dataset(&tokenizer, &train).context("Cannot encode training split")?;
        let val_dataset   = to_dataset(&tokenizer, &val).context("Cannot encode validation split")?;
        tracing::info!(
            "Encoded splits: train length {}, validation length {}",
            train_dataset.seq_len(), val_dataset.seq_len(),
        );

        // ── Step 5: Model architecture ────────────────────────────────────────
        let model_cfg = ClassifierConfig::new(
            id_space(&tokenizer), cfg.max_seq_len, cfg.d_model,
            cfg.num_heads, cfg.num_layers, cfg.d_ff,
        )
        .with_dropout(cfg.dropout)
        .with_num_labels(Label::COUNT);

        // ── Step 6: Fine-tune ─────────────────────────────────────────────────
        let ckpt    = CheckpointManager::new(&cfg.checkpoint_dir, cfg.save_total_limit, cfg.weights_format)?;
        let metrics = MetricsLogger::new(&cfg.logging_dir)?;
        let outcome = run_training(cfg, &model_cfg, train_dataset, val_dataset, &ckpt, &metrics)?;
        tracing::info!("Metrics written to '{}'", metrics.csv_path().display());
        match outcome.history.last() {
            Some(last) => tracing::info!(
                "Final epoch {}: train_loss={:.4} val_loss={:.4} val_acc={:.1}%",
                last.epoch, last.train_loss, last.val_loss, last.val_accuracy * 100.0,
            ),
            None => tracing::info!("No epochs run; keeping the starting weights"),
        }
        if let Some(latest) = ckpt.latest()? {
            tracing::info!("Latest checkpoint: '{}'", latest.display());
        }

        // ── Step 7: Save and verify ───────────────────────────────────────────
        let report = match self.save_artifact(&outcome.model, &model_cfg, &tokenizer) {
            Ok(files) => {
                tracing::info!("Model saved to '{}'", cfg.output_dir.display());
                SaveReport::Saved { files }
            }
            Err(e) => {
                tracing::error!("SaveVerificationFailed: {e:#}");
                SaveReport::VerificationFailed { reason: format!("{e:#}") }
            }
        };
        Ok(report)
    }

    fn load_examples(&self) -> Result<Vec<Example>> {
        let raw = match &self.config.dataset {
            Some(path) => {
                tracing::info!("Loading examples from '{}'", path.display());
                JsonlExampleLoader::new(path).load_all()?
            }
            None => BuiltinExamples.load_all()?,
        };

        let preprocessor = Preprocessor::new();
        Ok(raw
            .into_iter()
            .map(|ex| Example { text: preprocessor.clean(&ex.text), ..ex })
            .collect())
    }

    fn save_artifact(
        &self,
        model:     &Classifier<InferBackend>,
        model_cfg: &ClassifierConfig,
        tokenizer: &Tokenizer,
    ) -> Result<Vec<String>> {
        let cfg   = &self.config;
        let store = ArtifactStore::new(&cfg.output_dir);

        match store.ensure_dir()? {
            DirState::Created        => tracing::info!("Created output directory '{}'", store.dir().display()),
            DirState::AlreadyExisted => tracing::info!("Output directory '{}' already exists", store.dir().display()),
        }

        store.save_model(model, cfg.weights_format)?;
        store.save_tokenizer(tokenizer)?;
        store.save_model_config(model_cfg)?;
        store.save_train_config(cfg)?;

        let format = store.verify()?;
        tracing::info!("Verified weights file '{}'", format.file_name());
        store.list_files()
    }
}

fn to_dataset(tokenizer: &Tokenizer, examples: &[Example]) -> Result<QuestionDataset> {
    let texts: Vec<String> = examples.iter().map(|ex| ex.text.clone()).collect();
    let labels: Vec<i64>   = examples.iter().map(|ex| ex.label).collect();
    Ok(QuestionDataset::new(encode_texts(tokenizer, &texts)?, labels)?)
}
