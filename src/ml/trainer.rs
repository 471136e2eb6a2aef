// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Fine-tunes the classifier with Burn's DataLoader and AdamW.
//
//   - Training uses TrainBackend (Autodiff<InferBackend>)
//   - model.valid() returns the model on InferBackend with
//     dropout disabled; the validation batcher uses it too
//   - argmax(1) returns [batch, 1] so it is flattened before
//     comparing with labels [batch]
//
// Every epoch: train, evaluate, checkpoint, append metrics.

use anyhow::{Context, Result};
use burn::{
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    nn::loss::CrossEntropyLossConfig,
    optim::{AdamWConfig, GradientsParams, Optimizer},
    prelude::*,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::ClassificationBatcher, dataset::QuestionDataset};
use crate::infra::{
    artifact::WeightsFormat,
    checkpoint::CheckpointManager,
    metrics::{EpochMetrics, MetricsLogger},
};
use crate::ml::backend::{default_device, Device, InferBackend, TrainBackend};
use crate::ml::model::{Classifier, ClassifierConfig};

/// The fine-tuned model (on the inference backend) and its per-epoch metrics.
pub struct TrainOutcome {
    pub model:   Classifier<InferBackend>,
    pub history: Vec<EpochMetrics>,
}

pub fn run_training(
    cfg:           &TrainConfig,
    model_cfg:     &ClassifierConfig,
    train_dataset: QuestionDataset,
    val_dataset:   QuestionDataset,
    ckpt_manager:  &CheckpointManager,
    metrics:       &MetricsLogger,
) -> Result<TrainOutcome> {
    let device = default_device();
    tracing::info!("Using device: {:?}", device);
    TrainBackend::seed(cfg.seed);

    let model = build_model(cfg, model_cfg, &device)?;
    train_loop(cfg, model, train_dataset, val_dataset, ckpt_manager, metrics, device)
}

/// Fresh weights, or the `--base-weights` record as the starting point.
fn build_model(
    cfg:       &TrainConfig,
    model_cfg: &ClassifierConfig,
    device:    &Device,
) -> Result<Classifier<TrainBackend>> {
    tracing::info!(
        "Model ready: {} layers, d_model={}, vocab={}",
        model_cfg.num_layers, model_cfg.d_model, model_cfg.vocab_size,
    );

    match &cfg.base_weights {
        Some(path) => {
            let format = WeightsFormat::from_path(path);
            tracing::info!("Fine-tuning from base weights '{}' ({:?})", path.display(), format);
            format
                .load(model_cfg, format.stem_of(path), device)
                .context("Base weights are incompatible with this tokenizer and architecture")
        }
        None => Ok(model_cfg.init(device)),
    }
}

fn train_loop(
    cfg:           &TrainConfig,
    mut model:     Classifier<TrainBackend>,
    train_dataset: QuestionDataset,
    val_dataset:   QuestionDataset,
    ckpt_manager:  &CheckpointManager,
    metrics:       &MetricsLogger,
    device:        Device,
) -> Result<TrainOutcome> {

    // ── AdamW optimiser ───────────────────────────────────────────────────────
    // Adam update plus decoupled weight decay: θ = θ - lr * (m / (√v + ε) + λθ)
    let mut optim = AdamWConfig::new()
        .with_weight_decay(cfg.weight_decay as f32)
        .with_epsilon(1e-8)
        .init();

    // ── Training data loader (TrainBackend) ───────────────────────────────────
    let train_loader = DataLoaderBuilder::new(ClassificationBatcher::<TrainBackend>::new(device.clone()))
        .batch_size(cfg.train_batch_size)
        .shuffle(cfg.seed)
        .num_workers(1)
        .build(train_dataset);

    // ── Validation data loader (InferBackend, no autodiff overhead) ───────────
    let val_loader = DataLoaderBuilder::new(ClassificationBatcher::<InferBackend>::new(device.clone()))
        .batch_size(cfg.eval_batch_size)
        .num_workers(1)
        .build(val_dataset);

    let mut history = Vec::with_capacity(cfg.epochs);
    let mut step    = 0usize;

    for epoch in 1..=cfg.epochs {

        // ── Training phase ────────────────────────────────────────────────────
        let mut train_loss_sum = 0.0f64;
        let mut train_batches  = 0usize;

        for batch in train_loader.iter() {
            let (loss, _) = model.forward_loss(batch.input_ids, batch.attention_mask, batch.labels);

            let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
            train_loss_sum += loss_val;
            train_batches  += 1;
            step           += 1;

            if cfg.logging_steps > 0 && step % cfg.logging_steps == 0 {
                tracing::info!("step {:>5} | loss={:.4}", step, loss_val);
            }

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.learning_rate, model, grads);
        }

        let train_loss = if train_batches > 0 { train_loss_sum / train_batches as f64 } else { f64::NAN };

        // ── Validation phase ──────────────────────────────────────────────────
        let model_valid = model.valid();

        let mut val_loss_sum  = 0.0f64;
        let mut val_batches   = 0usize;
        let mut correct       = 0usize;
        let mut total_samples = 0usize;

        for batch in val_loader.iter() {
            let logits = model_valid.forward(batch.input_ids, batch.attention_mask);

            let loss = CrossEntropyLossConfig::new()
                .init(&logits.device())
                .forward(logits.clone(), batch.labels.clone());
            val_loss_sum += loss.into_scalar().elem::<f64>();
            val_batches  += 1;

            let predicted = logits.argmax(1).flatten::<1>(0, 1);
            total_samples += batch.labels.dims()[0];
            let hits: i64 = predicted
                .equal(batch.labels)
                .int().sum().into_scalar().elem::<i64>();
            correct += hits as usize;
        }

        let val_loss = if val_batches   > 0 { val_loss_sum / val_batches as f64 } else { f64::NAN };
        let val_acc  = if total_samples > 0 { correct as f64 / total_samples as f64 } else { 0.0 };

        let row = EpochMetrics::new(epoch, train_loss, val_loss, val_acc);
        tracing::info!(
            "Epoch {:>3}/{} | train_loss={:.4} | val_loss={:.4} | val_acc={:.1}%",
            epoch, cfg.epochs, train_loss, val_loss, val_acc * 100.0,
        );
        metrics.log(&row)?;
        history.push(row);

        let path = ckpt_manager.save_epoch(&model, epoch)?;
        tracing::info!("Checkpoint saved: '{}'", path.display());
    }

    tracing::info!("Training complete after {} steps", step);
    Ok(TrainOutcome { model: model.valid(), history })
}
