// ============================================================
// Layer 5 — Inferencer
// ============================================================
// Loads a trained artifact and labels one question at a time.
//
//   text → Preprocessor (same cleaning as training) → tokenizer (truncation + padding) → EncodedBatch
//        → ClassificationBatch (1 row) → forward → argmax → Label
//
// Runs on InferBackend, so no gradients are tracked.

use anyhow::{Context, Result};
use burn::{data::dataloader::batcher::Batcher, prelude::*};
use std::path::Path;
use tokenizers::Tokenizer;

use crate::data::{
    batcher::{ClassificationBatch, ClassificationBatcher},
    dataset::ClassificationItem,
    encoding::{encode_texts, EncodedBatch, INPUT_IDS},
    preprocessor::Preprocessor,
};
use crate::domain::example::Label;
use crate::domain::traits::{ClassifierLoader, QuestionClassifier};
use crate::infra::{
    artifact::ArtifactStore,
    tokenizer_store::{configure, id_space},
};
use crate::ml::backend::{default_device, InferBackend};
use crate::ml::model::Classifier;

pub struct Inferencer {
    model:     Classifier<InferBackend>,
    tokenizer:    Tokenizer,
    preprocessor: Preprocessor,
    batcher:      ClassificationBatcher<InferBackend>,
}

impl Inferencer {
    /// Load tokenizer, config and weights from an artifact directory.
    pub fn load(artifact_dir: &Path) -> Result<Self> {
        let device = default_device();
        let store  = ArtifactStore::new(artifact_dir);

        let mut tokenizer = store.load_tokenizer()?;
        let (config, model) = store.load_model::<InferBackend>(&device)?;
        configure(&mut tokenizer, config.max_seq_len)?;

        let ids = id_space(&tokenizer);
        if ids > config.vocab_size {
            anyhow::bail!(
                "Tokenizer in '{}' produces ids up to {} but the model only embeds {}",
                artifact_dir.display(), ids, config.vocab_size,
            );
        }

        tracing::info!(
            "Model loaded from '{}' ({} layers, d_model={})",
            artifact_dir.display(), config.num_layers, config.d_model,
        );
        Ok(Self {
            model,
            tokenizer,
            preprocessor: Preprocessor::new(),
            batcher:      ClassificationBatcher::new(device),
        })
    }

    /// Clean and tokenise one text the way training examples were.
    fn encode(&self, text: &str) -> Result<EncodedBatch> {
        encode_texts(&self.tokenizer, &[self.preprocessor.clean(text)])
    }

    /// Class scores for one text, shape [1, num_labels].
    fn logits(&self, text: &str) -> Result<Tensor<InferBackend, 2>> {
        let encoded = self.encode(text)?;
        if encoded.field(INPUT_IDS).map_or(true, |rows| rows.iter().all(Vec::is_empty)) {
            anyhow::bail!("Text produced no tokens");
        }

        let features = encoded
            .fields()
            .map(|(name, rows)| (name.to_string(), rows[0].clone()))
            .collect();
        // The label is unused at inference time.
        let item = ClassificationItem { features, label: 0 };

        let ClassificationBatch { input_ids, attention_mask, .. } = self.batcher.batch(vec![item]);
        Ok(self.model.forward(input_ids, attention_mask))
    }
}

impl QuestionClassifier for Inferencer {
    fn classify(&self, text: &str) -> Result<Label> {
        let logits = self.logits(text)?;
        let index  = logits
            .argmax(1)
            .flatten::<1>(0, 1)
            .into_scalar()
            .elem::<i64>();

        tracing::debug!("Predicted class index {}", index);
        Label::from_index(index).with_context(|| format!("Model produced unknown class index {index}"))
    }
}

/// Builds an `Inferencer` from a directory on disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct ArtifactLoader;

impl ClassifierLoader for ArtifactLoader {
    type Classifier = Inferencer;

    fn load(&self, artifact_dir: &Path) -> Result<Inferencer> {
        Inferencer::load(artifact_dir)
    }
}
