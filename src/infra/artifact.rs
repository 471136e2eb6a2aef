// ============================================================
// Layer 6 — Artifact Store
// ============================================================
// The trained artifact is one directory:
//
//   <output_dir>/
//     model.mpk.gz        ← weights, CompactRecorder (half precision)
//       or model.mpk      ← weights, DefaultRecorder (full precision)
//     tokenizer.json      ← tokenizer incl. truncation/padding
//     config.json         ← ClassifierConfig, to rebuild the model
//     train_config.json   ← the TrainConfig the run used
//
// Burn records are type-checked against the module they load
// into, so config.json must be read first to rebuild an
// identically shaped model before the weights are applied.

use anyhow::{Context, Result};
use burn::{
    prelude::*,
    record::{CompactRecorder, DefaultRecorder, Recorder},
};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tokenizers::Tokenizer;

use crate::application::train_use_case::TrainConfig;
use crate::infra::tokenizer_store::TokenizerStore;
use crate::ml::model::{Classifier, ClassifierConfig};

pub const MODEL_CONFIG_FILE: &str = "config.json";
pub const TRAIN_CONFIG_FILE: &str = "train_config.json";

/// File stem shared by both weight formats; the recorder adds the extension.
const WEIGHTS_STEM: &str = "model";

/// The two recognised weight file conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum WeightsFormat {
    /// `model.mpk.gz`: gzipped MessagePack, half precision
    Compact,
    /// `model.mpk`: MessagePack, full precision
    Full,
}

impl WeightsFormat {
    pub const ALL: [WeightsFormat; 2] = [WeightsFormat::Compact, WeightsFormat::Full];

    pub fn file_name(self) -> &'static str {
        match self {
            WeightsFormat::Compact => "model.mpk.gz",
            WeightsFormat::Full    => "model.mpk",
        }
    }

    fn extension(self) -> &'static str {
        match self {
            WeightsFormat::Compact => ".mpk.gz",
            WeightsFormat::Full    => ".mpk",
        }
    }

    /// Guess the format of a weights file from its name.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("gz") => WeightsFormat::Compact,
            _          => WeightsFormat::Full,
        }
    }

    /// Strip this format's extension so the recorder can add it back.
    pub fn stem_of(self, path: &Path) -> PathBuf {
        let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        match name.strip_suffix(self.extension()) {
            Some(stem) => path.with_file_name(stem),
            None       => path.to_path_buf(),
        }
    }

    /// Write `model` to `path`; the recorder replaces any extension.
    pub fn save<B: Backend>(self, model: &Classifier<B>, path: PathBuf) -> Result<()> {
        let record = model.clone().into_record();
        match self {
            WeightsFormat::Compact => CompactRecorder::new().record(record, path.clone()),
            WeightsFormat::Full    => DefaultRecorder::new().record(record, path.clone()),
        }
        .with_context(|| format!("Failed to save weights to '{}'", path.display()))
    }

    /// Build a model from `config` and load the weights at `path` into it.
    /// Fails when the stored shapes do not match `config`.
    pub fn load<B: Backend>(
        self,
        config: &ClassifierConfig,
        path:   PathBuf,
        device: &B::Device,
    ) -> Result<Classifier<B>> {
        let record = match self {
            WeightsFormat::Compact => CompactRecorder::new().load(path.clone(), device),
            WeightsFormat::Full    => DefaultRecorder::new().load(path.clone(), device),
        }
        .with_context(|| format!("Cannot load weights from '{}'", path.display()))?;

        let model = config.init::<B>(device).load_record(record);
        model
            .check_shapes(config)
            .with_context(|| format!("Weights in '{}' do not fit the model", path.display()))?;
        Ok(model)
    }
}

/// Whether `ensure_dir` had to create the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirState {
    Created,
    AlreadyExisted,
}

pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn exists(&self) -> bool {
        self.dir.is_dir()
    }

    /// Create the artifact directory; an existing directory is not an error.
    pub fn ensure_dir(&self) -> Result<DirState> {
        if self.exists() {
            return Ok(DirState::AlreadyExisted);
        }
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create '{}'", self.dir.display()))?;
        Ok(DirState::Created)
    }

    pub fn save_model<B: Backend>(&self, model: &Classifier<B>, format: WeightsFormat) -> Result<PathBuf> {
        format.save(model, self.dir.join(WEIGHTS_STEM))?;
        Ok(self.dir.join(format.file_name()))
    }

    pub fn save_tokenizer(&self, tokenizer: &Tokenizer) -> Result<PathBuf> {
        TokenizerStore::new(&self.dir).save(tokenizer)
    }

    pub fn save_model_config(&self, config: &ClassifierConfig) -> Result<()> {
        let path = self.dir.join(MODEL_CONFIG_FILE);
        config
            .save(&path)
            .with_context(|| format!("Cannot write model config to '{}'", path.display()))
    }

    pub fn save_train_config(&self, config: &TrainConfig) -> Result<()> {
        let path = self.dir.join(TRAIN_CONFIG_FILE);
        let json = serde_json::to_string_pretty(config)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))
    }

    /// File names in the artifact directory, sorted.
    pub fn list_files(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)
            .with_context(|| format!("Cannot list '{}'", self.dir.display()))?
        {
            names.push(entry?.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    /// Check the directory listing for a recognised weights file.
    pub fn verify(&self) -> Result<WeightsFormat> {
        let files = self.list_files()?;
        tracing::info!("Artifact files: {:?}", files);

        WeightsFormat::ALL
            .into_iter()
            .find(|format| files.iter().any(|f| f == format.file_name()))
            .with_context(|| {
                format!(
                    "No model weights found in '{}' (expected {} or {})",
                    self.dir.display(),
                    WeightsFormat::Compact.file_name(),
                    WeightsFormat::Full.file_name(),
                )
            })
    }

    pub fn load_model_config(&self) -> Result<ClassifierConfig> {
        let path = self.dir.join(MODEL_CONFIG_FILE);
        ClassifierConfig::load(&path).map_err(|e| {
            anyhow::anyhow!("Cannot read model config from '{}': {e}", path.display())
        })
    }

    pub fn load_tokenizer(&self) -> Result<Tokenizer> {
        TokenizerStore::new(&self.dir).load()
    }

    /// Rebuild the classifier from config.json and load its weights.
    pub fn load_model<B: Backend>(&self, device: &B::Device) -> Result<(ClassifierConfig, Classifier<B>)> {
        let config = self.load_model_config()?;
        let format = self.verify()?;
        let model  = format.load(&config, self.dir.join(WEIGHTS_STEM), device)?;
        Ok((config, model))
    }
}
