// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves the model after every epoch and keeps only the newest
// `save_total_limit` checkpoints (0 keeps all of them).
//
// File naming convention:
//   results/
//     model_epoch_2.mpk.gz   ← removed once epoch 3 is saved (limit 1)
//     model_epoch_3.mpk.gz   ← weights after epoch 3
//
// Checkpoints use the same WeightsFormat as the final artifact.

use anyhow::{Context, Result};
use burn::prelude::*;
use std::{fs, path::PathBuf};

use crate::infra::artifact::WeightsFormat;
use crate::ml::model::Classifier;

const PREFIX: &str = "model_epoch_";

pub struct CheckpointManager {
    dir:              PathBuf,
    save_total_limit: usize,
    format:           WeightsFormat,
}

impl CheckpointManager {
    /// Create the manager and its directory.
    pub fn new(dir: impl Into<PathBuf>, save_total_limit: usize, format: WeightsFormat) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create checkpoint dir '{}'", dir.display()))?;
        Ok(Self { dir, save_total_limit, format })
    }

    /// Save weights for `epoch`, then prune older checkpoints.
    pub fn save_epoch<B: Backend>(&self, model: &Classifier<B>, epoch: usize) -> Result<PathBuf> {
        let stem = self.dir.join(format!("{PREFIX}{epoch}"));
        self.format.save(model, stem)?;

        let removed = self.prune()?;
        if !removed.is_empty() {
            tracing::debug!("Removed {} old checkpoint(s)", removed.len());
        }
        Ok(self.path_for(epoch))
    }

    /// Path of the newest checkpoint on disk, if any.
    pub fn latest(&self) -> Result<Option<PathBuf>> {
        Ok(self.saved_epochs()?.last().map(|&epoch| self.path_for(epoch)))
    }

    fn path_for(&self, epoch: usize) -> PathBuf {
        let name = self.format.file_name().replacen("model", &format!("{PREFIX}{epoch}"), 1);
        self.dir.join(name)
    }

    /// Epoch numbers with a checkpoint on disk, ascending.
    fn saved_epochs(&self) -> Result<Vec<usize>> {
        let suffix = self.format.file_name().trim_start_matches("model");
        let mut epochs = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let name = entry?.file_name().to_string_lossy().into_owned();
            let epoch = name
                .strip_prefix(PREFIX)
                .and_then(|rest| rest.strip_suffix(suffix))
                .and_then(|n| n.parse::<usize>().ok());
            if let Some(epoch) = epoch {
                epochs.push(epoch);
            }
        }
        epochs.sort_unstable();
        Ok(epochs)
    }

    /// Delete all but the newest `save_total_limit` checkpoints.
    fn prune(&self) -> Result<Vec<PathBuf>> {
        if self.save_total_limit == 0 {
            return Ok(Vec::new());
        }
        let epochs = self.saved_epochs()?;
        let excess = epochs.len().saturating_sub(self.save_total_limit);

        let mut removed = Vec::new();
        for &epoch in &epochs[..excess] {
            let path = self.path_for(epoch);
            fs::remove_file(&path)
                .with_context(|| format!("Cannot remove old checkpoint '{}'", path.display()))?;
            removed.push(path);
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &std::path::Path, name: &str) {
        fs::write(dir.join(name), b"w").unwrap();
    }

    #[test]
    fn test_prune_keeps_newest() {
        let temp = TempDir::new().unwrap();
        let mgr  = CheckpointManager::new(temp.path(), 1, WeightsFormat::Compact).unwrap();
        touch(temp.path(), "model_epoch_1.mpk.gz");
        touch(temp.path(), "model_epoch_2.mpk.gz");
        touch(temp.path(), "model_epoch_10.mpk.gz");
        touch(temp.path(), "notes.txt");

        let removed = mgr.prune().unwrap();
        assert_eq!(removed.len(), 2);
        assert_eq!(mgr.saved_epochs().unwrap(), vec![10]);
        assert!(temp.path().join("notes.txt").exists());
        assert_eq!(mgr.latest().unwrap(), Some(temp.path().join("model_epoch_10.mpk.gz")));
    }

    #[test]
    fn test_zero_limit_keeps_all() {
        let temp = TempDir::new().unwrap();
        let mgr  = CheckpointManager::new(temp.path(), 0, WeightsFormat::Full).unwrap();
        touch(temp.path(), "model_epoch_1.mpk");
        touch(temp.path(), "model_epoch_2.mpk");

        assert!(mgr.prune().unwrap().is_empty());
        assert_eq!(mgr.saved_epochs().unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_other_format_is_ignored() {
        let temp = TempDir::new().unwrap();
        let mgr  = CheckpointManager::new(temp.path(), 1, WeightsFormat::Full).unwrap();
        touch(temp.path(), "model_epoch_1.mpk.gz");
        assert!(mgr.saved_epochs().unwrap().is_empty());
        assert_eq!(mgr.latest().unwrap(), None);
    }

    #[test]
    fn test_save_epoch_writes_and_prunes() {
        use crate::ml::backend::{default_device, InferBackend};
        use crate::ml::model::ClassifierConfig;

        let temp   = TempDir::new().unwrap();
        let mgr    = CheckpointManager::new(temp.path().join("results"), 1, WeightsFormat::Compact).unwrap();
        let device = default_device();
        let model: Classifier<InferBackend> = ClassifierConfig::new(10, 4, 8, 2, 1, 16).init(&device);

        mgr.save_epoch(&model, 1).unwrap();
        let path = mgr.save_epoch(&model, 2).unwrap();
        assert!(path.exists());
        assert_eq!(mgr.saved_epochs().unwrap(), vec![2]);
    }
}
