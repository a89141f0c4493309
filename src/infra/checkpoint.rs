// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores model weights using Burn's CompactRecorder.
//
// What gets saved:
//   1. Model weights (.mpk.gz file) — encoder + decoder parameters
//   2. latest_epoch.json            — which epoch was last saved
//   3. run_manifest.json            — config, reserved ids and
//                                     sequence widths of the run
//
// The manifest is what lets `evaluate` and `translate` rebuild
// the exact architecture, the same held-out split and the same
// padding widths before loading the weights.
//
// CompactRecorder stores weights in half precision, so the model
// that `evaluate` and `translate` load differs from the trained
// one by rounding (around 1e-4 per weight).
//
// File naming convention:
//   checkpoints/
//     model_epoch_1.mpk.gz
//     model_epoch_2.mpk.gz
//     ...
//     latest_epoch.json
//     run_manifest.json
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};
use serde_json;

use crate::application::train_use_case::RunManifest;
use crate::ml::model::Seq2Seq;

pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create a new CheckpointManager.
    /// Creates the directory if it doesn't already exist.
    pub fn new(dir: impl Into<String>) -> Result<Self> {
        let dir = PathBuf::from(dir.into());
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create checkpoint directory '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    /// Save model weights for a given epoch and mark it as latest.
    pub fn save_model<B: Backend>(
        &self,
        model: &Seq2Seq<B>,
        epoch: usize,
    ) -> Result<()> {
        // Recorder adds the extension
        let path = self.dir.join(format!("model_epoch_{epoch}"));

        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| {
                format!("Failed to save checkpoint to '{}'", path.display())
            })?;

        let latest_path = self.dir.join("latest_epoch.json");
        fs::write(&latest_path, serde_json::to_string(&epoch)?)
            .with_context(|| "Failed to write latest_epoch.json")?;

        tracing::debug!("Saved checkpoint: epoch {}", epoch);
        Ok(())
    }

    /// Load the latest saved weights into `model`.
    /// The architecture must match the checkpoint.
    pub fn load_model<B: Backend>(
        &self,
        model:  Seq2Seq<B>,
        device: &B::Device,
    ) -> Result<Seq2Seq<B>> {
        let epoch = self.latest_epoch()?;
        let path  = self.dir.join(format!("model_epoch_{epoch}"));

        tracing::info!("Loading checkpoint from epoch {}", epoch);

        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!("Cannot load checkpoint '{}'. Have you trained the model first?",
                    path.display())
            })?;

        Ok(model.load_record(record))
    }

    /// Save the run manifest. Called before training starts.
    pub fn save_manifest(&self, manifest: &RunManifest) -> Result<()> {
        let path = self.dir.join("run_manifest.json");
        let json = serde_json::to_string_pretty(manifest)?;

        fs::write(&path, json)
            .with_context(|| {
                format!("Cannot write manifest to '{}'", path.display())
            })?;

        tracing::debug!("Saved run manifest to '{}'", path.display());
        Ok(())
    }

    pub fn load_manifest(&self) -> Result<RunManifest> {
        let path = self.dir.join("run_manifest.json");

        let json = fs::read_to_string(&path)
            .with_context(|| {
                format!(
                    "Cannot read manifest from '{}'. \
                     Make sure you have run 'train' first.",
                    path.display()
                )
            })?;

        Ok(serde_json::from_str(&json)?)
    }

    fn latest_epoch(&self) -> Result<usize> {
        let path = self.dir.join("latest_epoch.json");

        let s = fs::read_to_string(&path)
            .with_context(|| {
                "Cannot find 'latest_epoch.json'. \
                 Have you run 'train' first?"
            })?;

        Ok(serde_json::from_str::<usize>(&s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::train_use_case::TrainConfig;
    use crate::data::dataset::SequenceLengths;
    use crate::domain::special_tokens::SpecialTokens;
    use crate::ml::model::Seq2SeqConfig;
    use burn::backend::NdArray;

    type B = NdArray;

    fn temp_dir(name: &str) -> String {
        std::env::temp_dir().join(name).to_string_lossy().to_string()
    }

    #[test]
    fn test_manifest_round_trip() {
        let ckpt = CheckpointManager::new(temp_dir("jobs_semparse_manifest_test")).unwrap();
        let manifest = RunManifest {
            config:            TrainConfig::default(),
            tokens:            SpecialTokens {
                source_pad: 5, source_unk: 4,
                target_sos: 0, target_eos: 1, target_pad: 9, target_unk: 8,
            },
            lengths:           SequenceLengths { source_len: 12, target_len: 30 },
            source_vocab_size: 6,
            target_vocab_size: 10,
        };
        ckpt.save_manifest(&manifest).unwrap();
        assert_eq!(ckpt.load_manifest().unwrap(), manifest);
    }

    #[test]
    fn test_model_round_trip() {
        let device = Default::default();
        let ckpt   = CheckpointManager::new(temp_dir("jobs_semparse_ckpt_test")).unwrap();
        let config = Seq2SeqConfig::new(6, 5, 4, 4, 0.0);

        let saved = config.init::<B>(&device);
        ckpt.save_model(&saved, 3).unwrap();
        let loaded = ckpt.load_model(config.init::<B>(&device), &device).unwrap();

        let a: Vec<f32> = saved.decoder.output.weight.val().into_data().iter::<f32>().collect();
        let b: Vec<f32> = loaded.decoder.output.weight.val().into_data().iter::<f32>().collect();
        assert_eq!(a.len(), b.len());
        // Weights come back through half precision
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).abs() < 1e-3, "{x} vs {y}");
        }
    }

    #[test]
    fn test_unusable_directory_is_error() {
        let blocker = std::env::temp_dir().join("jobs_semparse_ckpt_blocker");
        fs::write(&blocker, "not a directory").unwrap();
        let nested = blocker.join("checkpoints").to_string_lossy().to_string();
        assert!(CheckpointManager::new(nested).is_err());
    }

    #[test]
    fn test_missing_checkpoint_is_error() {
        let ckpt   = CheckpointManager::new(temp_dir("jobs_semparse_empty_ckpt_test")).unwrap();
        let device = Default::default();
        let model  = Seq2SeqConfig::new(6, 5, 4, 4, 0.0).init::<B>(&device);
        assert!(ckpt.load_model(model, &device).is_err());
    }
}
