// ============================================================
// Layer 6: Checkpoint Manager
// ============================================================
// Saves and restores classifier weights using Burn's CompactRecorder.
//
// File layout:
//   checkpoints/
//     model_config.json      ← ClassifierSpec (architecture + head + label map)
//     best_model.mpk         ← full classifier at the lowest validation loss
//     encoder.mpk            ← encoder only, reusable as a warm start/fallback
//     train_config.json      ← hyperparameters of the run
//     training_report.json   ← best epoch, losses, early-stop flags
//     tokenizer.json         ← written by TokenizerStore
//     metrics.csv            ← written by MetricsLogger
//
// The spec must be loaded first: the model is rebuilt from it and
// the record is then loaded into that model. Loading fails if the
// architecture doesn't match the saved weights.
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};
use serde::{de::DeserializeOwned, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::{ClassifierSpec, DetectorModel, TextEncoder};
use crate::ml::trainer::TrainingReport;

const SPEC_FILE:    &str = "model_config.json";
const CONFIG_FILE:  &str = "train_config.json";
const REPORT_FILE:  &str = "training_report.json";
const MODEL_STEM:   &str = "best_model";
const ENCODER_STEM: &str = "encoder";
/// Extensions the file recorders append to the stem (CompactRecorder writes .mpk).
const RECORD_EXTS:  [&str; 2] = ["mpk", "mpk.gz"];

/// Manages saving and loading of classifier checkpoints in one directory.
#[derive(Debug, Clone)]
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Does not touch the filesystem; directories are created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// True when both the spec and the best weights are present.
    pub fn has_checkpoint(&self) -> bool {
        self.dir.join(SPEC_FILE).exists() && self.record_exists(MODEL_STEM)
    }

    pub fn has_encoder(&self) -> bool {
        self.record_exists(ENCODER_STEM)
    }

    // ── Weights ──────────────────────────────────────────────────────────────

    /// Persist the full classifier as best_model.mpk
    pub fn save_model<B: Backend>(&self, model: &DetectorModel<B>) -> Result<()> {
        self.ensure_dir()?;
        let path = self.dir.join(MODEL_STEM);
        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save model to '{}'", path.display()))?;
        tracing::debug!("Saved model weights to '{}'", path.display());
        Ok(())
    }

    /// Restore best_model.mpk into `model`, which must match the saved architecture.
    pub fn load_model<B: Backend>(
        &self,
        model:  DetectorModel<B>,
        device: &B::Device,
    ) -> Result<DetectorModel<B>> {
        let path = self.dir.join(MODEL_STEM);
        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!("Cannot load model '{}'. Have you trained the model first?", path.display())
            })?;
        Ok(model.load_record(record))
    }

    pub fn save_encoder<B: Backend>(&self, encoder: &TextEncoder<B>) -> Result<()> {
        self.ensure_dir()?;
        let path = self.dir.join(ENCODER_STEM);
        CompactRecorder::new()
            .record(encoder.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save encoder to '{}'", path.display()))?;
        tracing::debug!("Saved encoder weights to '{}'", path.display());
        Ok(())
    }

    pub fn load_encoder<B: Backend>(
        &self,
        encoder: TextEncoder<B>,
        device:  &B::Device,
    ) -> Result<TextEncoder<B>> {
        let path = self.dir.join(ENCODER_STEM);
        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| format!("Cannot load encoder '{}'", path.display()))?;
        Ok(encoder.load_record(record))
    }

    // ── JSON side files ──────────────────────────────────────────────────────

    pub fn save_spec(&self, spec: &ClassifierSpec) -> Result<()> {
        self.save_json(SPEC_FILE, spec)
    }

    pub fn load_spec(&self) -> Result<ClassifierSpec> {
        self.load_json(SPEC_FILE)
    }

    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        self.save_json(CONFIG_FILE, cfg)
    }

    pub fn save_report(&self, report: &TrainingReport) -> Result<()> {
        self.save_json(REPORT_FILE, report)
    }

    fn save_json<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        self.ensure_dir()?;
        let path = self.dir.join(name);
        let json = serde_json::to_string_pretty(value)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write '{}'", path.display()))?;
        tracing::debug!("Saved '{}'", path.display());
        Ok(())
    }

    fn load_json<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let path = self.dir.join(name);
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read '{}'", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Malformed JSON in '{}'", path.display()))
    }

    fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create checkpoint dir '{}'", self.dir.display()))
    }

    fn record_exists(&self, stem: &str) -> bool {
        RECORD_EXTS
            .iter()
            .any(|ext| self.dir.join(format!("{stem}.{ext}")).exists())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::model::{EncoderConfig, HeadKind};
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn tiny_spec() -> ClassifierSpec {
        ClassifierSpec::new(EncoderConfig::new(128, 8, 16, 2, 1, 32, 0.0), HeadKind::SingleLogit)
    }

    #[test]
    fn test_spec_round_trip_and_has_checkpoint() {
        let dir  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path().join("ckpt"));
        assert!(!ckpt.has_checkpoint());

        let spec = tiny_spec();
        ckpt.save_spec(&spec).unwrap();
        let back = ckpt.load_spec().unwrap();
        assert_eq!(back.head, HeadKind::SingleLogit);
        assert_eq!(back.encoder.d_model, 16);
        assert_eq!(back.label_map, spec.label_map);

        // Spec alone is not a checkpoint
        assert!(!ckpt.has_checkpoint());

        let device = Default::default();
        let model: DetectorModel<TestBackend> = spec.init(&device);
        ckpt.save_model(&model).unwrap();
        assert!(ckpt.has_checkpoint());
        ckpt.load_model(spec.init::<TestBackend>(&device), &device).unwrap();
    }

    #[test]
    fn test_encoder_round_trip() {
        let dir    = tempfile::tempdir().unwrap();
        let ckpt   = CheckpointManager::new(dir.path());
        let device = Default::default();
        let spec   = tiny_spec();

        let model: DetectorModel<TestBackend> = spec.init(&device);
        assert!(!ckpt.has_encoder());
        ckpt.save_encoder(&model.encoder).unwrap();
        assert!(ckpt.has_encoder());

        let fresh = spec.encoder.init::<TestBackend>(&device);
        assert!(ckpt.load_encoder(fresh, &device).is_ok());
    }

    #[test]
    fn test_missing_spec_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = CheckpointManager::new(dir.path()).load_spec().unwrap_err();
        assert!(err.to_string().contains("model_config.json"));
    }
}
