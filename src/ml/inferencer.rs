// ============================================================
// Layer 5: Inferencer
// ============================================================
// Loads a classifier and turns one text into a Prediction:
//
//   text → clean → [CLS] tokens [SEP] [PAD]... → forward
//        → P(AI) (sigmoid, or softmax mass on the AI class)
//        → clamp to [0, 1] → Tier
//
// Loading order:
//   1. checkpoint dir: model_config.json + tokenizer.json + best_model
//   2. on any failure, a generic two-class encoder with a fresh head;
//      encoder weights come from the fallback dir when present
use anyhow::{anyhow, bail, Result};
use burn::prelude::*;
use std::path::PathBuf;
use tokenizers::Tokenizer;

use crate::data::{encoding::encode_fixed, preprocessor::Preprocessor};
use crate::domain::{traits::AiTextScorer, verdict::Prediction};
use crate::infra::{checkpoint::CheckpointManager, tokenizer_store::{self, TokenizerStore}};
use crate::ml::model::{ClassifierSpec, DetectorModel};

pub type InferBackend = burn::backend::Wgpu;

/// Where the loaded weights came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelSource {
    Checkpoint,
    Fallback { pretrained_encoder: bool },
}

#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub checkpoint_dir: PathBuf,
    /// Directory holding encoder weights and/or tokenizer.json for the fallback
    pub fallback_dir:   Option<PathBuf>,
    pub fallback_spec:  ClassifierSpec,
}

impl LoadOptions {
    pub fn new(checkpoint_dir: impl Into<PathBuf>) -> Self {
        Self {
            checkpoint_dir: checkpoint_dir.into(),
            fallback_dir:   None,
            fallback_spec:  ClassifierSpec::generic(),
        }
    }

    pub fn with_fallback_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.fallback_dir = dir;
        self
    }

    pub fn with_fallback_spec(mut self, spec: ClassifierSpec) -> Self {
        self.fallback_spec = spec;
        self
    }
}

pub struct Detector<B: Backend> {
    model:        DetectorModel<B>,
    tokenizer:    Tokenizer,
    preprocessor: Preprocessor,
    max_seq_len:  usize,
    vocab_size:   usize,
    source:       ModelSource,
    device:       B::Device,
}

impl<B: Backend> Detector<B> {
    /// Never fails on a missing or broken checkpoint; only the fallback can fail.
    pub fn load(opts: &LoadOptions, device: B::Device) -> Result<Self> {
        match Self::from_checkpoint(&opts.checkpoint_dir, device.clone()) {
            Ok(detector) => Ok(detector),
            Err(e) => {
                tracing::warn!(
                    "Could not load trained model from '{}': {:#}. Falling back to a generic encoder.",
                    opts.checkpoint_dir.display(),
                    e,
                );
                Self::fallback(opts, device)
            }
        }
    }

    pub fn from_checkpoint(dir: &std::path::Path, device: B::Device) -> Result<Self> {
        let ckpt = CheckpointManager::new(dir);
        if !ckpt.has_checkpoint() {
            bail!("No trained model in '{}'", dir.display());
        }
        let spec = inference_spec(ckpt.load_spec()?);
        let tokenizer = TokenizerStore::new(dir).load()?;
        let model = ckpt.load_model(spec.init::<B>(&device), &device)?;
        tracing::info!("Model loaded from '{}' (head={:?})", dir.display(), spec.head);
        Ok(Self::assemble(model, tokenizer, &spec, ModelSource::Checkpoint, device))
    }

    fn fallback(opts: &LoadOptions, device: B::Device) -> Result<Self> {
        let spec = inference_spec(opts.fallback_spec.clone());

        let mut pretrained_encoder = false;
        let mut encoder = spec.encoder.init::<B>(&device);
        if let Some(dir) = &opts.fallback_dir {
            let source = CheckpointManager::new(dir);
            if source.has_encoder() {
                match source.load_encoder(spec.encoder.init::<B>(&device), &device) {
                    Ok(loaded) => {
                        encoder = loaded;
                        pretrained_encoder = true;
                    }
                    Err(e) => tracing::warn!("Ignoring fallback encoder weights: {:#}", e),
                }
            }
        }
        if !pretrained_encoder {
            tracing::warn!("No pretrained encoder weights found; scores come from an untrained encoder");
        }
        let model = spec.with_encoder(encoder, &device);

        let tokenizer = fallback_tokenizer(opts, spec.encoder.vocab_size)?;
        let source    = ModelSource::Fallback { pretrained_encoder };
        Ok(Self::assemble(model, tokenizer, &spec, source, device))
    }

    fn assemble(
        model:     DetectorModel<B>,
        tokenizer: Tokenizer,
        spec:      &ClassifierSpec,
        source:    ModelSource,
        device:    B::Device,
    ) -> Self {
        Self {
            model,
            tokenizer,
            preprocessor: Preprocessor::new(),
            max_seq_len:  spec.encoder.max_seq_len,
            vocab_size:   spec.encoder.vocab_size,
            source,
            device,
        }
    }

    pub fn source(&self) -> ModelSource {
        self.source
    }

    pub fn predict(&self, text: &str) -> Result<Prediction> {
        let clean   = self.preprocessor.clean(text);
        let encoded = encode_fixed(&self.tokenizer, &clean, self.max_seq_len, self.vocab_size)?;
        let seq_len = encoded.input_ids.len();

        let to_tensor = |v: &[u32]| {
            let flat: Vec<i32> = v.iter().map(|&x| x as i32).collect();
            Tensor::<B, 1, Int>::from_ints(flat.as_slice(), &self.device).reshape([1, seq_len])
        };
        let input_ids      = to_tensor(&encoded.input_ids);
        let attention_mask = to_tensor(&encoded.attention_mask);

        let logits = self.model.forward(input_ids, attention_mask);
        let p: f64 = self.model.ai_probabilities(logits).into_scalar().elem::<f64>();

        let prediction = to_prediction(p)?;
        tracing::debug!("{} real tokens → {}", encoded.real_len(), prediction);
        Ok(prediction)
    }
}

impl<B: Backend> AiTextScorer for Detector<B> {
    fn predict(&self, text: &str) -> Result<Prediction> {
        Detector::predict(self, text)
    }
}

/// A NaN or infinite probability means the weights are broken; report it
/// instead of guessing a tier.
fn to_prediction(probability: f64) -> Result<Prediction> {
    Prediction::from_probability(probability)
        .ok_or_else(|| anyhow!("Model produced a non-finite AI probability ({probability})"))
}

/// Dropout is disabled for inference.
fn inference_spec(mut spec: ClassifierSpec) -> ClassifierSpec {
    spec.encoder.dropout = 0.0;
    spec
}

fn fallback_tokenizer(opts: &LoadOptions, vocab_size: usize) -> Result<Tokenizer> {
    if let Some(dir) = &opts.fallback_dir {
        let store = TokenizerStore::new(dir);
        if store.exists() {
            match store.load() {
                Ok(tok) => return Ok(tok),
                Err(e)  => tracing::warn!("Ignoring fallback tokenizer: {:#}", e),
            }
        }
    }
    tracing::warn!("No fallback tokenizer found; using a special-tokens-only vocabulary");
    tokenizer_store::build_in_memory(&[], vocab_size)
}
