// ============================================================
// Layer 2: TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load, normalise and clean      (corpus pipeline)
//   Step 2: Drop unlabelled rows
//   Step 3: Optional stratified subsample  (Layer 4 - data)
//   Step 4: Seeded train/validation split  (Layer 4 - data)
//   Step 5: Build / load tokenizer from the training split (Layer 6 - infra)
//   Step 6: Encode both splits             (Layer 4 - data)
//   Step 7: Save configs                   (Layer 6 - infra)
//   Step 8: Run training loop              (Layer 5 - ml)

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use tokenizers::Tokenizer;

use crate::application::corpus::{load_clean_records, maybe_sample};
use crate::data::{
    dataset::{DetectionDataset, DetectionSample},
    encoding::encode_fixed,
    normalizer::DEFAULT_HUMAN_COLUMN,
    splitter::{split_train_val, DEFAULT_TRAIN_FRACTION},
};
use crate::domain::record::TextRecord;
use crate::infra::{checkpoint::CheckpointManager, tokenizer_store::TokenizerStore};
use crate::ml::early_stopping::DEFAULT_PATIENCE;
use crate::ml::model::{ClassifierSpec, EncoderConfig, HeadKind};
use crate::ml::trainer::{run_training, TrainingReport};

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run, saved as train_config.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data_path:        String,
    pub checkpoint_dir:   String,
    pub human_column:     String,
    pub max_seq_len:      usize,
    pub batch_size:       usize,
    pub epochs:           usize,
    pub lr:               f64,
    pub weight_decay:     f64,
    pub d_model:          usize,
    pub num_heads:        usize,
    pub num_layers:       usize,
    pub d_ff:             usize,
    pub dropout:          f64,
    pub vocab_size:       usize,
    pub head:             HeadKind,
    pub seed:             u64,
    pub train_fraction:   f64,
    pub patience:         usize,
    /// Rows per label to keep; None trains on everything
    pub sample_per_label: Option<usize>,
    /// Checkpoint dir whose encoder weights seed the new model
    pub init_from:        Option<String>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_path:        "data/train.csv".to_string(),
            checkpoint_dir:   "checkpoints".to_string(),
            human_column:     DEFAULT_HUMAN_COLUMN.to_string(),
            max_seq_len:      256,
            batch_size:       16,
            epochs:           10,
            lr:               2e-5,
            weight_decay:     0.01,
            d_model:          256,
            num_heads:        8,
            num_layers:       6,
            d_ff:             1024,
            dropout:          0.1,
            vocab_size:       30522,
            head:             HeadKind::SingleLogit,
            seed:             42,
            train_fraction:   DEFAULT_TRAIN_FRACTION,
            patience:         DEFAULT_PATIENCE,
            sample_per_label: None,
            init_from:        None,
        }
    }
}

impl TrainConfig {
    /// Architecture persisted next to the weights.
    pub fn classifier_spec(&self) -> ClassifierSpec {
        let encoder = EncoderConfig::new(
            self.vocab_size, self.max_seq_len, self.d_model,
            self.num_heads, self.num_layers, self.d_ff, self.dropout,
        );
        ClassifierSpec::new(encoder, self.head)
    }
}

/// Encoded, split datasets ready for the training loop.
pub struct PreparedData {
    pub train: DetectionDataset,
    pub val:   DetectionDataset,
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
    pub fn execute(&self) -> Result<TrainingReport> {
        let cfg  = &self.config;
        let data = self.prepare()?;

        let spec = cfg.classifier_spec();
        let ckpt = CheckpointManager::new(&cfg.checkpoint_dir);
        ckpt.save_spec(&spec)?;
        ckpt.save_config(cfg)?;

        let report = run_training(cfg, &spec, data.train, data.val, &ckpt)?;
        ckpt.save_report(&report)?;
        Ok(report)
    }

    /// Steps 1–6: everything up to the training loop.
    pub fn prepare(&self) -> Result<PreparedData> {
        let cfg = &self.config;

        let records = load_clean_records(&cfg.data_path, &cfg.human_column)?;
        let total   = records.len();
        let labelled: Vec<TextRecord> = records.into_iter().filter(|r| r.label.is_some()).collect();
        if labelled.len() < total {
            tracing::info!("Dropped {} unlabelled rows", total - labelled.len());
        }

        let labelled = maybe_sample(labelled, cfg.sample_per_label, 0, cfg.seed);
        if labelled.is_empty() {
            bail!("No labelled rows in '{}'; nothing to train on", cfg.data_path);
        }

        let (train_records, val_records) = split_train_val(labelled, cfg.train_fraction, cfg.seed);
        tracing::info!("Split: {} train, {} validation", train_records.len(), val_records.len());
        if train_records.is_empty() {
            bail!("Training split is empty; raise --train-fraction or add data");
        }

        // Validation text stays out of the vocabulary.
        let texts: Vec<String> = train_records.iter().map(|r| r.text.clone()).collect();
        let tokenizer = TokenizerStore::new(&cfg.checkpoint_dir)
            .load_or_build(&texts, cfg.vocab_size)?;

        let train = encode_records(&tokenizer, train_records, cfg)?;
        let val   = encode_records(&tokenizer, val_records, cfg)?;
        tracing::info!("Encoded {} training and {} validation samples", train.len(), val.len());

        Ok(PreparedData {
            train: DetectionDataset::new(train),
            val:   DetectionDataset::new(val),
        })
    }
}

fn encode_records(
    tokenizer: &Tokenizer,
    records:   Vec<TextRecord>,
    cfg:       &TrainConfig,
) -> Result<Vec<DetectionSample>> {
    records
        .into_iter()
        .filter_map(|r| r.label.map(|label| (r.text, label)))
        .map(|(text, label)| {
            encode_fixed(tokenizer, &text, cfg.max_seq_len, cfg.vocab_size)
                .map(|enc| DetectionSample::new(enc, label))
        })
        .collect()
}
