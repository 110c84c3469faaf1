// ============================================================
// Layer 5: Training Loop
// ============================================================
// Train + validation loop using Burn's DataLoader and AdamW.
//
//   - Training runs on an AutodiffBackend for gradients
//   - model.valid() returns the model on B::InnerBackend (dropout off)
//   - The validation batcher uses the inner backend too
//   - The validated model with the lowest val loss is kept in memory
//     and persisted once training ends
//
// Reference: Burn Book §5, Loshchilov & Hutter (2019) AdamW

use anyhow::Result;
use burn::{
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    optim::{AdamWConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use serde::{Deserialize, Serialize};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::DetectionBatcher, dataset::DetectionDataset};
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::{EpochMetrics, MetricsLogger},
};
use crate::ml::early_stopping::{ModelSelection, Progress};
use crate::ml::model::{correct_predictions, ClassifierSpec, DetectorModel};

pub type TrainBackend = burn::backend::Autodiff<burn::backend::Wgpu>;

/// Summary of a finished run, saved as training_report.json.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub best_epoch:    usize,
    pub best_val_loss: f64,
    pub epochs_run:    usize,
    pub stopped_early: bool,
    /// Final-epoch train loss more than 0.1 below its val loss
    pub overfitting:   bool,
}

/// Build the model on the WGPU device and train it.
pub fn run_training(
    cfg:           &TrainConfig,
    spec:          &ClassifierSpec,
    train_dataset: DetectionDataset,
    val_dataset:   DetectionDataset,
    ckpt_manager:  &CheckpointManager,
) -> Result<TrainingReport> {
    let device = burn::backend::wgpu::WgpuDevice::default();
    tracing::info!("Using WGPU device: {:?}", device);

    let model = build_model::<TrainBackend>(cfg, spec, &device)?;
    train_loop(cfg, model, train_dataset, val_dataset, ckpt_manager, device)
}

/// Fresh classifier, or one whose encoder is warm-started from `cfg.init_from`.
pub fn build_model<B: Backend>(
    cfg:    &TrainConfig,
    spec:   &ClassifierSpec,
    device: &B::Device,
) -> Result<DetectorModel<B>> {
    let model = match &cfg.init_from {
        Some(dir) => {
            let source  = CheckpointManager::new(dir);
            let encoder = source.load_encoder(spec.encoder.init::<B>(device), device)?;
            tracing::info!("Encoder initialised from '{}'", dir);
            spec.with_encoder(encoder, device)
        }
        None => spec.init(device),
    };
    tracing::info!(
        "Model ready: {} layers, d_model={}, head={:?}",
        spec.encoder.num_layers, spec.encoder.d_model, spec.head,
    );
    Ok(model)
}

pub fn train_loop<B: AutodiffBackend>(
    cfg:           &TrainConfig,
    mut model:     DetectorModel<B>,
    train_dataset: DetectionDataset,
    val_dataset:   DetectionDataset,
    ckpt_manager:  &CheckpointManager,
    device:        B::Device,
) -> Result<TrainingReport> {
    let (human, ai) = train_dataset.label_counts();
    tracing::info!("Training on {} samples ({} human, {} AI)", human + ai, human, ai);

    let has_validation = val_dataset.sample_count() > 0;
    if !has_validation {
        tracing::warn!("Validation set is empty; model selection falls back to training loss");
    }

    let mut optim = AdamWConfig::new()
        .with_weight_decay(cfg.weight_decay as f32)
        .init();

    let train_loader = DataLoaderBuilder::new(DetectionBatcher::<B>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .num_workers(1)
        .build(train_dataset);

    let val_loader = has_validation.then(|| {
        DataLoaderBuilder::new(DetectionBatcher::<B::InnerBackend>::new(device.clone()))
            .batch_size(cfg.batch_size)
            .num_workers(1)
            .build(val_dataset)
    });

    let metrics = MetricsLogger::new(ckpt_manager.dir())?;
    let epochs  = cfg.epochs.max(1);

    let mut selection = ModelSelection::<DetectorModel<B::InnerBackend>>::new(cfg.patience);
    let mut last: Option<EpochMetrics> = None;

    for epoch in 1..=epochs {
        // ── Training phase ───────────────────────────────────────────────────
        let mut train_loss_sum = 0.0f64;
        let mut train_batches  = 0usize;
        let mut train_correct  = 0usize;
        let mut train_seen     = 0usize;

        for batch in train_loader.iter() {
            let logits = model.forward(batch.input_ids, batch.attention_mask);
            let loss   = model.loss(logits.clone(), batch.labels.clone());

            let probs = model.ai_probabilities(logits.detach());
            train_correct += correct_predictions(probs, batch.labels.clone());
            train_seen    += batch.labels.dims()[0];

            train_loss_sum += loss.clone().into_scalar().elem::<f64>();
            train_batches  += 1;

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.lr, model, grads);
        }

        let train_loss = mean(train_loss_sum, train_batches);
        let train_acc  = ratio(train_correct, train_seen);

        // ── Validation phase ─────────────────────────────────────────────────
        let model_valid = model.valid();

        let mut val_loss_sum = 0.0f64;
        let mut val_batches  = 0usize;
        let mut val_correct  = 0usize;
        let mut val_seen     = 0usize;

        for batch in val_loader.iter().flat_map(|loader| loader.iter()) {
            let logits = model_valid.forward(batch.input_ids, batch.attention_mask);
            let loss   = model_valid.loss(logits.clone(), batch.labels.clone());
            val_loss_sum += loss.into_scalar().elem::<f64>();
            val_batches  += 1;

            let probs = model_valid.ai_probabilities(logits);
            val_correct += correct_predictions(probs, batch.labels.clone());
            val_seen    += batch.labels.dims()[0];
        }

        let (val_loss, val_acc) = if val_batches > 0 {
            (mean(val_loss_sum, val_batches), ratio(val_correct, val_seen))
        } else {
            (train_loss, train_acc)
        };

        let row = EpochMetrics::new(epoch, train_loss, train_acc, val_loss, val_acc);
        metrics.log(&row)?;

        let progress = selection.offer(epoch, val_loss, model_valid);
        println!(
            "Epoch {:>3}/{} | train_loss={:.4} | train_acc={:.1}% | val_loss={:.4} | val_acc={:.1}%{}",
            epoch, epochs, train_loss, train_acc * 100.0, val_loss, val_acc * 100.0,
            if progress == Progress::Improved { " *" } else { "" },
        );

        last = Some(row);
        match progress {
            Progress::Improved => {}
            Progress::Stalled { stale_epochs } => {
                tracing::debug!("No improvement for {} epoch(s)", stale_epochs);
            }
            Progress::Stop => {
                tracing::info!(
                    "Early stopping at epoch {}: no improvement for {} epochs",
                    epoch, cfg.patience,
                );
                break;
            }
        }
    }

    let best_epoch    = selection.best_epoch().unwrap_or(0);
    let best_val_loss = selection.best_loss();
    let epochs_run    = selection.epochs_run();
    let stopped_early = selection.stopped_early();

    // Every epoch was NaN: keep the final weights rather than nothing.
    let best_model = selection.into_best().unwrap_or_else(|| model.valid());
    ckpt_manager.save_model(&best_model)?;
    ckpt_manager.save_encoder(&best_model.encoder)?;

    let overfitting = last.as_ref().is_some_and(EpochMetrics::is_overfitting);
    if let Some(row) = &last {
        if overfitting {
            tracing::warn!(
                "Possible overfitting: train_loss={:.4} is well below val_loss={:.4}",
                row.train_loss, row.val_loss,
            );
        }
    }

    let report = TrainingReport {
        best_epoch,
        best_val_loss,
        epochs_run,
        stopped_early,
        overfitting,
    };
    tracing::info!(
        "Training complete: best epoch {} (val_loss={:.4}), {} epochs run, metrics in '{}'",
        report.best_epoch, report.best_val_loss, report.epochs_run, metrics.csv_path().display(),
    );
    Ok(report)
}

fn mean(sum: f64, count: usize) -> f64 {
    if count > 0 { sum / count as f64 } else { f64::NAN }
}

fn ratio(hits: usize, total: usize) -> f64 {
    if total > 0 { hits as f64 / total as f64 } else { 0.0 }
}
