// ============================================================
// Layer 5: ML / Model Layer (Burn)
// ============================================================
// All model, training and inference code built on Burn.
//
//   model.rs          - transformer encoder, masked mean pooling,
//                       single-logit or two-class head
//   early_stopping.rs - best-loss tracking with patience
//   trainer.rs        - AdamW train/validation loop, keeps the
//                       best model and writes it at the end
//   inferencer.rs     - checkpoint (or fallback) loading and
//                       per-text AI probability
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)
//            Vaswani et al. (2017) Attention Is All You Need
//            Devlin et al. (2019) BERT

/// Transformer encoder classifier
pub mod model;

/// Patience-based early stopping
pub mod early_stopping;

/// Training loop with validation and best-model checkpointing
pub mod trainer;

/// Detector: loads a classifier and scores texts
pub mod inferencer;
