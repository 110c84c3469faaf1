// ============================================================
// Layer 6: Infrastructure Layer
// ============================================================
// Persistence shared by training and detection:
//
//   checkpoint.rs - classifier weights via CompactRecorder,
//                   plus the JSON side files (classifier spec,
//                   train config, training report) needed to
//                   rebuild the model before loading weights.
//
//   tokenizer_store.rs - word-level tokenizer built from the
//                        training corpus, saved next to the
//                        checkpoint so detection uses the same
//                        vocabulary.
//
//   metrics.rs - per-epoch loss/accuracy CSV.
//
// Reference: Burn Book §5 (Checkpointing)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Tokenizer building, saving, and loading
pub mod tokenizer_store;

/// Training metrics CSV logger
pub mod metrics;
