// ============================================================
// Layer 4: Data Layer
// ============================================================
// From dataset files to device tensors:
//
//   loader.rs       - .csv / .jsonl / .json (or a directory) → RawTable
//   normalizer.rs   - RawTable → (text, label) records, single-column
//                     or wide one-column-per-model layouts
//   preprocessor.rs - idempotent text cleaning
//   sampler.rs      - seeded stratified subsampling
//   splitter.rs     - seeded train/validation split
//   encoding.rs     - [CLS] text [SEP] + padding, attention mask
//   dataset.rs      - Burn Dataset over encoded samples
//   batcher.rs      - Burn Batcher producing device tensors

pub mod loader;
pub mod normalizer;
pub mod preprocessor;
pub mod sampler;
pub mod splitter;
pub mod encoding;
pub mod dataset;
pub mod batcher;
