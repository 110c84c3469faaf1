// ============================================================
// Layer 2: Corpus Pipeline
// ============================================================
// Shared front half of `train` and `prepare`:
//
//   Step 1: Load the raw table          (Layer 4 - data)
//   Step 2: Normalise to (text, label)  (Layer 4 - data)
//   Step 3: Clean each text, drop rows that end up empty
//   Step 4: Optional stratified subsample

use anyhow::{Context, Result};

use crate::data::{
    loader::FileTableLoader,
    normalizer::DatasetNormalizer,
    preprocessor::Preprocessor,
    sampler::{stratified_sample, SampleSpec},
};
use crate::domain::{record::TextRecord, traits::TableSource};

/// Load `data_path`, normalise it and clean every text.
pub fn load_clean_records(data_path: &str, human_column: &str) -> Result<Vec<TextRecord>> {
    tracing::info!("Loading dataset from '{}'", data_path);
    let table = FileTableLoader::new(data_path).load_table()?;
    tracing::info!("Loaded {} rows, columns: {:?}", table.row_count(), table.columns);

    let records = DatasetNormalizer::new(human_column)
        .normalize(&table)
        .with_context(|| format!("Cannot normalise dataset '{data_path}'"))?;

    Ok(clean_records(records))
}

/// Clean texts with the preprocessor and drop rows left empty.
pub fn clean_records(records: Vec<TextRecord>) -> Vec<TextRecord> {
    let preprocessor = Preprocessor::new();
    let before = records.len();
    let cleaned: Vec<TextRecord> = records
        .into_iter()
        .map(|r| TextRecord::new(preprocessor.clean(&r.text), r.label))
        .filter(|r| !r.is_blank())
        .collect();

    if cleaned.len() < before {
        tracing::info!("Dropped {} rows that were empty after cleaning", before - cleaned.len());
    }
    cleaned
}

/// Subsample when `per_label` is set, otherwise return the records unchanged.
pub fn maybe_sample(
    records:   Vec<TextRecord>,
    per_label: Option<usize>,
    unlabeled: usize,
    seed:      u64,
) -> Vec<TextRecord> {
    match per_label {
        Some(per_label) => {
            let sampled = stratified_sample(records, SampleSpec { per_label, unlabeled, seed });
            tracing::info!("Sampled {} rows ({} per label, seed {})", sampled.len(), per_label, seed);
            sampled
        }
        None => records,
    }
}
