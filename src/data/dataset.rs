use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

use crate::data::encoding::EncodedText;
use crate::domain::record::Label;

/// One fully tokenised and padded training sample.
/// Sequence format: [CLS] text [SEP] [PAD]...
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionSample {
    pub input_ids:      Vec<u32>,
    pub attention_mask: Vec<u32>,
    pub label:          usize,
}

impl DetectionSample {
    pub fn new(encoded: EncodedText, label: Label) -> Self {
        Self {
            input_ids:      encoded.input_ids,
            attention_mask: encoded.attention_mask,
            label:          label.as_index(),
        }
    }

    pub fn seq_len(&self) -> usize {
        self.input_ids.len()
    }
}

pub struct DetectionDataset {
    samples: Vec<DetectionSample>,
}

impl DetectionDataset {
    pub fn new(samples: Vec<DetectionSample>) -> Self { Self { samples } }

    pub fn sample_count(&self) -> usize { self.samples.len() }

    /// Number of samples per label index (human, ai)
    pub fn label_counts(&self) -> (usize, usize) {
        let ai = self.samples.iter().filter(|s| s.label == 1).count();
        (self.samples.len() - ai, ai)
    }
}

impl Dataset<DetectionSample> for DetectionDataset {
    fn get(&self, index: usize) -> Option<DetectionSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
