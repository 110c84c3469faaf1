// ============================================================
// Layer 4: Detection Batcher
// ============================================================
// Implements Burn's Batcher trait to convert a Vec<DetectionSample>
// into device tensors.
//
//   Input:  Vec of N samples, each padded to length S
//   Output: DetectionBatch with
//             input_ids       [N, S]  Int
//             attention_mask  [N, S]  Int
//             labels          [N]     Int  (0 = human, 1 = AI)
//
// Sequences are already padded to the same length, so batching
// is a flatten + reshape.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::DetectionSample;

#[derive(Debug, Clone)]
pub struct DetectionBatch<B: Backend> {
    pub input_ids:      Tensor<B, 2, Int>,
    pub attention_mask: Tensor<B, 2, Int>,
    pub labels:         Tensor<B, 1, Int>,
}

/// Holds the target device so tensors are created on the correct GPU/CPU.
#[derive(Clone, Debug)]
pub struct DetectionBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> DetectionBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<DetectionSample, DetectionBatch<B>> for DetectionBatcher<B> {
    fn batch(&self, items: Vec<DetectionSample>) -> DetectionBatch<B> {
        let batch_size = items.len();
        let seq_len    = items.first().map(DetectionSample::seq_len).unwrap_or(0);

        let input_flat: Vec<i32> = items
            .iter()
            .flat_map(|s| s.input_ids.iter().map(|&x| x as i32))
            .collect();

        let mask_flat: Vec<i32> = items
            .iter()
            .flat_map(|s| s.attention_mask.iter().map(|&x| x as i32))
            .collect();

        let labels: Vec<i32> = items.iter().map(|s| s.label as i32).collect();

        let input_ids = Tensor::<B, 1, Int>::from_ints(
            input_flat.as_slice(), &self.device
        ).reshape([batch_size, seq_len]);

        let attention_mask = Tensor::<B, 1, Int>::from_ints(
            mask_flat.as_slice(), &self.device
        ).reshape([batch_size, seq_len]);

        let labels = Tensor::<B, 1, Int>::from_ints(labels.as_slice(), &self.device);

        DetectionBatch { input_ids, attention_mask, labels }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    #[test]
    fn test_batch_shapes() {
        let device = Default::default();
        let batcher = DetectionBatcher::<NdArray>::new(device);
        let items = vec![
            DetectionSample { input_ids: vec![101, 5, 102, 0], attention_mask: vec![1, 1, 1, 0], label: 0 },
            DetectionSample { input_ids: vec![101, 6, 7, 102], attention_mask: vec![1, 1, 1, 1], label: 1 },
        ];
        let batch = batcher.batch(items);
        assert_eq!(batch.input_ids.dims(), [2, 4]);
        assert_eq!(batch.attention_mask.dims(), [2, 4]);
        assert_eq!(batch.labels.dims(), [2]);
    }
}
