// ============================================================
// Layer 4 — Classification Batcher
// ============================================================
// Implements Burn's Batcher trait to stack ClassificationItems
// into tensors:
//
//   Input:  Vec of N items, each with rows of length S
//   Output: input_ids [N, S], attention_mask [N, S], labels [N]
//
// Rows are already padded to a common length by the tokenizer,
// so batching is a flatten + reshape. A missing attention_mask
// field means "no padding" and becomes all ones.

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::ClassificationItem;
use crate::data::encoding::{ATTENTION_MASK, INPUT_IDS};

#[derive(Debug, Clone)]
pub struct ClassificationBatch<B: Backend> {
    /// Token ids — shape: [batch_size, seq_len]
    pub input_ids: Tensor<B, 2, Int>,

    /// 1 = real token, 0 = padding — shape: [batch_size, seq_len]
    pub attention_mask: Tensor<B, 2, Int>,

    /// Class index per item — shape: [batch_size]
    pub labels: Tensor<B, 1, Int>,
}

#[derive(Clone, Debug)]
pub struct ClassificationBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> ClassificationBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<ClassificationItem, ClassificationBatch<B>> for ClassificationBatcher<B> {
    fn batch(&self, items: Vec<ClassificationItem>) -> ClassificationBatch<B> {
        let batch_size = items.len();
        let seq_len    = items
            .first()
            .and_then(|item| item.feature(INPUT_IDS))
            .map_or(0, <[i64]>::len);

        let input_flat: Vec<i64> = items
            .iter()
            .flat_map(|item| item.feature(INPUT_IDS).unwrap_or_default().iter().copied())
            .collect();

        let mask_flat: Vec<i64> = items
            .iter()
            .flat_map(|item| match item.feature(ATTENTION_MASK) {
                Some(mask) => mask.to_vec(),
                None       => vec![1; seq_len],
            })
            .collect();

        let labels: Vec<i64> = items.iter().map(|item| item.label).collect();

        let input_ids = Tensor::<B, 2, Int>::from_data(
            TensorData::new(input_flat, [batch_size, seq_len]), &self.device,
        );
        let attention_mask = Tensor::<B, 2, Int>::from_data(
            TensorData::new(mask_flat, [batch_size, seq_len]), &self.device,
        );
        let labels = Tensor::<B, 1, Int>::from_data(
            TensorData::new(labels, [batch_size]), &self.device,
        );

        ClassificationBatch { input_ids, attention_mask, labels }
    }
}
