use burn::data::dataset::Dataset;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::data::encoding::EncodedBatch;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DatasetError {
    #[error("label count {labels} does not match encoded row count {rows}")]
    LengthMismatch { labels: usize, rows: usize },

    #[error("index {index} out of range for dataset of size {size}")]
    IndexOutOfRange { index: usize, size: usize },

    #[error("field '{field}' has {rows} rows, expected {expected}")]
    FieldRowCount { field: String, rows: usize, expected: usize },

    #[error("field '{field}' row {row} has length {len}, expected {expected}")]
    RaggedField { field: String, row: usize, len: usize, expected: usize },
}

/// One example as the training loop sees it: a row from every encoded
/// field plus the class label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationItem {
    pub features: BTreeMap<String, Vec<i64>>,
    pub label:    i64,
}

impl ClassificationItem {
    pub fn feature(&self, name: &str) -> Option<&[i64]> {
        self.features.get(name).map(Vec::as_slice)
    }
}

/// Pairs an encoded split with its labels.
pub struct QuestionDataset {
    encodings: EncodedBatch,
    labels:    Vec<i64>,
}

impl QuestionDataset {
    pub fn new(encodings: EncodedBatch, labels: Vec<i64>) -> Result<Self, DatasetError> {
        if labels.len() != encodings.rows() {
            return Err(DatasetError::LengthMismatch {
                labels: labels.len(),
                rows:   encodings.rows(),
            });
        }
        Ok(Self { encodings, labels })
    }

    pub fn size(&self) -> usize {
        self.labels.len()
    }

    pub fn at(&self, index: usize) -> Result<ClassificationItem, DatasetError> {
        let label = *self.labels.get(index).ok_or(DatasetError::IndexOutOfRange {
            index,
            size: self.size(),
        })?;

        let features = self
            .encodings
            .fields()
            .map(|(name, rows)| (name.to_string(), rows[index].clone()))
            .collect();

        Ok(ClassificationItem { features, label })
    }

    pub fn seq_len(&self) -> usize {
        self.encodings.seq_len()
    }
}

impl Dataset<ClassificationItem> for QuestionDataset {
    fn get(&self, index: usize) -> Option<ClassificationItem> {
        self.at(index).ok()
    }

    fn len(&self) -> usize {
        self.size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::encoding::{ATTENTION_MASK, INPUT_IDS};

    fn batch(rows: &[&[i64]]) -> EncodedBatch {
        let ids: Vec<Vec<i64>> = rows.iter().map(|r| r.to_vec()).collect();
        let mask: Vec<Vec<i64>> = rows
            .iter()
            .map(|r| r.iter().map(|&t| i64::from(t != 0)).collect())
            .collect();
        let mut fields = BTreeMap::new();
        fields.insert(INPUT_IDS.to_string(), ids);
        fields.insert(ATTENTION_MASK.to_string(), mask);
        EncodedBatch::new(fields).unwrap()
    }

    #[test]
    fn test_size_matches_labels() {
        let ds = QuestionDataset::new(batch(&[&[5, 6, 0], &[7, 8, 9]]), vec![0, 1]).unwrap();
        assert_eq!(ds.size(), 2);
        assert_eq!(Dataset::len(&ds), 2);
    }

    #[test]
    fn test_at_combines_fields_and_label() {
        let ds   = QuestionDataset::new(batch(&[&[5, 6, 0], &[7, 8, 9]]), vec![0, 1]).unwrap();
        let item = ds.at(0).unwrap();
        assert_eq!(item.feature(INPUT_IDS), Some(&[5, 6, 0][..]));
        assert_eq!(item.feature(ATTENTION_MASK), Some(&[1, 1, 0][..]));
        assert_eq!(item.label, 0);
        assert_eq!(ds.at(1).unwrap().label, 1);
    }

    #[test]
    fn test_at_is_deterministic() {
        let ds = QuestionDataset::new(batch(&[&[5, 6, 0], &[7, 8, 9], &[4, 0, 0]]), vec![0, 1, 0]).unwrap();
        for i in 0..ds.size() {
            assert_eq!(ds.at(i).unwrap(), ds.at(i).unwrap());
        }
    }

    #[test]
    fn test_out_of_range() {
        let ds = QuestionDataset::new(batch(&[&[5, 6]]), vec![1]).unwrap();
        assert_eq!(ds.at(1), Err(DatasetError::IndexOutOfRange { index: 1, size: 1 }));
        assert!(ds.get(1).is_none());
    }

    #[test]
    fn test_rejects_length_mismatch() {
        let err = QuestionDataset::new(batch(&[&[5, 6], &[7, 8]]), vec![0, 1, 0]).err().unwrap();
        assert_eq!(err, DatasetError::LengthMismatch { labels: 3, rows: 2 });
        assert!(err.to_string().contains("does not match"));
    }
}
