// ============================================================
// Layer 4 — Encoded Batch
// ============================================================
// The tokenizer output for a whole split, keyed by model-input
// field name:
//
//   "input_ids"      → [[101, 2345, ...], [101, 873, ...], ...]
//   "attention_mask" → [[1, 1, ..., 0],   [1, 1, ..., 1],   ...]
//   "token_type_ids" → [[0, 0, ..., 0],   ...]
//
// Every field has one row per text, and every row has the same
// length because the tokenizer pads to the longest sequence in
// the batch. EncodedBatch::new enforces both invariants.

use anyhow::Result;
use std::collections::BTreeMap;
use tokenizers::{Encoding, Tokenizer};

use crate::data::dataset::DatasetError;

pub const INPUT_IDS:      &str = "input_ids";
pub const ATTENTION_MASK: &str = "attention_mask";
pub const TOKEN_TYPE_IDS: &str = "token_type_ids";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBatch {
    fields:  BTreeMap<String, Vec<Vec<i64>>>,
    rows:    usize,
    seq_len: usize,
}

impl EncodedBatch {
    /// Build a batch, checking that all fields agree on row count
    /// and that all rows share one length.
    pub fn new(fields: BTreeMap<String, Vec<Vec<i64>>>) -> Result<Self, DatasetError> {
        let mut shape: Option<(usize, usize)> = None;

        for (name, field_rows) in &fields {
            let rows = field_rows.len();
            let (expected_rows, expected_len) = *shape.get_or_insert_with(|| {
                (rows, field_rows.first().map_or(0, Vec::len))
            });

            if rows != expected_rows {
                return Err(DatasetError::FieldRowCount {
                    field: name.clone(),
                    rows,
                    expected: expected_rows,
                });
            }
            if let Some((row, r)) = field_rows.iter().enumerate().find(|(_, r)| r.len() != expected_len) {
                return Err(DatasetError::RaggedField {
                    field: name.clone(),
                    row,
                    len: r.len(),
                    expected: expected_len,
                });
            }
        }

        let (rows, seq_len) = shape.unwrap_or((0, 0));
        Ok(Self { fields, rows, seq_len })
    }

    /// Number of encoded texts.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Common (padded) sequence length.
    pub fn seq_len(&self) -> usize {
        self.seq_len
    }

    pub fn field(&self, name: &str) -> Option<&[Vec<i64>]> {
        self.fields.get(name).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &[Vec<i64>])> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

/// Tokenise `texts` in one call so the tokenizer's padding settings
/// give every row the same length.
///
/// The tokenizer is expected to have truncation and padding configured
/// (see `TokenizerStore::configure`).
pub fn encode_texts(tokenizer: &Tokenizer, texts: &[String]) -> Result<EncodedBatch> {
    let inputs: Vec<&str> = texts.iter().map(String::as_str).collect();
    let encodings = tokenizer
        .encode_batch(inputs, true)
        .map_err(|e| anyhow::anyhow!("Tokenisation error: {e}"))?;

    let to_rows = |select: fn(&Encoding) -> &[u32]| -> Vec<Vec<i64>> {
        encodings
            .iter()
            .map(|enc| select(enc).iter().map(|&x| i64::from(x)).collect())
            .collect()
    };

    let mut fields = BTreeMap::new();
    fields.insert(INPUT_IDS.to_string(),      to_rows(Encoding::get_ids));
    fields.insert(ATTENTION_MASK.to_string(), to_rows(Encoding::get_attention_mask));
    fields.insert(TOKEN_TYPE_IDS.to_string(), to_rows(Encoding::get_type_ids));

    let batch = EncodedBatch::new(fields)?;
    tracing::debug!("Encoded {} texts to length {}", batch.rows(), batch.seq_len());
    Ok(batch)
}
