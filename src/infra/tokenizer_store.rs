// ============================================================
// Layer 6 — Tokenizer Store
// ============================================================
// Loads, builds, configures and saves HuggingFace tokenizers.
//
// Two ways to get a tokenizer for training:
//   1. A pretrained tokenizer.json (e.g. the multilingual BERT
//      tokenizer) passed with --base-tokenizer
//   2. A word-level vocabulary built from the example corpus,
//      written as tokenizer JSON and parsed back. This avoids the
//      train_from_files ModelWrapper type mismatch in tokenizers.
//
// Either way the tokenizer is saved into the artifact directory
// with its truncation and padding settings, so inference encodes
// text exactly as training did.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};

pub const TOKENIZER_FILE: &str = "tokenizer.json";
pub const PAD_TOKEN:      &str = "[PAD]";
pub const UNK_TOKEN:      &str = "[UNK]";

pub struct TokenizerStore {
    dir: PathBuf,
}

impl TokenizerStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(TOKENIZER_FILE)
    }

    /// Load `base` if given, otherwise build a word-level tokenizer from `texts`.
    pub fn load_or_build(base: Option<&Path>, texts: &[String], vocab_size: usize) -> Result<Tokenizer> {
        match base {
            Some(path) => {
                tracing::info!("Loading base tokenizer from '{}'", path.display());
                load_file(path)
            }
            None => {
                tracing::info!("Building word-level tokenizer (vocab_size={})", vocab_size);
                build_word_level(texts, vocab_size)
            }
        }
    }

    /// Load the tokenizer saved in this directory.
    pub fn load(&self) -> Result<Tokenizer> {
        load_file(&self.path())
    }

    pub fn save(&self, tokenizer: &Tokenizer) -> Result<PathBuf> {
        let path = self.path();
        tokenizer
            .save(&path, true)
            .map_err(|e| anyhow::anyhow!("Cannot save tokenizer to '{}': {e}", path.display()))?;
        tracing::debug!("Saved tokenizer to '{}'", path.display());
        Ok(path)
    }
}

/// Enable truncation to `max_seq_len` and padding to the longest
/// sequence of each batch.
pub fn configure(tokenizer: &mut Tokenizer, max_seq_len: usize) -> Result<()> {
    let pad_id = tokenizer.token_to_id(PAD_TOKEN).unwrap_or(0);

    tokenizer.with_padding(Some(PaddingParams {
        strategy:  PaddingStrategy::BatchLongest,
        pad_id,
        pad_token: PAD_TOKEN.to_string(),
        ..Default::default()
    }));
    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length: max_seq_len,
            ..Default::default()
        }))
        .map_err(|e| anyhow::anyhow!("Invalid truncation settings: {e}"))?;
    Ok(())
}

/// Size of the embedding table needed for this tokenizer's ids.
pub fn id_space(tokenizer: &Tokenizer) -> usize {
    tokenizer
        .get_vocab(true)
        .values()
        .copied()
        .max()
        .map_or(0, |max_id| max_id as usize + 1)
}

fn load_file(path: &Path) -> Result<Tokenizer> {
    Tokenizer::from_file(path)
        .map_err(|e| anyhow::anyhow!("Cannot load tokenizer from '{}': {e}", path.display()))
}

/// Characters that the `Whitespace` pre-tokenizer keeps inside a word:
/// letters, digits, underscore and Arabic diacritics.
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || matches!(c, '\u{064B}'..='\u{065F}' | '\u{0670}')
}

fn build_word_level(texts: &[String], vocab_size: usize) -> Result<Tokenizer> {
    // ── Step 1: Count words the way the pre-tokenizer will split them ─────────
    let mut freq: HashMap<String, usize> = HashMap::new();
    for text in texts {
        for word in text.to_lowercase().split(|c: char| !is_word_char(c)) {
            if !word.is_empty() {
                *freq.entry(word.to_string()).or_insert(0) += 1;
            }
        }
    }

    // Most frequent first, ties broken alphabetically so ids are stable
    let mut words: Vec<(String, usize)> = freq.into_iter().collect();
    words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    words.truncate(vocab_size.saturating_sub(2));

    // ── Step 2: Build vocab JSON ──────────────────────────────────────────────
    let mut vocab = serde_json::Map::new();
    vocab.insert(PAD_TOKEN.to_string(), 0.into());
    vocab.insert(UNK_TOKEN.to_string(), 1.into());
    for (id, (word, _)) in words.iter().enumerate() {
        vocab.insert(word.clone(), (id + 2).into());
    }
    let n_tokens = vocab.len();

    // ── Step 3: Tokenizer JSON in HuggingFace format ──────────────────────────
    let tokenizer_json = serde_json::json!({
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": [
            {"id": 0, "content": PAD_TOKEN, "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
            {"id": 1, "content": UNK_TOKEN, "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true}
        ],
        "normalizer": {
            "type": "BertNormalizer",
            "clean_text": true,
            "handle_chinese_chars": true,
            "strip_accents": false,
            "lowercase": true
        },
        "pre_tokenizer": {
            "type": "Whitespace"
        },
        "post_processor": null,
        "decoder": null,
        "model": {
            "type": "WordLevel",
            "vocab": vocab,
            "unk_token": UNK_TOKEN
        }
    });

    let tokenizer: Tokenizer = tokenizer_json
        .to_string()
        .parse()
        .map_err(|e| anyhow::anyhow!("Cannot build word-level tokenizer: {e}"))
        .context("Tokenizer JSON was rejected")?;

    tracing::info!("Tokenizer built with {} tokens", n_tokens);
    Ok(tokenizer)
}
