// ============================================================
// Layer 6 — Data Indexer
// ============================================================
// Word-level vocabulary backed by a HuggingFace `tokenizers`
// WordLevel model.
//
// The vocabulary is fitted on the words of a dataset and the
// tokenizer JSON is built directly, then loaded back as a proper
// Tokenizer:
//
//   [PAD] → 0   (the padding sentinel)
//   [UNK] → 1   (every out-of-vocabulary word)
//   words → 2.. (most frequent first, ties alphabetical)
//
// The same tokenizer.json is saved next to the prepared data so
// later runs index text identically.
//
// Reference: tokenizers crate documentation

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tokenizers::{
    NormalizedString, Normalizer, OffsetReferential, OffsetType, PreTokenizedString, PreTokenizer,
    Tokenizer,
};

use crate::data::dataset::Dataset;
use crate::domain::error::{DataError, Result};
use crate::domain::traits::{Indexer, Instance};

pub const PAD_TOKEN: &str = "[PAD]";
pub const OOV_TOKEN: &str = "[UNK]";
pub const PAD_ID: u32 = 0;
pub const OOV_ID: u32 = 1;

const TOKENIZER_FILE: &str = "tokenizer.json";

fn indexer_error(e: impl std::fmt::Display) -> DataError {
    DataError::Indexer(e.to_string())
}

/// Tokenizer JSON in HuggingFace format around a WordLevel `vocab`.
fn build_tokenizer(vocab: serde_json::Value) -> Result<Tokenizer> {
    let tokenizer_json = serde_json::json!({
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": [
            {"id": PAD_ID, "content": PAD_TOKEN, "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
            {"id": OOV_ID, "content": OOV_TOKEN, "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true}
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
            "unk_token": OOV_TOKEN
        }
    });
    Tokenizer::from_str(&tokenizer_json.to_string()).map_err(indexer_error)
}

fn special_vocab() -> serde_json::Value {
    serde_json::json!({
        PAD_TOKEN: PAD_ID,
        OOV_TOKEN: OOV_ID,
    })
}

pub struct DataIndexer {
    tokenizer: Tokenizer,
}

impl DataIndexer {
    /// An indexer that knows only [PAD] and [UNK]. Its normalizer and
    /// pre-tokenizer are the ones every fitted indexer uses.
    pub fn untrained() -> Result<Self> {
        Ok(Self { tokenizer: build_tokenizer(special_vocab())? })
    }

    /// Fit a vocabulary of at most `vocab_size` ids (padding and
    /// out-of-vocabulary included) on the words of `dataset`.
    ///
    /// Texts are split by the same normalizer and pre-tokenizer that
    /// `index_text` encodes with, and symbols go through the same
    /// normalizer as `index_symbol`, so every word of the dataset
    /// that makes the cut is in the vocabulary.
    pub fn fit<T: Instance>(dataset: &Dataset<T>, vocab_size: usize) -> Result<Self> {
        let splitter = Self::untrained()?;
        let mut words = Vec::new();
        for instance in dataset.instances() {
            for text in instance.texts() {
                words.extend(splitter.pre_tokenize(text)?);
            }
            for symbol in instance.symbols()? {
                words.push(splitter.normalize(&symbol)?);
            }
        }
        Self::from_words(words, vocab_size)
    }

    /// `words` must already be normalised and pre-tokenised.
    fn from_words(words: impl IntoIterator<Item = String>, vocab_size: usize) -> Result<Self> {
        // ── Step 1: Count word frequencies ────────────────────────────────────
        let mut freq: HashMap<String, usize> = HashMap::new();
        for word in words {
            if !word.is_empty() {
                *freq.entry(word).or_insert(0) += 1;
            }
        }

        let mut words: Vec<(String, usize)> = freq.into_iter().collect();
        words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        words.truncate(vocab_size.saturating_sub(2));

        // ── Step 2: Build vocab JSON ──────────────────────────────────────────
        let mut vocab = special_vocab();
        let mut next_id = OOV_ID + 1;
        for (word, _) in &words {
            if vocab.get(word).is_none() {
                vocab[word] = serde_json::json!(next_id);
                next_id += 1;
            }
        }

        // ── Step 3: Load it back as a Tokenizer ───────────────────────────────
        let tokenizer = build_tokenizer(vocab)?;
        tracing::info!("Indexer fitted with {} ids", next_id);
        Ok(Self { tokenizer })
    }

    /// Normalise `text` the way encoding does, without splitting it.
    pub fn normalize(&self, text: &str) -> Result<String> {
        let mut normalized = NormalizedString::from(text);
        if let Some(normalizer) = self.tokenizer.get_normalizer() {
            normalizer.normalize(&mut normalized).map_err(indexer_error)?;
        }
        Ok(normalized.get().to_string())
    }

    /// The words `index_text` would look up for `text`.
    pub fn pre_tokenize(&self, text: &str) -> Result<Vec<String>> {
        let mut pretokenized = PreTokenizedString::from(text);
        if let Some(normalizer) = self.tokenizer.get_normalizer() {
            pretokenized
                .normalize(|s| normalizer.normalize(s))
                .map_err(indexer_error)?;
        }
        if let Some(pre_tokenizer) = self.tokenizer.get_pre_tokenizer() {
            pre_tokenizer.pre_tokenize(&mut pretokenized).map_err(indexer_error)?;
        }
        Ok(pretokenized
            .get_splits(OffsetReferential::Original, OffsetType::Byte)
            .into_iter()
            .map(|(word, _, _)| word.to_string())
            .collect())
    }

    pub fn vocab_size(&self) -> usize {
        self.tokenizer.get_vocab_size(false)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.tokenizer.save(path, true).map_err(indexer_error)?;
        tracing::debug!("Saved indexer to '{}'", path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let tokenizer = Tokenizer::from_file(path).map_err(|e| {
            DataError::Indexer(format!("cannot load tokenizer from '{}': {e}", path.display()))
        })?;
        Ok(Self { tokenizer })
    }
}

impl Indexer for DataIndexer {
    fn index_text(&self, text: &str) -> Result<Vec<u32>> {
        let encoding = self.tokenizer.encode(text, false).map_err(indexer_error)?;
        Ok(encoding.get_ids().to_vec())
    }

    fn index_symbol(&self, symbol: &str) -> Result<u32> {
        Ok(self.tokenizer.token_to_id(&self.normalize(symbol)?).unwrap_or(OOV_ID))
    }
}

// ─── IndexerStore ─────────────────────────────────────────────────────────────
/// Keeps tokenizer.json in an output directory. Loading and saving
/// are separate so a run can fit in memory and save only once its
/// training data has been written.
pub struct IndexerStore {
    dir: PathBuf,
}

impl IndexerStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(TOKENIZER_FILE)
    }

    /// The saved indexer, if this directory has one.
    pub fn load(&self) -> Result<Option<DataIndexer>> {
        let path = self.path();
        if !path.exists() {
            return Ok(None);
        }
        tracing::info!("Loading existing indexer from '{}'", path.display());
        DataIndexer::load(&path).map(Some)
    }

    pub fn save(&self, indexer: &DataIndexer) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        indexer.save(&self.path())
    }
}
