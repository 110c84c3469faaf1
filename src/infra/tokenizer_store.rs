// ============================================================
// Layer 6: Tokenizer Store
// ============================================================
// Builds, saves, and loads the word-level tokenizer.
//
// In tokenizers 0.15, train_from_files requires Trainer::Model
// to equal ModelWrapper. Instead the vocabulary is counted here
// and a HuggingFace tokenizer JSON is written directly.
//
// Id layout (BERT convention):
//   0 [PAD]   1 [UNK]   101 [CLS]   102 [SEP]   103 [MASK]
//   104 ..    corpus words, most frequent first
//
// Word ids are capped so the largest id stays below vocab_size.

use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tokenizers::Tokenizer;

const TOKENIZER_FILE: &str = "tokenizer.json";
const FIRST_WORD_ID:  usize = 104;

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

    pub fn exists(&self) -> bool {
        self.path().exists()
    }

    /// Load existing tokenizer or build a new one from texts
    pub fn load_or_build(&self, texts: &[String], vocab_size: usize) -> Result<Tokenizer> {
        if self.exists() {
            tracing::info!("Loading existing tokenizer from '{}'", self.path().display());
            self.load()
        } else {
            tracing::info!("Building new tokenizer (vocab_size={})", vocab_size);
            self.build_and_save(texts, vocab_size)
        }
    }

    pub fn load(&self) -> Result<Tokenizer> {
        let path = self.path();
        Tokenizer::from_file(&path)
            .map_err(|e| anyhow::anyhow!("Cannot load tokenizer from '{}': {}", path.display(), e))
    }

    fn build_and_save(&self, texts: &[String], vocab_size: usize) -> Result<Tokenizer> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create '{}'", self.dir.display()))?;

        let (tokenizer_json, words) = tokenizer_json(texts, vocab_size);
        let tok_path = self.path();
        fs::write(&tok_path, serde_json::to_string_pretty(&tokenizer_json)?)
            .with_context(|| format!("Cannot write tokenizer JSON '{}'", tok_path.display()))?;

        tracing::info!("Tokenizer built with {} words, saved to '{}'", words, tok_path.display());
        load_from(&tok_path)
    }
}

/// Build a tokenizer in memory, without touching disk.
/// With no texts this is a special-tokens-only tokenizer: every word maps to [UNK].
pub fn build_in_memory(texts: &[String], vocab_size: usize) -> Result<Tokenizer> {
    let (tokenizer_json, _) = tokenizer_json(texts, vocab_size);
    Tokenizer::from_str(&tokenizer_json.to_string())
        .map_err(|e| anyhow::anyhow!("Cannot build in-memory tokenizer: {e}"))
}

fn load_from(path: &Path) -> Result<Tokenizer> {
    Tokenizer::from_file(path).map_err(|e| anyhow::anyhow!("Cannot reload tokenizer: {e}"))
}

/// Most frequent corpus words first; ties broken alphabetically so the
/// vocabulary is stable across runs.
fn top_words(texts: &[String], max_words: usize) -> Vec<String> {
    let mut freq: HashMap<String, usize> = HashMap::new();
    for text in texts {
        for word in text.split_whitespace() {
            let w = word.to_lowercase();
            let w = w.trim_matches(|c: char| !c.is_alphanumeric());
            if !w.is_empty() {
                *freq.entry(w.to_string()).or_insert(0) += 1;
            }
        }
    }

    let mut words: Vec<(String, usize)> = freq.into_iter().collect();
    words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    words.truncate(max_words);
    words.into_iter().map(|(w, _)| w).collect()
}

/// HuggingFace tokenizer JSON plus the number of corpus words it holds.
fn tokenizer_json(texts: &[String], vocab_size: usize) -> (Value, usize) {
    let words = top_words(texts, vocab_size.saturating_sub(FIRST_WORD_ID));

    let mut vocab = json!({
        "[PAD]":  0,
        "[UNK]":  1,
        "[CLS]":  101,
        "[SEP]":  102,
        "[MASK]": 103,
    });

    let mut next_id = FIRST_WORD_ID;
    for word in &words {
        if vocab.get(word).is_none() {
            vocab[word] = json!(next_id);
            next_id += 1;
        }
    }

    let special = |id: usize, content: &str| json!({
        "id": id, "content": content, "single_word": false,
        "lstrip": false, "rstrip": false, "normalized": false, "special": true
    });

    let tokenizer = json!({
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": [
            special(0, "[PAD]"),
            special(1, "[UNK]"),
            special(101, "[CLS]"),
            special(102, "[SEP]"),
            special(103, "[MASK]"),
        ],
        "normalizer": {
            "type": "BertNormalizer",
            "clean_text": true,
            "handle_chinese_chars": true,
            "strip_accents": null,
            "lowercase": true
        },
        "pre_tokenizer": { "type": "Whitespace" },
        "post_processor": null,
        "decoder": null,
        "model": {
            "type": "WordLevel",
            "vocab": vocab,
            "unk_token": "[UNK]"
        }
    });

    (tokenizer, next_id - FIRST_WORD_ID)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<String> {
        vec![
            "the cat sat on the mat".to_string(),
            "The dog sat.".to_string(),
        ]
    }

    #[test]
    fn test_word_ids_stay_below_vocab_size() {
        // Room for two words only: ids 104 and 105
        let tok = build_in_memory(&corpus(), 106).unwrap();
        let enc = tok.encode("the sat cat dog", false).unwrap();
        assert!(enc.get_ids().iter().all(|&id| id < 106));
        // "the" (3) and "sat" (2) are the two most frequent words
        assert_eq!(&enc.get_ids()[..2], &[104, 105]);
        assert_eq!(&enc.get_ids()[2..], &[1, 1]);
    }

    #[test]
    fn test_minimal_tokenizer_maps_words_to_unk() {
        let tok = build_in_memory(&[], 30522).unwrap();
        assert_eq!(tok.token_to_id("[CLS]"), Some(101));
        assert_eq!(tok.token_to_id("[SEP]"), Some(102));
        let enc = tok.encode("anything at all", false).unwrap();
        assert_eq!(enc.get_ids(), &[1, 1, 1]);
    }

    #[test]
    fn test_load_or_build_reuses_saved_file() {
        let dir   = tempfile::tempdir().unwrap();
        let store = TokenizerStore::new(dir.path());
        assert!(!store.exists());

        let built = store.load_or_build(&corpus(), 1000).unwrap();
        assert!(store.exists());

        // A different corpus must not rebuild the saved vocabulary
        let loaded = store.load_or_build(&["zebra".to_string()], 1000).unwrap();
        assert_eq!(loaded.token_to_id("the"), built.token_to_id("the"));
        assert_eq!(loaded.token_to_id("zebra"), None);
    }
}
