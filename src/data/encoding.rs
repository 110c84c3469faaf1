// ============================================================
// Layer 4: Fixed-Length Encoding
// ============================================================
// Tokenises a cleaned text and packs it into a fixed-length
// sequence the classifier can consume:
//
//   [CLS] t1 t2 ... tn [SEP] [PAD] [PAD] ...
//   └──────── max_len tokens in total ─────────┘
//
// Long texts are truncated (the closing [SEP] is always kept),
// short texts are padded. The attention mask marks real tokens
// with 1 and padding with 0.
//
// Ids at or above the model's vocabulary size are mapped to
// [UNK] so an oversized tokenizer can never index past the
// embedding table.

use anyhow::Result;
use tokenizers::Tokenizer;

/// Ids of the special tokens used when packing a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialIds {
    pub pad: u32,
    pub unk: u32,
    pub cls: u32,
    pub sep: u32,
}

impl SpecialIds {
    /// Look the special tokens up in `tokenizer`, falling back to BERT ids.
    pub fn from_tokenizer(tokenizer: &Tokenizer) -> Self {
        let id = |tok: &str, default: u32| tokenizer.token_to_id(tok).unwrap_or(default);
        Self {
            pad: id("[PAD]", 0),
            unk: id("[UNK]", 1),
            cls: id("[CLS]", 101),
            sep: id("[SEP]", 102),
        }
    }
}

impl Default for SpecialIds {
    fn default() -> Self {
        Self { pad: 0, unk: 1, cls: 101, sep: 102 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedText {
    pub input_ids:      Vec<u32>,
    pub attention_mask: Vec<u32>,
}

impl EncodedText {
    /// Number of non-padding tokens
    pub fn real_len(&self) -> usize {
        self.attention_mask.iter().filter(|&&m| m == 1).count()
    }
}

/// Tokenise `text` and pack it to exactly `max_len` positions.
pub fn encode_fixed(
    tokenizer:  &Tokenizer,
    text:       &str,
    max_len:    usize,
    vocab_size: usize,
) -> Result<EncodedText> {
    let enc = tokenizer
        .encode(text, false)
        .map_err(|e| anyhow::anyhow!("Tokenisation error: {e}"))?;
    let special = SpecialIds::from_tokenizer(tokenizer);
    Ok(pack_ids(enc.get_ids(), special, max_len, vocab_size))
}

/// Pack raw token ids into a fixed-length [CLS] … [SEP] sequence.
pub fn pack_ids(ids: &[u32], special: SpecialIds, max_len: usize, vocab_size: usize) -> EncodedText {
    let in_vocab = |id: u32| if (id as usize) < vocab_size { id } else { special.unk };

    let body = max_len.saturating_sub(2);
    let mut input_ids = Vec::with_capacity(max_len);
    input_ids.push(special.cls);
    input_ids.extend(ids.iter().take(body).map(|&id| in_vocab(id)));
    input_ids.push(special.sep);
    input_ids.truncate(max_len);

    let real = input_ids.len();
    let mut attention_mask = vec![1u32; real];

    input_ids.resize(max_len, special.pad);
    attention_mask.resize(max_len, 0);

    EncodedText { input_ids, attention_mask }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    const S: SpecialIds = SpecialIds { pad: 0, unk: 1, cls: 101, sep: 102 };

    #[test]
    fn test_short_sequence_is_padded() {
        let e = pack_ids(&[200, 201], S, 6, 1000);
        assert_eq!(e.input_ids,      vec![101, 200, 201, 102, 0, 0]);
        assert_eq!(e.attention_mask, vec![1, 1, 1, 1, 0, 0]);
        assert_eq!(e.real_len(), 4);
    }

    #[test]
    fn test_long_sequence_is_truncated_keeping_sep() {
        let ids: Vec<u32> = (200..220).collect();
        let e = pack_ids(&ids, S, 5, 1000);
        assert_eq!(e.input_ids, vec![101, 200, 201, 202, 102]);
        assert_eq!(e.attention_mask, vec![1; 5]);
    }

    #[test]
    fn test_empty_text_is_cls_sep() {
        let e = pack_ids(&[], S, 4, 1000);
        assert_eq!(e.input_ids, vec![101, 102, 0, 0]);
    }

    #[test]
    fn test_out_of_vocab_ids_become_unk() {
        let e = pack_ids(&[5, 5000], S, 4, 1000);
        assert_eq!(e.input_ids, vec![101, 5, 1, 102]);
    }

    #[test]
    fn test_tiny_max_len() {
        let e = pack_ids(&[5, 6], S, 1, 1000);
        assert_eq!(e.input_ids, vec![101]);
        assert_eq!(e.attention_mask, vec![1]);
    }
}
