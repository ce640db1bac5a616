//! Format definitions for tokenizer serialization.
//!
//! Both variants share one record type. Fields that only one variant uses
//! are optional, so a single deserialization step can read any snapshot
//! before dispatching on `tokenizer_type`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// On-disk encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    /// Pretty-printed JSON, human readable
    Json,
    /// Compact bincode encoding
    Binary,
}

impl ModelFormat {
    /// `.json` files are JSON; every other extension is binary.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Binary,
        }
    }
}

/// Complete tokenizer serialization format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedTokenizer {
    /// Requested vocabulary size
    pub vocab_size: usize,
    /// Minimum frequency used during training
    pub min_frequency: u64,
    /// Vocabulary (token -> ID mapping)
    pub vocab: BTreeMap<String, u32>,
    /// Reverse vocabulary (ID -> token mapping)
    pub id_to_token: BTreeMap<u32, String>,
    /// Observed token frequencies
    pub token_freqs: BTreeMap<String, u64>,
    pub trained: bool,
    /// Which tokenizer wrote this snapshot
    pub tokenizer_type: String,

    /// BPE: marker closing every word
    #[serde(default)]
    pub word_end_token: Option<String>,
    /// BPE: `left___right` -> merged unit
    #[serde(default)]
    pub merges: Option<BTreeMap<String, String>>,
    /// BPE: merge pairs in learned order
    #[serde(default)]
    pub merge_order: Option<Vec<(String, String)>>,

    /// WordPiece: continuation prefix marker
    #[serde(default)]
    pub word_prefix: Option<String>,
    /// WordPiece: aggregate subword counts
    #[serde(default)]
    pub subword_counts: Option<BTreeMap<String, u64>>,

    /// Word frequency cache from the training corpus
    #[serde(default)]
    pub word_freqs: BTreeMap<String, u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_path() {
        assert_eq!(ModelFormat::from_path(Path::new("bpe.json")), ModelFormat::Json);
        assert_eq!(ModelFormat::from_path(Path::new("BPE.JSON")), ModelFormat::Json);
        assert_eq!(ModelFormat::from_path(Path::new("bpe.bin")), ModelFormat::Binary);
        assert_eq!(ModelFormat::from_path(Path::new("bpe")), ModelFormat::Binary);
    }

    #[test]
    fn test_legacy_json_without_word_freqs() {
        let json = r###"{
            "vocab_size": 10,
            "min_frequency": 2,
            "vocab": {"<PAD>": 0, "<UNK>": 1, "<BOS>": 2, "<EOS>": 3},
            "id_to_token": {"0": "<PAD>", "1": "<UNK>", "2": "<BOS>", "3": "<EOS>"},
            "token_freqs": {},
            "trained": true,
            "tokenizer_type": "WordPieceTokenizer",
            "word_prefix": "##",
            "subword_counts": {}
        }"###;

        let snapshot: SerializedTokenizer = serde_json::from_str(json).unwrap();
        assert!(snapshot.word_freqs.is_empty());
        assert_eq!(snapshot.id_to_token.get(&3).map(String::as_str), Some("<EOS>"));
        assert_eq!(snapshot.merge_order, None);
    }
}
