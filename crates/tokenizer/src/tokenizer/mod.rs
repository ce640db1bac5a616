//! Main tokenizer implementation.
//!
//! This module provides the `SubwordTokenizer` trait shared by the BPE and
//! WordPiece tokenizers, and the `Tokenizer` sum type that picks the right
//! variant when loading a snapshot of unknown type.

pub mod bpe;
pub mod wordpiece;

pub use bpe::{BpeTokenizer, BpeTokenizerBuilder};
pub use wordpiece::{WordPieceTokenizer, WordPieceTokenizerBuilder};

use crate::io::{ModelFormat, SerializedTokenizer, TokenizerLoader, TokenizerSaver};
use compact_str::CompactString;
use rayon::prelude::*;
use serde::Serialize;
use std::path::Path;
use subtok_core::{preprocess, Result, TokenizerError, Vocabulary, NUM_SPECIAL_TOKENS};
use subtok_training::WordCounts;

/// Discriminator written by `BpeTokenizer`.
pub const BPE_TOKENIZER_TYPE: &str = "BPETokenizer";

/// Discriminator written by `WordPieceTokenizer`.
pub const WORDPIECE_TOKENIZER_TYPE: &str = "WordPieceTokenizer";

/// Number of entries reported in `TokenizerStats::most_frequent_tokens`.
pub const STATS_TOP_N: usize = 10;

/// Configuration shared by both tokenizer variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizerConfig {
    /// Target vocabulary size, special tokens included
    pub vocab_size: usize,
    /// Minimum frequency for seeding units and merging pairs
    pub min_frequency: u64,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            vocab_size: 1000,
            min_frequency: 2,
        }
    }
}

impl TokenizerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.vocab_size < NUM_SPECIAL_TOKENS {
            return Err(TokenizerError::InvalidConfig(format!(
                "vocab_size must be at least {} to hold the special tokens, got {}",
                NUM_SPECIAL_TOKENS, self.vocab_size
            )));
        }
        Ok(())
    }
}

/// State common to every tokenizer variant.
#[derive(Debug, Clone)]
pub struct TokenizerState {
    pub config: TokenizerConfig,
    pub vocab: Vocabulary,
    /// Word frequencies of the last training corpus
    pub word_freqs: WordCounts,
    pub trained: bool,
}

impl TokenizerState {
    fn new(config: TokenizerConfig, vocab: Vocabulary) -> Self {
        Self {
            config,
            vocab,
            word_freqs: WordCounts::new(),
            trained: false,
        }
    }

    /// Fresh vocabulary with the same special tokens, for retraining.
    fn fresh_vocab(&self) -> Result<Vocabulary> {
        Vocabulary::new(&self.vocab.special_tokens_config())
    }

    /// Shared snapshot fields; variant fields are left empty.
    fn snapshot(&self, tokenizer_type: &str) -> SerializedTokenizer {
        SerializedTokenizer {
            vocab_size: self.config.vocab_size,
            min_frequency: self.config.min_frequency,
            vocab: self
                .vocab
                .vocab
                .iter()
                .map(|(token, &id)| (token.to_string(), id))
                .collect(),
            id_to_token: self
                .vocab
                .vocab_r
                .iter()
                .map(|(&id, token)| (id, token.to_string()))
                .collect(),
            token_freqs: self
                .vocab
                .freqs
                .iter()
                .map(|(token, &count)| (token.to_string(), count))
                .collect(),
            trained: self.trained,
            tokenizer_type: tokenizer_type.to_string(),
            word_end_token: None,
            merges: None,
            merge_order: None,
            word_prefix: None,
            subword_counts: None,
            word_freqs: self
                .word_freqs
                .iter()
                .map(|(word, count)| (word.to_string(), count))
                .collect(),
        }
    }

    fn from_snapshot(snapshot: &SerializedTokenizer) -> Result<Self> {
        Ok(Self {
            config: TokenizerConfig {
                vocab_size: snapshot.vocab_size,
                min_frequency: snapshot.min_frequency,
            },
            vocab: TokenizerLoader::vocabulary(snapshot)?,
            word_freqs: TokenizerLoader::word_counts(snapshot),
            trained: snapshot.trained,
        })
    }
}

/// Summary returned by `get_stats`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenizerStats {
    /// Actual vocabulary size
    pub vocab_size: usize,
    /// Requested vocabulary size; larger than `vocab_size` after an early stop
    pub target_vocab_size: usize,
    pub trained: bool,
    /// Top tokens by observed frequency
    pub most_frequent_tokens: Vec<(String, u64)>,
    pub tokenizer_type: String,
}

/// Operations shared by the subword tokenizers.
///
/// Implementors supply training, the word-to-units split, the units-to-text
/// reassembly and snapshot conversion; encoding, decoding, statistics and
/// persistence are provided on top of those.
pub trait SubwordTokenizer: Sized {
    /// Value written to `tokenizer_type` in snapshots.
    const TOKENIZER_TYPE: &'static str;

    fn state(&self) -> &TokenizerState;

    /// Train on corpus lines, replacing any previously learned state.
    fn train<I, S>(&mut self, corpus: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>;

    /// Split one normalized word into subword units.
    fn word_to_units(&self, word: &str) -> Vec<CompactString>;

    /// Reassemble words from decoded units.
    fn units_to_text(&self, units: &[&str]) -> String;

    fn to_snapshot(&self) -> SerializedTokenizer;

    /// Rebuild from a snapshot, failing on a foreign `tokenizer_type`.
    fn from_snapshot(snapshot: SerializedTokenizer) -> Result<Self>;

    fn ensure_trained(&self, operation: &'static str) -> Result<()> {
        if self.state().trained {
            Ok(())
        } else {
            Err(TokenizerError::Untrained { operation })
        }
    }

    fn is_trained(&self) -> bool {
        self.state().trained
    }

    /// Subword units of `text`, in order.
    fn tokenize(&self, text: &str) -> Result<Vec<String>> {
        self.ensure_trained("tokenizing")?;

        Ok(preprocess(text)
            .split_whitespace()
            .flat_map(|word| self.word_to_units(word))
            .map(|unit| unit.to_string())
            .collect())
    }

    /// Encode text into token ids. Units missing from the vocabulary map to UNK.
    fn encode(&self, text: &str) -> Result<Vec<u32>> {
        self.ensure_trained("encoding")?;

        let vocab = &self.state().vocab;
        let unk = vocab.special.unk;

        Ok(preprocess(text)
            .split_whitespace()
            .flat_map(|word| self.word_to_units(word))
            .map(|unit| vocab.get_id(&unit).unwrap_or(unk))
            .collect())
    }

    /// Encode several texts in parallel.
    fn encode_batch<S>(&self, texts: &[S]) -> Result<Vec<Vec<u32>>>
    where
        Self: Sync,
        S: AsRef<str> + Sync,
    {
        self.ensure_trained("encoding")?;

        texts
            .par_iter()
            .map(|text| self.encode(text.as_ref()))
            .collect()
    }

    /// Decode token ids back to text.
    ///
    /// PAD, BOS and EOS are dropped; unknown ids render as the UNK token.
    fn decode(&self, ids: &[u32]) -> Result<String> {
        self.ensure_trained("decoding")?;

        let vocab = &self.state().vocab;
        let unk = vocab.unk_token();
        let units: Vec<&str> = ids
            .iter()
            .filter(|&&id| !vocab.special.is_skipped_on_decode(id))
            .map(|&id| vocab.get_token(id).unwrap_or(unk))
            .collect();

        Ok(self.units_to_text(&units))
    }

    fn get_stats(&self) -> TokenizerStats {
        let state = self.state();
        TokenizerStats {
            vocab_size: state.vocab.len(),
            target_vocab_size: state.config.vocab_size,
            trained: state.trained,
            most_frequent_tokens: state.vocab.most_frequent(STATS_TOP_N),
            tokenizer_type: Self::TOKENIZER_TYPE.to_string(),
        }
    }

    fn get_vocab_size(&self) -> usize {
        self.state().vocab.len()
    }

    fn get_token_frequency(&self, token: &str) -> u64 {
        self.state().vocab.frequency(token)
    }

    fn token_to_id(&self, token: &str) -> Option<u32> {
        self.state().vocab.get_id(token)
    }

    fn id_to_token(&self, id: u32) -> Option<&str> {
        self.state().vocab.get_token(id)
    }

    /// Save to `path`; `.json` is written as JSON, anything else as binary.
    fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        TokenizerSaver::new(&self.to_snapshot()).save(path.as_ref())
    }

    fn save_as(&self, path: impl AsRef<Path>, format: ModelFormat) -> Result<()> {
        TokenizerSaver::new(&self.to_snapshot()).save_as(path.as_ref(), format)
    }

    /// Load a tokenizer of this variant from `path`.
    fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_snapshot(TokenizerLoader::read(path.as_ref())?)
    }

    fn load_as(path: impl AsRef<Path>, format: ModelFormat) -> Result<Self> {
        Self::from_snapshot(TokenizerLoader::read_as(path.as_ref(), format)?)
    }
}

/// A tokenizer of either variant.
#[derive(Debug, Clone)]
pub enum Tokenizer {
    Bpe(BpeTokenizer),
    WordPiece(WordPieceTokenizer),
}

macro_rules! dispatch {
    ($self:expr, $tokenizer:ident => $body:expr) => {
        match $self {
            Tokenizer::Bpe($tokenizer) => $body,
            Tokenizer::WordPiece($tokenizer) => $body,
        }
    };
}

impl Tokenizer {
    /// Load a snapshot of either variant, dispatching on its `tokenizer_type`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_snapshot(TokenizerLoader::read(path.as_ref())?)
    }

    pub fn load_as(path: impl AsRef<Path>, format: ModelFormat) -> Result<Self> {
        Self::from_snapshot(TokenizerLoader::read_as(path.as_ref(), format)?)
    }

    pub fn from_snapshot(snapshot: SerializedTokenizer) -> Result<Self> {
        match snapshot.tokenizer_type.as_str() {
            BPE_TOKENIZER_TYPE => Ok(Self::Bpe(BpeTokenizer::from_snapshot(snapshot)?)),
            WORDPIECE_TOKENIZER_TYPE => {
                Ok(Self::WordPiece(WordPieceTokenizer::from_snapshot(snapshot)?))
            }
            other => Err(TokenizerError::UnknownTokenizerType(other.to_string())),
        }
    }

    pub fn tokenizer_type(&self) -> &'static str {
        match self {
            Self::Bpe(_) => BPE_TOKENIZER_TYPE,
            Self::WordPiece(_) => WORDPIECE_TOKENIZER_TYPE,
        }
    }

    pub fn as_bpe(&self) -> Option<&BpeTokenizer> {
        match self {
            Self::Bpe(tokenizer) => Some(tokenizer),
            Self::WordPiece(_) => None,
        }
    }

    pub fn as_wordpiece(&self) -> Option<&WordPieceTokenizer> {
        match self {
            Self::WordPiece(tokenizer) => Some(tokenizer),
            Self::Bpe(_) => None,
        }
    }

    pub fn train<I, S>(&mut self, corpus: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        dispatch!(self, tokenizer => tokenizer.train(corpus))
    }

    pub fn tokenize(&self, text: &str) -> Result<Vec<String>> {
        dispatch!(self, tokenizer => tokenizer.tokenize(text))
    }

    pub fn encode(&self, text: &str) -> Result<Vec<u32>> {
        dispatch!(self, tokenizer => tokenizer.encode(text))
    }

    pub fn encode_batch<S: AsRef<str> + Sync>(&self, texts: &[S]) -> Result<Vec<Vec<u32>>> {
        dispatch!(self, tokenizer => tokenizer.encode_batch(texts))
    }

    pub fn decode(&self, ids: &[u32]) -> Result<String> {
        dispatch!(self, tokenizer => tokenizer.decode(ids))
    }

    pub fn get_stats(&self) -> TokenizerStats {
        dispatch!(self, tokenizer => tokenizer.get_stats())
    }

    pub fn get_vocab_size(&self) -> usize {
        dispatch!(self, tokenizer => tokenizer.get_vocab_size())
    }

    pub fn is_trained(&self) -> bool {
        dispatch!(self, tokenizer => tokenizer.is_trained())
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        dispatch!(self, tokenizer => tokenizer.save(path))
    }

    pub fn save_as(&self, path: impl AsRef<Path>, format: ModelFormat) -> Result<()> {
        dispatch!(self, tokenizer => tokenizer.save_as(path, format))
    }
}

impl From<BpeTokenizer> for Tokenizer {
    fn from(tokenizer: BpeTokenizer) -> Self {
        Self::Bpe(tokenizer)
    }
}

impl From<WordPieceTokenizer> for Tokenizer {
    fn from(tokenizer: WordPieceTokenizer) -> Self {
        Self::WordPiece(tokenizer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        assert!(TokenizerConfig::default().validate().is_ok());

        let config = TokenizerConfig {
            vocab_size: 3,
            min_frequency: 1,
        };
        assert!(matches!(
            config.validate(),
            Err(TokenizerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_unknown_tokenizer_type() {
        let mut snapshot = BpeTokenizer::builder().build().unwrap().to_snapshot();
        snapshot.tokenizer_type = "UnigramTokenizer".to_string();

        assert!(matches!(
            Tokenizer::from_snapshot(snapshot),
            Err(TokenizerError::UnknownTokenizerType(t)) if t == "UnigramTokenizer"
        ));
    }

    #[test]
    fn test_dispatch_on_type() {
        let snapshot = WordPieceTokenizer::builder().build().unwrap().to_snapshot();
        let tokenizer = Tokenizer::from_snapshot(snapshot).unwrap();

        assert_eq!(tokenizer.tokenizer_type(), WORDPIECE_TOKENIZER_TYPE);
        assert!(tokenizer.as_wordpiece().is_some());
        assert!(!tokenizer.is_trained());
    }

    #[test]
    fn test_untrained_operations_fail() {
        let tokenizer: Tokenizer = BpeTokenizer::builder().build().unwrap().into();

        assert!(matches!(
            tokenizer.encode("hello"),
            Err(TokenizerError::Untrained { .. })
        ));
        assert!(matches!(
            tokenizer.decode(&[4, 5]),
            Err(TokenizerError::Untrained { .. })
        ));
        assert!(tokenizer.encode_batch(&["a", "b"]).is_err());
        assert_eq!(tokenizer.get_vocab_size(), NUM_SPECIAL_TOKENS);
    }
}
