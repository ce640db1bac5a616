//! Vocabulary storage and lookup.
//!
//! The vocabulary is a bijection between token strings and contiguous ids
//! starting at 0, plus the per-token frequencies observed during training.
//! The four special tokens always occupy ids 0-3 (PAD, UNK, BOS, EOS).

use crate::error::{Result, TokenizerError};
use ahash::AHashMap;
use compact_str::CompactString;

/// Forward mapping: token string -> ID
pub type Vocab = AHashMap<CompactString, u32>;

/// Reverse mapping: ID -> token string
pub type VocabR = AHashMap<u32, CompactString>;

/// Token -> observed frequency in the training corpus.
pub type TokenFreqs = AHashMap<CompactString, u64>;

/// Number of reserved special tokens at the bottom of every vocabulary.
pub const NUM_SPECIAL_TOKENS: usize = 4;

/// Vocabulary with forward and reverse mappings and token frequencies.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    /// Forward mapping: token string -> ID
    pub vocab: Vocab,
    /// Reverse mapping: ID -> token string
    pub vocab_r: VocabR,
    /// Observed token frequencies
    pub freqs: TokenFreqs,
    /// Special token IDs (cached for fast access)
    pub special: SpecialTokens,
}

impl Vocabulary {
    /// Create a vocabulary holding only the special tokens, at ids 0-3.
    pub fn new(config: &SpecialTokensConfig) -> Result<Self> {
        config.validate()?;

        let mut vocabulary = Self {
            vocab: Vocab::new(),
            vocab_r: VocabR::new(),
            freqs: TokenFreqs::new(),
            special: SpecialTokens::default(),
        };

        vocabulary.special = SpecialTokens {
            pad: vocabulary.add_token(&config.pad),
            unk: vocabulary.add_token(&config.unk),
            bos: vocabulary.add_token(&config.bos),
            eos: vocabulary.add_token(&config.eos),
        };

        Ok(vocabulary)
    }

    /// Rebuild a vocabulary from persisted `(token, id)` entries.
    ///
    /// The entries must form a bijection onto `0..n` and the first four ids
    /// are taken as PAD, UNK, BOS and EOS.
    pub fn from_entries(
        entries: impl IntoIterator<Item = (CompactString, u32)>,
        freqs: TokenFreqs,
    ) -> Result<Self> {
        let mut vocabulary = Self {
            vocab: Vocab::new(),
            vocab_r: VocabR::new(),
            freqs,
            special: SpecialTokens::default(),
        };

        for (token, id) in entries {
            vocabulary.add_token_with_id(&token, id)?;
        }

        vocabulary.validate()?;
        Ok(vocabulary)
    }

    /// Add a token to the vocabulary.
    ///
    /// Returns the ID assigned to the token, or its existing ID.
    pub fn add_token(&mut self, token: &str) -> u32 {
        if let Some(&id) = self.vocab.get(token) {
            return id;
        }

        let id = self.vocab.len() as u32;
        let token = CompactString::new(token);
        self.vocab_r.insert(id, token.clone());
        self.vocab.insert(token, id);

        id
    }

    /// Add a token with a specific ID.
    ///
    /// Returns an error if either the ID or the token is already taken.
    pub fn add_token_with_id(&mut self, token: &str, id: u32) -> Result<()> {
        if let Some(existing) = self.vocab_r.get(&id) {
            return Err(TokenizerError::Load(format!(
                "Token ID {} assigned to both {:?} and {:?}",
                id, existing, token
            )));
        }
        if let Some(existing) = self.vocab.get(token) {
            return Err(TokenizerError::Load(format!(
                "Token {:?} assigned to both ID {} and ID {}",
                token, existing, id
            )));
        }

        let token = CompactString::new(token);
        self.vocab_r.insert(id, token.clone());
        self.vocab.insert(token, id);

        Ok(())
    }

    /// Check the bijection invariant and re-derive special token ids.
    pub fn validate(&mut self) -> Result<()> {
        if self.vocab.len() != self.vocab_r.len() {
            return Err(TokenizerError::Load(format!(
                "vocab has {} entries but id_to_token has {}",
                self.vocab.len(),
                self.vocab_r.len()
            )));
        }
        if self.vocab.len() < NUM_SPECIAL_TOKENS {
            return Err(TokenizerError::Load(format!(
                "vocabulary must hold at least {} special tokens, found {} entries",
                NUM_SPECIAL_TOKENS,
                self.vocab.len()
            )));
        }

        for id in 0..self.vocab.len() as u32 {
            let token = self.vocab_r.get(&id).ok_or_else(|| {
                TokenizerError::Load(format!("token ids are not contiguous: {} is missing", id))
            })?;
            if self.vocab.get(token) != Some(&id) {
                return Err(TokenizerError::Load(format!(
                    "vocab and id_to_token disagree on token {:?}",
                    token
                )));
            }
        }

        self.special = SpecialTokens {
            pad: 0,
            unk: 1,
            bos: 2,
            eos: 3,
        };

        Ok(())
    }

    /// Get the ID for a token string.
    #[inline]
    pub fn get_id(&self, token: &str) -> Option<u32> {
        self.vocab.get(token).copied()
    }

    /// Get the token string for an ID.
    #[inline]
    pub fn get_token(&self, id: u32) -> Option<&str> {
        self.vocab_r.get(&id).map(|s| s.as_str())
    }

    #[inline]
    pub fn contains(&self, token: &str) -> bool {
        self.vocab.contains_key(token)
    }

    /// Get the size of the vocabulary.
    #[inline]
    pub fn len(&self) -> usize {
        self.vocab.len()
    }

    /// Check if the vocabulary is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vocab.is_empty()
    }

    /// The UNK token string.
    pub fn unk_token(&self) -> &str {
        self.get_token(self.special.unk).unwrap_or_default()
    }

    /// The special token spellings of this vocabulary.
    pub fn special_tokens_config(&self) -> SpecialTokensConfig {
        let token = |id: u32| self.get_token(id).unwrap_or_default().to_string();
        SpecialTokensConfig {
            pad: token(self.special.pad),
            unk: token(self.special.unk),
            bos: token(self.special.bos),
            eos: token(self.special.eos),
        }
    }

    /// Record `count` additional observations of `token`.
    pub fn add_frequency(&mut self, token: &str, count: u64) {
        *self.freqs.entry(CompactString::new(token)).or_insert(0) += count;
    }

    /// Observed frequency of a token (0 when never seen).
    pub fn frequency(&self, token: &str) -> u64 {
        self.freqs.get(token).copied().unwrap_or(0)
    }

    /// The `n` most frequent tokens, by frequency then token text.
    pub fn most_frequent(&self, n: usize) -> Vec<(String, u64)> {
        let mut entries: Vec<(&CompactString, &u64)> = self.freqs.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        entries
            .into_iter()
            .take(n)
            .map(|(token, &count)| (token.to_string(), count))
            .collect()
    }

    /// Tokens in id order.
    pub fn tokens_by_id(&self) -> impl Iterator<Item = (u32, &str)> + '_ {
        (0..self.vocab_r.len() as u32).filter_map(move |id| self.get_token(id).map(|t| (id, t)))
    }
}

/// Special token IDs cached for fast access.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpecialTokens {
    /// Padding token ID
    pub pad: u32,
    /// Unknown token ID
    pub unk: u32,
    /// Beginning of sequence token ID
    pub bos: u32,
    /// End of sequence token ID
    pub eos: u32,
}

impl SpecialTokens {
    /// Tokens dropped from decoded output. UNK is kept so unknown input
    /// stays visible.
    #[inline]
    pub fn is_skipped_on_decode(&self, id: u32) -> bool {
        id == self.pad || id == self.bos || id == self.eos
    }
}

/// Configuration for special tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialTokensConfig {
    pub pad: String,
    pub unk: String,
    pub bos: String,
    pub eos: String,
}

impl SpecialTokensConfig {
    /// Same tokens with a different UNK spelling.
    pub fn with_unk(mut self, unk: impl Into<String>) -> Self {
        self.unk = unk.into();
        self
    }

    fn validate(&self) -> Result<()> {
        let tokens = [&self.pad, &self.unk, &self.bos, &self.eos];
        for (i, token) in tokens.iter().enumerate() {
            if token.is_empty() {
                return Err(TokenizerError::InvalidConfig(
                    "special tokens must not be empty".to_string(),
                ));
            }
            if tokens[..i].contains(token) {
                return Err(TokenizerError::InvalidConfig(format!(
                    "special token {:?} is declared twice",
                    token
                )));
            }
        }
        Ok(())
    }
}

impl Default for SpecialTokensConfig {
    fn default() -> Self {
        Self {
            pad: "<PAD>".to_string(),
            unk: "<UNK>".to_string(),
            bos: "<BOS>".to_string(),
            eos: "<EOS>".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> Vocabulary {
        Vocabulary::new(&SpecialTokensConfig::default()).unwrap()
    }

    #[test]
    fn test_special_tokens_at_fixed_ids() {
        let vocab = vocab();

        assert_eq!(vocab.len(), NUM_SPECIAL_TOKENS);
        assert_eq!(vocab.get_id("<PAD>"), Some(0));
        assert_eq!(vocab.get_id("<UNK>"), Some(1));
        assert_eq!(vocab.get_id("<BOS>"), Some(2));
        assert_eq!(vocab.get_id("<EOS>"), Some(3));
        assert_eq!(vocab.unk_token(), "<UNK>");
    }

    #[test]
    fn test_add_token() {
        let mut vocab = vocab();
        let id1 = vocab.add_token("hello");
        let id2 = vocab.add_token("world");

        assert_eq!(id1, 4);
        assert_eq!(id2, 5);
        assert_eq!(vocab.get_token(4), Some("hello"));
        assert_eq!(vocab.get_token(5), Some("world"));
    }

    #[test]
    fn test_add_duplicate_token() {
        let mut vocab = vocab();
        let id1 = vocab.add_token("hello");
        let id2 = vocab.add_token("hello");

        assert_eq!(id1, id2);
        assert_eq!(vocab.len(), 5);
    }

    #[test]
    fn test_duplicate_special_tokens_rejected() {
        let config = SpecialTokensConfig::default().with_unk("<PAD>");
        assert!(matches!(
            Vocabulary::new(&config),
            Err(TokenizerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_from_entries_rejects_gaps() {
        let entries = vec![
            (CompactString::new("<PAD>"), 0),
            (CompactString::new("<UNK>"), 1),
            (CompactString::new("<BOS>"), 2),
            (CompactString::new("<EOS>"), 3),
            (CompactString::new("a"), 5),
        ];

        let result = Vocabulary::from_entries(entries, TokenFreqs::new());
        assert!(matches!(result, Err(TokenizerError::Load(_))));
    }

    #[test]
    fn test_from_entries_rejects_duplicate_ids() {
        let entries = vec![
            (CompactString::new("<PAD>"), 0),
            (CompactString::new("<UNK>"), 0),
        ];

        let result = Vocabulary::from_entries(entries, TokenFreqs::new());
        assert!(matches!(result, Err(TokenizerError::Load(_))));
    }

    #[test]
    fn test_most_frequent_breaks_ties_by_token() {
        let mut vocab = vocab();
        vocab.add_frequency("b", 3);
        vocab.add_frequency("a", 3);
        vocab.add_frequency("c", 7);
        vocab.add_frequency("a", 1);

        assert_eq!(
            vocab.most_frequent(2),
            vec![("c".to_string(), 7), ("a".to_string(), 4)]
        );
        assert_eq!(vocab.frequency("b"), 3);
        assert_eq!(vocab.frequency("zzz"), 0);
    }
}
