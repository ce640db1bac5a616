//! Byte-Pair-Encoding tokenizer.
//!
//! Every word is split into characters plus a word-end marker, and the
//! learned merges are replayed in order. Decoding closes a word at each unit
//! ending with the marker.

use super::{SubwordTokenizer, TokenizerConfig, TokenizerState, BPE_TOKENIZER_TYPE};
use crate::io::{SerializedTokenizer, TokenizerLoader};
use compact_str::CompactString;
use subtok_core::{
    pair_key, MergeRules, Pair, Result, SpecialTokensConfig, TokenizerError, Vocabulary,
};
use subtok_training::{word_frequencies, word_units, BpeTrainer, BpeTrainerConfig};

/// Default marker appended to every word.
pub const DEFAULT_WORD_END_TOKEN: &str = "</w>";

/// Builder for `BpeTokenizer`.
#[derive(Debug, Clone)]
pub struct BpeTokenizerBuilder {
    config: TokenizerConfig,
    word_end_token: String,
    special_tokens: SpecialTokensConfig,
}

impl Default for BpeTokenizerBuilder {
    fn default() -> Self {
        Self {
            config: TokenizerConfig::default(),
            word_end_token: DEFAULT_WORD_END_TOKEN.to_string(),
            special_tokens: SpecialTokensConfig::default(),
        }
    }
}

impl BpeTokenizerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target vocabulary size.
    pub fn vocab_size(mut self, size: usize) -> Self {
        self.config.vocab_size = size;
        self
    }

    /// Set the minimum frequency for seeding and merges.
    pub fn min_frequency(mut self, freq: u64) -> Self {
        self.config.min_frequency = freq;
        self
    }

    pub fn word_end_token(mut self, token: impl Into<String>) -> Self {
        self.word_end_token = token.into();
        self
    }

    /// Set special tokens.
    pub fn with_special_tokens(mut self, tokens: SpecialTokensConfig) -> Self {
        self.special_tokens = tokens;
        self
    }

    /// Build the tokenizer.
    pub fn build(self) -> Result<BpeTokenizer> {
        self.config.validate()?;
        if self.word_end_token.is_empty() {
            return Err(TokenizerError::InvalidConfig(
                "word_end_token must not be empty".to_string(),
            ));
        }

        let vocab = Vocabulary::new(&self.special_tokens)?;
        Ok(BpeTokenizer {
            state: TokenizerState::new(self.config, vocab),
            word_end_token: self.word_end_token,
            merges: MergeRules::new(),
        })
    }
}

/// BPE tokenizer.
#[derive(Debug, Clone)]
pub struct BpeTokenizer {
    state: TokenizerState,
    word_end_token: String,
    merges: MergeRules,
}

impl BpeTokenizer {
    pub fn builder() -> BpeTokenizerBuilder {
        BpeTokenizerBuilder::new()
    }

    /// Create an untrained tokenizer with default markers and special tokens.
    pub fn new(config: TokenizerConfig) -> Result<Self> {
        BpeTokenizerBuilder {
            config,
            ..Default::default()
        }
        .build()
    }

    pub fn word_end_token(&self) -> &str {
        &self.word_end_token
    }

    /// Learned merge pairs, in the order they are replayed.
    pub fn get_merge_rules(&self) -> &[Pair] {
        self.merges.order()
    }

    pub fn merges(&self) -> &MergeRules {
        &self.merges
    }
}

impl SubwordTokenizer for BpeTokenizer {
    const TOKENIZER_TYPE: &'static str = BPE_TOKENIZER_TYPE;

    fn state(&self) -> &TokenizerState {
        &self.state
    }

    fn train<I, S>(&mut self, corpus: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = word_frequencies(corpus);
        let trainer = BpeTrainer::new(BpeTrainerConfig {
            vocab_size: self.state.config.vocab_size,
            min_frequency: self.state.config.min_frequency,
            word_end_token: self.word_end_token.clone(),
        });

        let model = trainer.train(&words, self.state.fresh_vocab()?)?;

        self.state.vocab = model.vocab;
        self.state.word_freqs = words;
        self.state.trained = true;
        self.merges = model.merges;

        Ok(())
    }

    fn word_to_units(&self, word: &str) -> Vec<CompactString> {
        self.merges.apply_all(word_units(word, &self.word_end_token))
    }

    fn units_to_text(&self, units: &[&str]) -> String {
        let mut words = Vec::new();
        let mut current = String::new();

        for unit in units {
            match unit.strip_suffix(self.word_end_token.as_str()) {
                Some(rest) => {
                    current.push_str(rest);
                    words.push(std::mem::take(&mut current));
                }
                None => current.push_str(unit),
            }
        }
        if !current.is_empty() {
            words.push(current);
        }

        words.join(" ")
    }

    fn to_snapshot(&self) -> SerializedTokenizer {
        let mut snapshot = self.state.snapshot(Self::TOKENIZER_TYPE);

        snapshot.word_end_token = Some(self.word_end_token.clone());
        snapshot.merges = Some(
            self.merges
                .iter()
                .map(|(pair, merged)| (pair_key(pair), merged.to_string()))
                .collect(),
        );
        snapshot.merge_order = Some(
            self.merges
                .order()
                .iter()
                .map(|(left, right)| (left.to_string(), right.to_string()))
                .collect(),
        );

        snapshot
    }

    fn from_snapshot(snapshot: SerializedTokenizer) -> Result<Self> {
        TokenizerLoader::check_type(&snapshot, Self::TOKENIZER_TYPE)?;

        let word_end_token =
            TokenizerLoader::required(&snapshot.word_end_token, "word_end_token")?.clone();
        if word_end_token.is_empty() {
            return Err(TokenizerError::Load("word_end_token is empty".to_string()));
        }

        let state = TokenizerState::from_snapshot(&snapshot)?;
        let merges = TokenizerLoader::merge_rules(&snapshot, &state.vocab)?;

        Ok(Self {
            state,
            word_end_token,
            merges,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use subtok_core::{pair, NUM_SPECIAL_TOKENS};

    fn trained(corpus: &[&str], vocab_size: usize) -> BpeTokenizer {
        let mut tokenizer = BpeTokenizer::builder()
            .vocab_size(vocab_size)
            .min_frequency(1)
            .build()
            .unwrap();
        tokenizer.train(corpus.iter().copied()).unwrap();
        tokenizer
    }

    #[test]
    fn test_builder_validation() {
        assert!(BpeTokenizer::builder().vocab_size(2).build().is_err());
        assert!(BpeTokenizer::builder().word_end_token("").build().is_err());

        let tokenizer = BpeTokenizer::builder().build().unwrap();
        assert_eq!(tokenizer.word_end_token(), "</w>");
        assert_eq!(tokenizer.token_to_id("<PAD>"), Some(0));
        assert_eq!(tokenizer.token_to_id("<EOS>"), Some(3));
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let tokenizer = trained(&["low lower lowest"; 5], 20);

        let ids = tokenizer.encode("lower").unwrap();
        assert_eq!(tokenizer.decode(&ids).unwrap(), "lower");

        let ids = tokenizer.encode("  Low \n LOWEST ").unwrap();
        assert_eq!(tokenizer.decode(&ids).unwrap(), "low lowest");
    }

    #[test]
    fn test_merges_replayed_in_order() {
        let tokenizer = trained(&["low lower lowest"; 5], 20);

        assert_eq!(tokenizer.get_merge_rules()[0], pair("l", "o"));
        let units = tokenizer.word_to_units("low");
        assert_eq!(units.len(), 1);
        assert_eq!(units[0], "low</w>");
    }

    #[test]
    fn test_unknown_characters_map_to_unk() {
        let tokenizer = trained(&["low lower lowest"; 5], 20);

        let ids = tokenizer.encode("lox").unwrap();
        assert!(ids.contains(&tokenizer.state().vocab.special.unk));
        assert!(tokenizer.decode(&ids).unwrap().contains("<UNK>"));
    }

    #[test]
    fn test_decode_skips_pad_bos_eos() {
        let tokenizer = trained(&["low lower lowest"; 5], 20);

        let mut ids = vec![2];
        ids.extend(tokenizer.encode("low").unwrap());
        ids.extend([3, 0, 0]);
        assert_eq!(tokenizer.decode(&ids).unwrap(), "low");

        // Foreign ids render as UNK rather than failing.
        assert_eq!(tokenizer.decode(&[99_999]).unwrap(), "<UNK>");
    }

    #[test]
    fn test_retraining_starts_fresh() {
        let mut tokenizer = trained(&["low lower lowest"; 5], 20);
        tokenizer.train(["abc abc"]).unwrap();

        assert!(!tokenizer.state().vocab.contains("lo"));
        assert_eq!(tokenizer.token_to_id("a"), Some(NUM_SPECIAL_TOKENS as u32));
        assert_eq!(tokenizer.get_merge_rules()[0], pair("a", "b"));
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let tokenizer = trained(&["the cat sat on the mat", "that cat"], 30);
        let restored = BpeTokenizer::from_snapshot(tokenizer.to_snapshot()).unwrap();

        assert_eq!(restored.get_merge_rules(), tokenizer.get_merge_rules());
        assert_eq!(
            restored.encode("the cat sat").unwrap(),
            tokenizer.encode("the cat sat").unwrap()
        );
        assert_eq!(restored.to_snapshot(), tokenizer.to_snapshot());
    }

    #[test]
    fn test_snapshot_type_mismatch() {
        let mut snapshot = trained(&["abc"], 10).to_snapshot();
        snapshot.tokenizer_type = "WordPieceTokenizer".to_string();

        assert!(matches!(
            BpeTokenizer::from_snapshot(snapshot),
            Err(TokenizerError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_stats_report_early_stop() {
        let tokenizer = trained(&["ab"], 100);
        let stats = tokenizer.get_stats();

        assert!(stats.trained);
        assert_eq!(stats.tokenizer_type, "BPETokenizer");
        assert_eq!(stats.target_vocab_size, 100);
        assert!(stats.vocab_size < stats.target_vocab_size);
    }
}
