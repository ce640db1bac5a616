//! WordPiece tokenizer.
//!
//! Words are split by greedy longest match against the vocabulary, with
//! every non-initial unit carrying the continuation prefix. A word that
//! cannot be split at all becomes a single UNK unit.

use super::{SubwordTokenizer, TokenizerConfig, TokenizerState, WORDPIECE_TOKENIZER_TYPE};
use crate::io::{SerializedTokenizer, TokenizerLoader};
use compact_str::CompactString;
use subtok_core::{
    split_longest_match, Result, SpecialTokensConfig, TokenFreqs, TokenizerError, VocabTrie,
    Vocabulary,
};
use subtok_training::{word_frequencies, WordPieceTrainer, WordPieceTrainerConfig};

/// Default continuation prefix.
pub const DEFAULT_WORD_PREFIX: &str = "##";

/// Default UNK spelling for WordPiece.
pub const DEFAULT_UNK_TOKEN: &str = "[UNK]";

/// Builder for `WordPieceTokenizer`.
#[derive(Debug, Clone)]
pub struct WordPieceTokenizerBuilder {
    config: TokenizerConfig,
    word_prefix: String,
    special_tokens: SpecialTokensConfig,
}

impl Default for WordPieceTokenizerBuilder {
    fn default() -> Self {
        Self {
            config: TokenizerConfig::default(),
            word_prefix: DEFAULT_WORD_PREFIX.to_string(),
            special_tokens: SpecialTokensConfig::default().with_unk(DEFAULT_UNK_TOKEN),
        }
    }
}

impl WordPieceTokenizerBuilder {
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

    pub fn word_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.word_prefix = prefix.into();
        self
    }

    pub fn unk_token(mut self, token: impl Into<String>) -> Self {
        self.special_tokens.unk = token.into();
        self
    }

    /// Build the tokenizer.
    pub fn build(self) -> Result<WordPieceTokenizer> {
        self.config.validate()?;
        if self.word_prefix.is_empty() {
            return Err(TokenizerError::InvalidConfig(
                "word_prefix must not be empty".to_string(),
            ));
        }

        let vocab = Vocabulary::new(&self.special_tokens)?;
        let trie = build_trie(&vocab);
        Ok(WordPieceTokenizer {
            state: TokenizerState::new(self.config, vocab),
            word_prefix: self.word_prefix,
            subword_counts: TokenFreqs::new(),
            trie,
        })
    }
}

fn build_trie(vocab: &Vocabulary) -> VocabTrie {
    VocabTrie::from_tokens(vocab.tokens_by_id().map(|(_, token)| token))
}

/// WordPiece tokenizer.
#[derive(Debug, Clone)]
pub struct WordPieceTokenizer {
    state: TokenizerState,
    word_prefix: String,
    /// Aggregate subword counts from training
    subword_counts: TokenFreqs,
    /// Lookup structure over the vocabulary, rebuilt on train and load
    trie: VocabTrie,
}

impl WordPieceTokenizer {
    pub fn builder() -> WordPieceTokenizerBuilder {
        WordPieceTokenizerBuilder::new()
    }

    /// Create an untrained tokenizer with default markers and special tokens.
    pub fn new(config: TokenizerConfig) -> Result<Self> {
        WordPieceTokenizerBuilder {
            config,
            ..Default::default()
        }
        .build()
    }

    pub fn word_prefix(&self) -> &str {
        &self.word_prefix
    }

    /// Aggregate subword counts learned during training.
    pub fn get_subword_vocab(&self) -> &TokenFreqs {
        &self.subword_counts
    }

    /// Split a single word (lowercased) into its subword units.
    pub fn analyze_word(&self, word: &str) -> Result<Vec<String>> {
        self.ensure_trained("analyzing words")?;

        Ok(self
            .word_to_units(&word.to_lowercase())
            .into_iter()
            .map(|unit| unit.to_string())
            .collect())
    }
}

impl SubwordTokenizer for WordPieceTokenizer {
    const TOKENIZER_TYPE: &'static str = WORDPIECE_TOKENIZER_TYPE;

    fn state(&self) -> &TokenizerState {
        &self.state
    }

    fn train<I, S>(&mut self, corpus: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = word_frequencies(corpus);
        let trainer = WordPieceTrainer::new(WordPieceTrainerConfig {
            vocab_size: self.state.config.vocab_size,
            min_frequency: self.state.config.min_frequency,
            word_prefix: self.word_prefix.clone(),
        });

        let model = trainer.train(&words, self.state.fresh_vocab()?)?;

        self.trie = build_trie(&model.vocab);
        self.subword_counts = model.subword_counts;
        self.state.vocab = model.vocab;
        self.state.word_freqs = words;
        self.state.trained = true;

        Ok(())
    }

    fn word_to_units(&self, word: &str) -> Vec<CompactString> {
        split_longest_match(
            word,
            &self.trie,
            &self.word_prefix,
            self.state.vocab.unk_token(),
        )
    }

    fn units_to_text(&self, units: &[&str]) -> String {
        let mut words = Vec::new();
        let mut current = String::new();

        for unit in units {
            match unit.strip_prefix(self.word_prefix.as_str()) {
                Some(rest) => current.push_str(rest),
                None => {
                    if !current.is_empty() {
                        words.push(std::mem::take(&mut current));
                    }
                    current.push_str(unit);
                }
            }
        }
        if !current.is_empty() {
            words.push(current);
        }

        words.join(" ")
    }

    fn to_snapshot(&self) -> SerializedTokenizer {
        let mut snapshot = self.state.snapshot(Self::TOKENIZER_TYPE);

        snapshot.word_prefix = Some(self.word_prefix.clone());
        snapshot.subword_counts = Some(
            self.subword_counts
                .iter()
                .map(|(unit, &count)| (unit.to_string(), count))
                .collect(),
        );

        snapshot
    }

    fn from_snapshot(snapshot: SerializedTokenizer) -> Result<Self> {
        TokenizerLoader::check_type(&snapshot, Self::TOKENIZER_TYPE)?;

        let word_prefix = TokenizerLoader::required(&snapshot.word_prefix, "word_prefix")?.clone();
        if word_prefix.is_empty() {
            return Err(TokenizerError::Load("word_prefix is empty".to_string()));
        }
        let subword_counts = TokenizerLoader::required(&snapshot.subword_counts, "subword_counts")?
            .iter()
            .map(|(unit, &count)| (CompactString::new(unit), count))
            .collect();

        let state = TokenizerState::from_snapshot(&snapshot)?;
        let trie = build_trie(&state.vocab);

        Ok(Self {
            state,
            word_prefix,
            subword_counts,
            trie,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trained(corpus: &[&str], vocab_size: usize) -> WordPieceTokenizer {
        let mut tokenizer = WordPieceTokenizer::builder()
            .vocab_size(vocab_size)
            .min_frequency(1)
            .build()
            .unwrap();
        tokenizer.train(corpus.iter().copied()).unwrap();
        tokenizer
    }

    #[test]
    fn test_builder_defaults() {
        let tokenizer = WordPieceTokenizer::builder().build().unwrap();

        assert_eq!(tokenizer.word_prefix(), "##");
        assert_eq!(tokenizer.token_to_id("[UNK]"), Some(1));
        assert!(WordPieceTokenizer::builder().word_prefix("").build().is_err());
        assert!(WordPieceTokenizer::builder().unk_token("<PAD>").build().is_err());
    }

    #[test]
    fn test_analyze_word_concatenates_to_word() {
        let tokenizer = trained(&["unhappiness happiness unhappy happy un"], 60);

        let units = tokenizer.analyze_word("Unhappiness").unwrap();
        let joined: String = units
            .iter()
            .map(|unit| unit.strip_prefix("##").unwrap_or(unit))
            .collect();
        assert_eq!(joined, "unhappiness");
        assert!(!units[0].starts_with("##"));
        assert!(units[1..].iter().all(|unit| unit.starts_with("##")));
    }

    #[test]
    fn test_unsplittable_word_is_unk() {
        let tokenizer = trained(&["abc abc"], 20);

        assert_eq!(tokenizer.analyze_word("abz").unwrap(), vec!["[UNK]"]);
        assert_eq!(
            tokenizer.decode(&tokenizer.encode("abc xyz abc").unwrap()).unwrap(),
            "abc [UNK] abc"
        );
    }

    #[test]
    fn test_analyze_requires_training() {
        let tokenizer = WordPieceTokenizer::builder().build().unwrap();

        assert!(matches!(
            tokenizer.analyze_word("hello"),
            Err(TokenizerError::Untrained { .. })
        ));
    }

    #[test]
    fn test_decode_joins_continuations() {
        let tokenizer = trained(&["hug pug hugs"], 8);

        assert_eq!(
            tokenizer.units_to_text(&["hu", "##g", "p", "##ug", "##s"]),
            "hug pugs"
        );
        assert_eq!(tokenizer.units_to_text(&[]), "");
    }

    #[test]
    fn test_roundtrip_on_training_words() {
        let corpus = ["the quick brown fox", "jumps over the lazy dog"];
        let tokenizer = trained(&corpus, 60);

        let ids = tokenizer.encode("The lazy fox.").unwrap();
        assert_eq!(tokenizer.decode(&ids).unwrap(), "the lazy fox [UNK]");
    }

    #[test]
    fn test_snapshot_roundtrip_rebuilds_trie() {
        let tokenizer = trained(&["unhappiness happiness unhappy happy"], 40);
        let restored = WordPieceTokenizer::from_snapshot(tokenizer.to_snapshot()).unwrap();

        assert_eq!(
            restored.analyze_word("unhappy").unwrap(),
            tokenizer.analyze_word("unhappy").unwrap()
        );
        assert_eq!(restored.get_subword_vocab(), tokenizer.get_subword_vocab());
    }

    #[test]
    fn test_snapshot_requires_prefix() {
        let mut snapshot = trained(&["abc"], 10).to_snapshot();
        snapshot.word_prefix = None;

        assert!(matches!(
            WordPieceTokenizer::from_snapshot(snapshot),
            Err(TokenizerError::Load(_))
        ));
    }
}
