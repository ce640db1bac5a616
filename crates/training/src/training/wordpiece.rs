//! WordPiece trainer implementation.
//!
//! WordPiece grows the vocabulary by likelihood rather than raw frequency:
//! a pair is scored `ln(pair_count / (left_count * right_count))`, which
//! favours pairs whose parts rarely occur apart.
//!
//! Word splits are re-derived from the current vocabulary on every
//! iteration with the greedy longest-match splitter, so the splits seen
//! during training are exactly the ones encoding will produce.

use super::counter::{count_pairs, OrderedCounter, WordCounts};
use compact_str::CompactString;
use log::{debug, info};
use subtok_core::{split_longest_match, Pair, Result, TokenFreqs, VocabTrie, Vocabulary};

/// Configuration for WordPiece training.
#[derive(Debug, Clone)]
pub struct WordPieceTrainerConfig {
    /// Target vocabulary size, special tokens included
    pub vocab_size: usize,
    /// Minimum frequency for a unit to be seeded or a pair to be merged
    pub min_frequency: u64,
    /// Marker prepended to every non-initial unit of a word
    pub word_prefix: String,
}

impl Default for WordPieceTrainerConfig {
    fn default() -> Self {
        Self {
            vocab_size: 1000,
            min_frequency: 2,
            word_prefix: "##".to_string(),
        }
    }
}

/// Output of a WordPiece training run.
#[derive(Debug, Clone)]
pub struct WordPieceModel {
    /// Vocabulary grown from the seed, with frequencies
    pub vocab: Vocabulary,
    /// Aggregate counts used as score denominators
    pub subword_counts: TokenFreqs,
}

/// Score of a candidate pair; higher is better.
///
/// Undefined scores (a unit never counted) are negative infinity so such a
/// pair is never selected.
pub fn pair_score(pair_count: u64, left_count: u64, right_count: u64) -> f64 {
    if left_count == 0 || right_count == 0 {
        return f64::NEG_INFINITY;
    }
    (pair_count as f64 / (left_count as f64 * right_count as f64)).ln()
}

/// Concatenate two units, dropping the continuation prefix of the right one.
pub fn merge_units(left: &str, right: &str, word_prefix: &str) -> CompactString {
    let right = right.strip_prefix(word_prefix).unwrap_or(right);
    let mut merged = CompactString::with_capacity(left.len() + right.len());
    merged.push_str(left);
    merged.push_str(right);
    merged
}

/// Character-level units of every word: the first character bare, the rest
/// prefixed, weighted by word count.
pub fn initial_subwords(words: &WordCounts, word_prefix: &str) -> OrderedCounter<CompactString> {
    let mut counts = OrderedCounter::new();

    for (word, count) in words.iter() {
        for (i, ch) in word.chars().enumerate() {
            let mut unit = CompactString::default();
            if i > 0 {
                unit.push_str(word_prefix);
            }
            unit.push(ch);
            counts.add(unit, count);
        }
    }

    counts
}

/// WordPiece trainer.
///
/// Equal scores are resolved in favour of the pair encountered first when
/// scanning words in corpus order.
pub struct WordPieceTrainer {
    config: WordPieceTrainerConfig,
}

impl WordPieceTrainer {
    pub fn new(config: WordPieceTrainerConfig) -> Self {
        Self { config }
    }

    /// Train on a word frequency table, growing `vocab`.
    ///
    /// `vocab` is expected to hold only the special tokens.
    pub fn train(&self, words: &WordCounts, mut vocab: Vocabulary) -> Result<WordPieceModel> {
        let prefix = self.config.word_prefix.as_str();
        let unk = vocab.unk_token().to_string();
        let mut subword_counts = TokenFreqs::new();

        for (unit, count) in initial_subwords(words, prefix).iter() {
            if count >= self.config.min_frequency {
                vocab.add_token(unit);
                vocab.add_frequency(unit, count);
                subword_counts.insert(unit.clone(), count);
            }
        }

        let mut trie = VocabTrie::from_tokens(vocab.tokens_by_id().map(|(_, token)| token));
        let seed_size = vocab.len();

        info!(
            "Training WordPiece on {} distinct words: seed vocabulary {} tokens, target {}",
            words.len(),
            seed_size,
            self.config.vocab_size
        );

        let num_merges = self.config.vocab_size.saturating_sub(seed_size);
        for step in 0..num_merges {
            let pair_counts = count_pairs(
                words
                    .iter()
                    .map(|(word, count)| (split_longest_match(word, &trie, prefix, &unk), count)),
            );

            if pair_counts.is_empty() {
                info!("No more pairs found. Stopping at {} tokens.", vocab.len());
                break;
            }

            let Some((pair, count, score)) = self.best_pair(&pair_counts, &subword_counts) else {
                info!("No valid pairs found. Stopping at {} tokens.", vocab.len());
                break;
            };

            let merged = merge_units(&pair.0, &pair.1, prefix);
            vocab.add_token(&merged);
            vocab.add_frequency(&merged, count);
            *subword_counts.entry(merged.clone()).or_insert(0) += count;
            trie.insert(&merged);

            if (step + 1) % 100 == 0 {
                debug!(
                    "Completed {} merges. Vocab size: {}. Best pair: {:?} -> {:?} (score: {:.4})",
                    step + 1,
                    vocab.len(),
                    pair,
                    merged,
                    score
                );
            }
        }

        info!(
            "WordPiece training complete: final vocabulary size {} (requested {})",
            vocab.len(),
            self.config.vocab_size
        );

        Ok(WordPieceModel {
            vocab,
            subword_counts,
        })
    }

    /// Highest scoring pair meeting `min_frequency`; first encountered wins ties.
    fn best_pair(
        &self,
        pair_counts: &OrderedCounter<Pair>,
        subword_counts: &TokenFreqs,
    ) -> Option<(Pair, u64, f64)> {
        let mut best: Option<(&Pair, u64, f64)> = None;

        for (pair, count) in pair_counts.iter() {
            if count < self.config.min_frequency {
                continue;
            }

            let left = subword_counts.get(&pair.0).copied().unwrap_or(0);
            let right = subword_counts.get(&pair.1).copied().unwrap_or(0);
            let score = pair_score(count, left, right);

            let better = match best {
                Some((_, _, best_score)) => score > best_score,
                None => score > f64::NEG_INFINITY,
            };
            if better {
                best = Some((pair, count, score));
            }
        }

        best.map(|(pair, count, score)| (pair.clone(), count, score))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::counter::word_frequencies;
    use subtok_core::{SpecialTokensConfig, NUM_SPECIAL_TOKENS};

    fn special_vocab() -> Vocabulary {
        Vocabulary::new(&SpecialTokensConfig::default().with_unk("[UNK]")).unwrap()
    }

    fn train(corpus: &[&str], vocab_size: usize, min_frequency: u64) -> WordPieceModel {
        let trainer = WordPieceTrainer::new(WordPieceTrainerConfig {
            vocab_size,
            min_frequency,
            ..Default::default()
        });
        trainer
            .train(&word_frequencies(corpus.iter().copied()), special_vocab())
            .unwrap()
    }

    #[test]
    fn test_pair_score() {
        assert_eq!(pair_score(4, 2, 2), 0.0);
        assert!(pair_score(1, 2, 2) < pair_score(2, 2, 2));
        assert_eq!(pair_score(3, 0, 5), f64::NEG_INFINITY);
    }

    #[test]
    fn test_merge_units_strips_prefix() {
        assert_eq!(merge_units("un", "##able", "##"), "unable");
        assert_eq!(merge_units("##ab", "##le", "##"), "##able");
        assert_eq!(merge_units("un", "able", "##"), "unable");
    }

    #[test]
    fn test_initial_subwords() {
        let words = word_frequencies(["hug hug pug"]);
        let counts = initial_subwords(&words, "##");

        assert_eq!(counts.get(&"h".into()), 2);
        assert_eq!(counts.get(&"p".into()), 1);
        assert_eq!(counts.get(&"##u".into()), 3);
        assert_eq!(counts.get(&"##g".into()), 3);
        assert_eq!(counts.get(&"u".into()), 0);
    }

    #[test]
    fn test_seed_respects_min_frequency() {
        let model = train(&["hug hug pug"], NUM_SPECIAL_TOKENS, 2);

        assert!(model.vocab.contains("h"));
        assert!(model.vocab.contains("##u"));
        assert!(!model.vocab.contains("p"));
        assert_eq!(model.subword_counts.get("##g"), Some(&3));
    }

    #[test]
    fn test_merges_by_likelihood() {
        // (h, ##u), (##u, ##g) and (p, ##u) all score ln(1/3); the pair
        // seen first in corpus order wins.
        let model = train(&["hug hug pug"], NUM_SPECIAL_TOKENS + 5, 1);

        let learned: Vec<&str> = model
            .vocab
            .tokens_by_id()
            .skip(NUM_SPECIAL_TOKENS + 4)
            .map(|(_, t)| t)
            .collect();
        assert_eq!(learned.first(), Some(&"hu"));
        assert_eq!(model.vocab.frequency("hu"), 2);
    }

    #[test]
    fn test_training_is_deterministic() {
        let corpus = ["unhappy unable undo", "happiness happy able"];
        let first = train(&corpus, 40, 1);
        let second = train(&corpus, 40, 1);

        let first_tokens: Vec<_> = first.vocab.tokens_by_id().collect();
        let second_tokens: Vec<_> = second.vocab.tokens_by_id().collect();
        assert_eq!(first_tokens, second_tokens);
    }

    #[test]
    fn test_stops_when_no_pair_meets_min_frequency() {
        let model = train(&["ab ab", "cd"], 100, 2);

        // a, ##b seeded (count 2); c, ##d dropped. (a, ##b) occurs twice.
        assert!(model.vocab.contains("ab"));
        assert_eq!(model.vocab.len(), NUM_SPECIAL_TOKENS + 3);
    }
}
