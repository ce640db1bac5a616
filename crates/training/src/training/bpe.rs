//! BPE trainer implementation.
//!
//! Words start as their characters followed by a word-end marker. Each step
//! merges the most frequent adjacent pair everywhere it occurs and records
//! the merge, so encoding can replay the exact same rewrites later.
//!
//! Pair counts are maintained incrementally: a merge only touches the words
//! that contain the pair, and the priority queue is updated with the net
//! change for every affected pair.

use super::counter::{PairCounter, WordCounts};
use ahash::AHashMap;
use compact_str::CompactString;
use log::{debug, info};
use subtok_core::core::merges::concat;
use subtok_core::{MergeCandidate, MergeRules, Pair, PairPriorityQueue, Result, Vocabulary};

/// Configuration for BPE training.
#[derive(Debug, Clone)]
pub struct BpeTrainerConfig {
    /// Target vocabulary size, special tokens included
    pub vocab_size: usize,
    /// Minimum frequency for a unit to be seeded or a pair to be merged
    pub min_frequency: u64,
    /// Marker appended to every word
    pub word_end_token: String,
}

impl Default for BpeTrainerConfig {
    fn default() -> Self {
        Self {
            vocab_size: 1000,
            min_frequency: 2,
            word_end_token: "</w>".to_string(),
        }
    }
}

/// Output of a BPE training run.
#[derive(Debug, Clone)]
pub struct BpeModel {
    /// Vocabulary grown from the seed, with frequencies
    pub vocab: Vocabulary,
    /// Merge rules in learned order
    pub merges: MergeRules,
}

/// Initial split of a word: its characters followed by the word-end marker.
pub fn word_units(word: &str, word_end_token: &str) -> Vec<CompactString> {
    let mut units: Vec<CompactString> = word
        .chars()
        .map(|ch| {
            let mut unit = CompactString::default();
            unit.push(ch);
            unit
        })
        .collect();
    units.push(CompactString::new(word_end_token));
    units
}

/// BPE trainer.
///
/// Equal pair frequencies are resolved in favour of the lexicographically
/// smallest `(left, right)` pair.
pub struct BpeTrainer {
    config: BpeTrainerConfig,
}

impl BpeTrainer {
    /// Create a new BPE trainer with the given configuration.
    pub fn new(config: BpeTrainerConfig) -> Self {
        Self { config }
    }

    /// Train on a word frequency table, growing `vocab`.
    ///
    /// `vocab` is expected to hold only the special tokens. Training stops
    /// early, without error, when no pair is left or the best pair falls
    /// below `min_frequency`.
    pub fn train(&self, words: &WordCounts, mut vocab: Vocabulary) -> Result<BpeModel> {
        let mut counter = PairCounter::new();
        for (word, count) in words.iter() {
            counter.add_split(word_units(word, &self.config.word_end_token), count);
        }

        self.seed_vocab(&counter, &mut vocab);
        let seed_size = vocab.len();

        info!(
            "Training BPE on {} distinct words: seed vocabulary {} tokens, target {}",
            words.len(),
            seed_size,
            self.config.vocab_size
        );

        let mut pair_counts: AHashMap<Pair, u64> = counter
            .count_pairs()
            .iter()
            .map(|(pair, count)| (pair.clone(), count))
            .collect();
        let mut queue = build_queue(&pair_counts);
        let mut merges = MergeRules::new();

        let num_merges = self.config.vocab_size.saturating_sub(seed_size);
        for step in 0..num_merges {
            let Some(best) = queue.pop() else {
                info!("No more pairs found. Stopping at {} tokens.", vocab.len());
                break;
            };

            if best.count < self.config.min_frequency {
                info!(
                    "Best pair {:?} occurs {} times, below min_frequency {}. Stopping at {} tokens.",
                    best.pair,
                    best.count,
                    self.config.min_frequency,
                    vocab.len()
                );
                break;
            }

            let merged = concat(&best.pair.0, &best.pair.1);
            vocab.add_token(&merged);
            vocab.add_frequency(&merged, best.count);
            merges.add_merge(best.pair.clone(), merged.clone());

            let changes = counter.merge_pair_in_words(&best.pair, &merged);
            update_pair_counts(&mut pair_counts, &mut queue, changes);

            if (step + 1) % 100 == 0 {
                debug!(
                    "Completed {} merges. Vocab size: {}. Last pair: {:?} -> {:?} ({} occurrences)",
                    step + 1,
                    vocab.len(),
                    best.pair,
                    merged,
                    best.count
                );
            }
        }

        info!(
            "BPE training complete: {} merges, final vocabulary size {} (requested {})",
            merges.len(),
            vocab.len(),
            self.config.vocab_size
        );

        Ok(BpeModel { vocab, merges })
    }

    /// Add every unit meeting `min_frequency`, in first-occurrence order.
    fn seed_vocab(&self, counter: &PairCounter, vocab: &mut Vocabulary) {
        for (unit, count) in counter.unit_counts().iter() {
            if count >= self.config.min_frequency {
                vocab.add_token(unit);
                vocab.add_frequency(unit, count);
            }
        }
    }
}

/// Build priority queue from pair counts.
fn build_queue(pair_counts: &AHashMap<Pair, u64>) -> PairPriorityQueue {
    let mut queue = PairPriorityQueue::with_capacity(pair_counts.len());

    for (pair, &count) in pair_counts {
        queue.push(MergeCandidate::new(pair.clone(), count));
    }

    queue
}

/// Apply net pair count changes after a merge.
fn update_pair_counts(
    pair_counts: &mut AHashMap<Pair, u64>,
    queue: &mut PairPriorityQueue,
    changes: AHashMap<Pair, i64>,
) {
    for (pair, delta) in changes {
        let current = pair_counts.get(&pair).copied().unwrap_or(0);
        let new_count = (current as i64 + delta).max(0) as u64;

        if new_count > 0 {
            pair_counts.insert(pair.clone(), new_count);
        } else {
            pair_counts.remove(&pair);
        }
        queue.update(pair, new_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::counter::word_frequencies;
    use subtok_core::{pair, SpecialTokensConfig, NUM_SPECIAL_TOKENS};

    fn special_vocab() -> Vocabulary {
        Vocabulary::new(&SpecialTokensConfig::default()).unwrap()
    }

    fn train(corpus: &[&str], vocab_size: usize, min_frequency: u64) -> BpeModel {
        let trainer = BpeTrainer::new(BpeTrainerConfig {
            vocab_size,
            min_frequency,
            ..Default::default()
        });
        trainer
            .train(&word_frequencies(corpus.iter().copied()), special_vocab())
            .unwrap()
    }

    #[test]
    fn test_word_units() {
        assert_eq!(word_units("low", "</w>"), vec!["l", "o", "w", "</w>"]);
        assert_eq!(word_units("", "</w>"), vec!["</w>"]);
    }

    #[test]
    fn test_seed_in_first_occurrence_order() {
        let model = train(&["low lower"], 4, 1);

        let seed: Vec<&str> = model.vocab.tokens_by_id().map(|(_, t)| t).collect();
        assert_eq!(
            seed,
            vec!["<PAD>", "<UNK>", "<BOS>", "<EOS>", "l", "o", "w", "</w>", "e", "r"]
        );
        assert!(model.merges.is_empty());
    }

    #[test]
    fn test_first_merge_is_most_frequent_pair() {
        let corpus = ["low lower lowest"; 5];
        let model = train(&corpus, 20, 1);

        // (l, o) and (o, w) both occur 15 times; the smaller pair wins.
        assert_eq!(model.merges.order()[0], pair("l", "o"));
        assert_eq!(model.merges.order()[1], pair("lo", "w"));
        assert_eq!(model.vocab.frequency("lo"), 15);
        assert!(model.vocab.len() <= 20);
    }

    #[test]
    fn test_training_is_deterministic() {
        let corpus = ["the cat sat on the mat", "a bat and a hat", "that cat"];
        let first = train(&corpus, 40, 1);
        let second = train(&corpus, 40, 1);

        assert_eq!(first.merges.order(), second.merges.order());
        let first_tokens: Vec<_> = first.vocab.tokens_by_id().collect();
        let second_tokens: Vec<_> = second.vocab.tokens_by_id().collect();
        assert_eq!(first_tokens, second_tokens);
    }

    #[test]
    fn test_min_frequency_stops_early() {
        // Every pair occurs once; nothing reaches min_frequency 2.
        let model = train(&["abc", "def"], 100, 2);

        assert!(model.merges.is_empty());
        assert_eq!(model.vocab.len(), NUM_SPECIAL_TOKENS + 1);
        assert!(model.vocab.contains("</w>"));
    }

    #[test]
    fn test_runs_out_of_pairs() {
        let model = train(&["ab"], 100, 1);

        // a+b, then ab+</w>; afterwards the single unit has no pairs.
        assert_eq!(model.merges.len(), 2);
        assert!(model.vocab.contains("ab</w>"));
        assert!(model.vocab.len() < 100);
    }

    #[test]
    fn test_vocab_stays_bijective() {
        let model = train(&["abab abab ab", "baba"], 30, 1);

        for (id, token) in model.vocab.tokens_by_id() {
            assert_eq!(model.vocab.get_id(token), Some(id));
        }
        assert_eq!(model.vocab.vocab.len(), model.vocab.vocab_r.len());
    }
}
