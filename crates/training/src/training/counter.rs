//! Frequency counting for subword training.
//!
//! Counts are kept in first-insertion order. Training iterates words in the
//! order they first appear in the corpus, which makes "first encountered"
//! tie-breaks reproducible across runs.

use ahash::AHashMap;
use compact_str::CompactString;
use std::hash::Hash;
use subtok_core::{apply_merge, Normalizer, Pair};

/// Counter that remembers the order in which keys were first seen.
#[derive(Debug, Clone)]
pub struct OrderedCounter<K> {
    entries: Vec<(K, u64)>,
    index: AHashMap<K, usize>,
}

/// Word -> occurrence count, in first-occurrence order.
pub type WordCounts = OrderedCounter<CompactString>;

/// Subword unit -> aggregate count, in first-occurrence order.
pub type UnitCounts = OrderedCounter<CompactString>;

/// Adjacent unit pair -> weighted count, in first-occurrence order.
pub type PairCounts = OrderedCounter<Pair>;

impl<K: Hash + Eq + Clone> OrderedCounter<K> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: AHashMap::new(),
        }
    }

    /// Add `count` to `key`, inserting it at the end if unseen.
    pub fn add(&mut self, key: K, count: u64) {
        match self.index.get(&key) {
            Some(&pos) => self.entries[pos].1 += count,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, count));
            }
        }
    }

    /// Count for `key` (0 when unseen).
    pub fn get(&self, key: &K) -> u64 {
        self.index
            .get(key)
            .map(|&pos| self.entries[pos].1)
            .unwrap_or(0)
    }

    /// Entries in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, u64)> + '_ {
        self.entries.iter().map(|(key, count)| (key, *count))
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Hash + Eq + Clone> Default for OrderedCounter<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq + Clone> FromIterator<(K, u64)> for OrderedCounter<K> {
    fn from_iter<I: IntoIterator<Item = (K, u64)>>(iter: I) -> Self {
        let mut counter = Self::new();
        for (key, count) in iter {
            counter.add(key, count);
        }
        counter
    }
}

impl<K: Hash + Eq + Clone> PartialEq for OrderedCounter<K> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

/// Count normalized words across corpus lines.
pub fn word_frequencies<I, S>(corpus: I) -> WordCounts
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let normalizer = Normalizer::new();
    let mut counts = WordCounts::new();

    for line in corpus {
        for word in normalizer.normalize(line.as_ref()).split_whitespace() {
            counts.add(CompactString::new(word), 1);
        }
    }

    counts
}

/// Count adjacent pairs across word splits, weighting each by its word count.
pub fn count_pairs<I, S>(splits: I) -> PairCounts
where
    I: IntoIterator<Item = (S, u64)>,
    S: AsRef<[CompactString]>,
{
    let mut pair_counts = PairCounts::new();

    for (units, count) in splits {
        for window in units.as_ref().windows(2) {
            pair_counts.add((window[0].clone(), window[1].clone()), count);
        }
    }

    pair_counts
}

/// Word splits with their corpus counts, rewritten in place by merges.
pub struct PairCounter {
    /// Each word's current sequence of units
    words: Vec<Vec<CompactString>>,
    /// Each word's corpus frequency
    word_counts: Vec<u64>,
}

impl PairCounter {
    /// Create a new pair counter.
    pub fn new() -> Self {
        Self {
            words: Vec::new(),
            word_counts: Vec::new(),
        }
    }

    /// Add a word split with its corpus frequency.
    pub fn add_split(&mut self, units: Vec<CompactString>, count: u64) {
        self.words.push(units);
        self.word_counts.push(count);
    }

    /// Aggregate count of every unit over all splits.
    pub fn unit_counts(&self) -> UnitCounts {
        let mut counts = UnitCounts::new();
        for (units, &count) in self.words.iter().zip(&self.word_counts) {
            for unit in units {
                counts.add(unit.clone(), count);
            }
        }
        counts
    }

    /// Count all adjacent pairs across the current splits.
    pub fn count_pairs(&self) -> PairCounts {
        count_pairs(
            self.words
                .iter()
                .zip(self.word_counts.iter().copied())
                .map(|(units, count)| (units.as_slice(), count)),
        )
    }

    /// Get a reference to the word splits.
    pub fn words(&self) -> &[Vec<CompactString>] {
        &self.words
    }

    /// Merge a pair in every word split.
    ///
    /// Returns the net change in weighted count for every pair whose count
    /// moved.
    pub fn merge_pair_in_words(&mut self, pair: &Pair, merged: &str) -> AHashMap<Pair, i64> {
        let mut changes: AHashMap<Pair, i64> = AHashMap::new();

        for (word, &count) in self.words.iter_mut().zip(&self.word_counts) {
            let present = word
                .windows(2)
                .any(|window| window[0] == pair.0 && window[1] == pair.1);
            if !present {
                continue;
            }

            let count = count as i64;
            for window in word.windows(2) {
                *changes
                    .entry((window[0].clone(), window[1].clone()))
                    .or_insert(0) -= count;
            }

            *word = apply_merge(std::mem::take(word), pair, merged);

            for window in word.windows(2) {
                *changes
                    .entry((window[0].clone(), window[1].clone()))
                    .or_insert(0) += count;
            }
        }

        changes.retain(|_, delta| *delta != 0);
        changes
    }
}

impl Default for PairCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use subtok_core::pair;

    fn units(items: &[&str]) -> Vec<CompactString> {
        items.iter().map(|s| CompactString::new(s)).collect()
    }

    #[test]
    fn test_word_frequencies() {
        let counts = word_frequencies(["The cat.", "the  CAT sat"]);

        assert_eq!(counts.get(&"the".into()), 2);
        assert_eq!(counts.get(&"cat".into()), 2);
        assert_eq!(counts.get(&".".into()), 1);
        assert_eq!(counts.get(&"sat".into()), 1);
        assert_eq!(counts.get(&"dog".into()), 0);

        let order: Vec<&str> = counts.iter().map(|(word, _)| word.as_str()).collect();
        assert_eq!(order, vec!["the", "cat", ".", "sat"]);
    }

    #[test]
    fn test_count_pairs_with_frequency() {
        let mut counter = PairCounter::new();
        counter.add_split(units(&["a", "b"]), 3);
        counter.add_split(units(&["b", "c"]), 1);

        let pairs = counter.count_pairs();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs.get(&pair("a", "b")), 3);
        assert_eq!(pairs.get(&pair("b", "c")), 1);
    }

    #[test]
    fn test_count_pairs_order() {
        let pairs = count_pairs([(units(&["c", "d", "e"]), 1), (units(&["a", "b"]), 5)]);

        let order: Vec<Pair> = pairs.iter().map(|(p, _)| p.clone()).collect();
        assert_eq!(order, vec![pair("c", "d"), pair("d", "e"), pair("a", "b")]);
    }

    #[test]
    fn test_unit_counts() {
        let mut counter = PairCounter::new();
        counter.add_split(units(&["l", "o", "w"]), 2);
        counter.add_split(units(&["o", "w", "l"]), 1);

        let counts = counter.unit_counts();
        assert_eq!(counts.get(&"l".into()), 3);
        assert_eq!(counts.get(&"o".into()), 3);
        assert_eq!(counts.get(&"w".into()), 3);
        assert_eq!(counts.len(), 3);
    }

    #[test]
    fn test_merge_pair_deltas_match_recount() {
        let mut counter = PairCounter::new();
        counter.add_split(units(&["a", "a", "a", "b"]), 2);
        counter.add_split(units(&["b", "a", "a"]), 3);
        counter.add_split(units(&["c", "d"]), 7);

        let before = counter.count_pairs();
        let changes = counter.merge_pair_in_words(&pair("a", "a"), "aa");
        let after = counter.count_pairs();

        assert_eq!(counter.words()[0], units(&["aa", "a", "b"]));
        assert_eq!(counter.words()[1], units(&["b", "aa"]));

        let mut keys: Vec<Pair> = before.iter().map(|(p, _)| p.clone()).collect();
        keys.extend(after.iter().map(|(p, _)| p.clone()));
        for key in keys {
            let delta = changes.get(&key).copied().unwrap_or(0);
            assert_eq!(before.get(&key) as i64 + delta, after.get(&key) as i64);
        }
        assert!(!changes.contains_key(&pair("c", "d")));
    }
}
