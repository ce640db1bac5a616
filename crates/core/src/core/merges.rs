//! Merge rule management for BPE.
//!
//! Merge rules are kept in the exact order they were learned. Encoding
//! replays them in that order, so the list is append-only.

use ahash::AHashMap;
use compact_str::CompactString;

/// A pair of adjacent subword units that can be merged.
pub type Pair = (CompactString, CompactString);

/// Merge rule mapping: pair -> (rank, merged unit).
pub type MergeMap = AHashMap<Pair, (u32, CompactString)>;

/// Separator used when a pair has to be written as a single string key.
pub const PAIR_KEY_SEPARATOR: &str = "___";

/// Build a pair from two string slices.
#[inline]
pub fn pair(left: &str, right: &str) -> Pair {
    (CompactString::new(left), CompactString::new(right))
}

/// Render a pair as a composite string key (`left___right`).
pub fn pair_key(pair: &Pair) -> String {
    format!("{}{}{}", pair.0, PAIR_KEY_SEPARATOR, pair.1)
}

/// Ordered collection of BPE merge rules with pair lookup.
#[derive(Debug, Clone, Default)]
pub struct MergeRules {
    /// Merge rules: pair -> (rank, merged unit)
    merges: MergeMap,
    /// Pairs in the order they were learned
    order: Vec<Pair>,
}

impl MergeRules {
    /// Create a new empty collection of merge rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a merge rule and return its rank.
    ///
    /// A pair that is already known keeps its original rank.
    pub fn add_merge(&mut self, pair: Pair, merged: CompactString) -> u32 {
        if let Some(&(rank, _)) = self.merges.get(&pair) {
            return rank;
        }

        let rank = self.order.len() as u32;
        self.merges.insert(pair.clone(), (rank, merged));
        self.order.push(pair);
        rank
    }

    /// Get the merge rule for a pair as (rank, merged unit).
    #[inline]
    pub fn get(&self, pair: &Pair) -> Option<(u32, &str)> {
        self.merges
            .get(pair)
            .map(|(rank, merged)| (*rank, merged.as_str()))
    }

    /// Iterate rules in learned order as (pair, merged unit).
    pub fn iter(&self) -> impl Iterator<Item = (&Pair, &str)> + '_ {
        self.order.iter().map(move |pair| {
            let merged = self
                .merges
                .get(pair)
                .map(|(_, merged)| merged.as_str())
                .unwrap_or_default();
            (pair, merged)
        })
    }

    /// Pairs in learned order.
    pub fn order(&self) -> &[Pair] {
        &self.order
    }

    /// Get the number of merge rules.
    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if there are no merge rules.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Create merge rules from an ordered list of pairs.
    ///
    /// Each pair merges into the concatenation of its two units.
    pub fn from_pairs(pairs: impl IntoIterator<Item = Pair>) -> Self {
        let mut rules = Self::new();

        for pair in pairs {
            let merged = concat(&pair.0, &pair.1);
            rules.add_merge(pair, merged);
        }

        rules
    }

    /// Rewrite `units` by replaying every rule in learned order.
    pub fn apply_all(&self, mut units: Vec<CompactString>) -> Vec<CompactString> {
        for (pair, merged) in self.iter() {
            if units.len() < 2 {
                break;
            }
            units = apply_merge(units, pair, merged);
        }
        units
    }
}

/// Concatenate two units into a new one.
#[inline]
pub fn concat(left: &str, right: &str) -> CompactString {
    let mut merged = CompactString::with_capacity(left.len() + right.len());
    merged.push_str(left);
    merged.push_str(right);
    merged
}

/// Replace every non-overlapping occurrence of `pair` in `units`, left to right.
///
/// After a merge at position i, scanning resumes past the merged unit, so
/// `a a a` with pair `(a, a)` becomes `aa a`.
pub fn apply_merge(units: Vec<CompactString>, pair: &Pair, merged: &str) -> Vec<CompactString> {
    if units.len() < 2 {
        return units;
    }

    let mut out = Vec::with_capacity(units.len());
    let mut iter = units.into_iter().peekable();

    while let Some(unit) = iter.next() {
        if unit == pair.0 && iter.peek() == Some(&pair.1) {
            iter.next();
            out.push(CompactString::new(merged));
        } else {
            out.push(unit);
        }
    }

    out
}
