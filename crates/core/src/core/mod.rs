//! Core subword data structures.
//!
//! This module contains the vocabulary, BPE merge rules, the merge candidate
//! queue and the trie used for WordPiece longest-match splitting.

pub mod merges;
pub mod priority;
pub mod trie;
pub mod vocab;

pub use merges::{apply_merge, pair, pair_key, MergeMap, MergeRules, Pair, PAIR_KEY_SEPARATOR};
pub use priority::{MergeCandidate, PairPriorityQueue};
pub use trie::{split_longest_match, VocabTrie};
pub use vocab::{
    SpecialTokens, SpecialTokensConfig, TokenFreqs, Vocab, VocabR, Vocabulary,
    NUM_SPECIAL_TOKENS,
};
