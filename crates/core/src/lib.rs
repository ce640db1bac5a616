//! Subtok-core - Core data structures for subword tokenizers
//!
//! This crate provides the pieces shared by training and inference,
//! independent of which subword model (BPE or WordPiece) is in use.
//!
//! # Features
//!
//! - Bijective vocabulary with fixed special token ids and token frequencies
//! - Ordered BPE merge rules with a pure merge rewrite
//! - Deterministic merge candidate queue
//! - Trie-backed greedy longest-match splitting
//! - Text normalization shared by training and encoding
//!
//! # Example
//!
//! ```rust
//! use subtok_core::{SpecialTokensConfig, Vocabulary};
//!
//! let mut vocab = Vocabulary::new(&SpecialTokensConfig::default())?;
//! let id = vocab.add_token("hello");
//! assert_eq!(id, 4);
//! # Ok::<(), subtok_core::TokenizerError>(())
//! ```

pub mod error;
pub use error::{Result, TokenizerError};

pub mod core;
pub use crate::core::{
    apply_merge, pair, pair_key, split_longest_match, MergeCandidate, MergeMap, MergeRules, Pair,
    PairPriorityQueue, SpecialTokens, SpecialTokensConfig, TokenFreqs, Vocab, VocabR, VocabTrie,
    Vocabulary, NUM_SPECIAL_TOKENS, PAIR_KEY_SEPARATOR,
};

pub mod pre_tokenizer;
pub use pre_tokenizer::{preprocess, Normalizer};
