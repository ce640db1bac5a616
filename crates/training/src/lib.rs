//! Subtok-training - subword training infrastructure
//!
//! This crate provides the training algorithms for learning BPE merge rules
//! and WordPiece vocabularies from text.
//!
//! # Features
//!
//! - Word frequency extraction over normalized corpus lines
//! - Weighted adjacent pair counting with incremental updates for BPE
//! - Deterministic merge selection for both algorithms
//!
//! # Example
//!
//! ```rust
//! use subtok_core::{SpecialTokensConfig, Vocabulary};
//! use subtok_training::{word_frequencies, BpeTrainer, BpeTrainerConfig};
//!
//! let words = word_frequencies(["low lower lowest", "low lower"]);
//! let trainer = BpeTrainer::new(BpeTrainerConfig {
//!     vocab_size: 30,
//!     min_frequency: 1,
//!     ..Default::default()
//! });
//!
//! let vocab = Vocabulary::new(&SpecialTokensConfig::default())?;
//! let model = trainer.train(&words, vocab)?;
//! assert!(!model.merges.is_empty());
//! # Ok::<(), subtok_core::TokenizerError>(())
//! ```

pub use subtok_core::{Result, TokenizerError};

// Training infrastructure
pub mod training;
pub use training::{
    count_pairs, initial_subwords, merge_units, pair_score, word_frequencies, word_units,
    BpeModel, BpeTrainer, BpeTrainerConfig, OrderedCounter, PairCounter, PairCounts, UnitCounts,
    WordCounts, WordPieceModel, WordPieceTrainer, WordPieceTrainerConfig,
};
