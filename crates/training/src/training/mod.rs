//! Training infrastructure for subword tokenizers.
//!
//! This module provides word and pair counting plus the two merge engines:
//! frequency-driven BPE and likelihood-driven WordPiece.

pub mod bpe;
pub mod counter;
pub mod wordpiece;

pub use bpe::{word_units, BpeModel, BpeTrainer, BpeTrainerConfig};
pub use counter::{
    count_pairs, word_frequencies, OrderedCounter, PairCounter, PairCounts, UnitCounts, WordCounts,
};
pub use wordpiece::{
    initial_subwords, merge_units, pair_score, WordPieceModel, WordPieceTrainer,
    WordPieceTrainerConfig,
};
