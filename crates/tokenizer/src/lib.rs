//! Subtok - trainable subword tokenizers
//!
//! This crate provides the user-facing BPE and WordPiece tokenizers, built on
//! the vocabulary and merge structures of `subtok-core` and the training
//! engines of `subtok-training`.
//!
//! # Features
//!
//! - Frequency-driven BPE with ordered merge replay
//! - Likelihood-driven WordPiece with greedy longest-match splitting
//! - Shared encode/decode/stats through the `SubwordTokenizer` trait
//! - Saving and loading as pretty JSON or compact binary
//!
//! # Example
//!
//! ```rust
//! use subtok::{BpeTokenizer, SubwordTokenizer};
//!
//! let mut tokenizer = BpeTokenizer::builder()
//!     .vocab_size(30)
//!     .min_frequency(1)
//!     .build()?;
//! tokenizer.train(["low lower lowest", "low lower"])?;
//!
//! let ids = tokenizer.encode("lower")?;
//! assert_eq!(tokenizer.decode(&ids)?, "lower");
//! # Ok::<(), subtok::TokenizerError>(())
//! ```

// Re-export core types
pub use subtok_core::{preprocess, Result, SpecialTokensConfig, TokenizerError};

// Tokenizer API
pub mod tokenizer;
pub use tokenizer::{
    BpeTokenizer, BpeTokenizerBuilder, SubwordTokenizer, Tokenizer, TokenizerConfig,
    TokenizerStats, WordPieceTokenizer, WordPieceTokenizerBuilder, BPE_TOKENIZER_TYPE,
    WORDPIECE_TOKENIZER_TYPE,
};

// IO/Serialization
pub mod io;
pub use io::{ModelFormat, SerializedTokenizer, TokenizerLoader, TokenizerSaver};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
