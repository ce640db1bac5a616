//! Pre-tokenization pipeline.
//!
//! Text is normalized and split on whitespace before any subword model sees
//! it. Training and encoding share this step so their words always agree.

pub mod normalize;

pub use normalize::{preprocess, Normalizer};
