//! Serialization and deserialization for trained tokenizers.
//!
//! Both tokenizer variants share one snapshot record, written as pretty JSON
//! or compact bincode depending on the file extension.

pub mod format;
pub mod load;
pub mod save;

pub use format::{ModelFormat, SerializedTokenizer};
pub use load::TokenizerLoader;
pub use save::TokenizerSaver;
