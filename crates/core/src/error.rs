//! Error types for the subword tokenizer library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the tokenizer library.
#[derive(Error, Debug)]
pub enum TokenizerError {
    /// Operation requires a trained (or loaded) tokenizer
    #[error("Tokenizer must be trained before {operation}")]
    Untrained { operation: &'static str },

    /// Persisted state is missing fields or internally inconsistent
    #[error("Load error: {0}")]
    Load(String),

    /// The persisted `tokenizer_type` is not one we know how to build
    #[error("Unknown tokenizer type: {0}")]
    UnknownTokenizerType(String),

    /// The persisted `tokenizer_type` belongs to the other variant
    #[error("Tokenizer type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// Error saving tokenizer state
    #[error("Save error: {0}")]
    Save(String),

    /// I/O error with file context
    #[error("I/O error for {path}: {err}")]
    Io {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Binary serialization/deserialization error
    #[error("Binary encoding error: {0}")]
    Binary(#[from] bincode::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl TokenizerError {
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            err,
        }
    }
}

/// Result type alias for tokenizer operations.
pub type Result<T> = std::result::Result<T, TokenizerError>;
