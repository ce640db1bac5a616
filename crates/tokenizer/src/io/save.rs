//! Save functionality for trained tokenizers.

use super::format::{ModelFormat, SerializedTokenizer};
use log::debug;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use subtok_core::{Result, TokenizerError};

/// Tokenizer saver - writes a snapshot to disk.
pub struct TokenizerSaver<'a> {
    snapshot: &'a SerializedTokenizer,
}

impl<'a> TokenizerSaver<'a> {
    pub fn new(snapshot: &'a SerializedTokenizer) -> Self {
        Self { snapshot }
    }

    /// Save to `path`, picking the format from its extension.
    pub fn save(&self, path: &Path) -> Result<()> {
        self.save_as(path, ModelFormat::from_path(path))
    }

    /// Save to `path` in an explicit format.
    ///
    /// Missing parent directories are created.
    pub fn save_as(&self, path: &Path, format: ModelFormat) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| TokenizerError::io(parent, e))?;
        }

        let file = File::create(path).map_err(|e| TokenizerError::io(path, e))?;
        let mut writer = BufWriter::new(file);

        match format {
            ModelFormat::Json => serde_json::to_writer_pretty(&mut writer, self.snapshot)
                .map_err(|e| TokenizerError::Save(format!("Failed to serialize tokenizer: {}", e)))?,
            ModelFormat::Binary => bincode::serialize_into(&mut writer, self.snapshot)
                .map_err(|e| TokenizerError::Save(format!("Failed to serialize tokenizer: {}", e)))?,
        }

        writer.flush().map_err(|e| TokenizerError::io(path, e))?;

        debug!(
            "Saved {} ({} tokens) to {} as {:?}",
            self.snapshot.tokenizer_type,
            self.snapshot.vocab.len(),
            path.display(),
            format
        );

        Ok(())
    }
}
