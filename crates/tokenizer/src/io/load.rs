//! Load functionality for pre-trained tokenizers.
//!
//! Loading fails fast on inconsistent snapshots: the vocabulary and its
//! inverse must agree, ids must be contiguous, and every merge must refer to
//! tokens the vocabulary knows.

use super::format::{ModelFormat, SerializedTokenizer};
use compact_str::CompactString;
use log::debug;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use subtok_core::{pair, pair_key, MergeRules, Result, TokenFreqs, TokenizerError, Vocabulary};
use subtok_training::WordCounts;

/// Tokenizer loader - reads snapshots and rebuilds core structures.
pub struct TokenizerLoader;

impl TokenizerLoader {
    /// Read a snapshot, picking the format from the file extension.
    pub fn read(path: &Path) -> Result<SerializedTokenizer> {
        Self::read_as(path, ModelFormat::from_path(path))
    }

    /// Read a snapshot in an explicit format.
    pub fn read_as(path: &Path, format: ModelFormat) -> Result<SerializedTokenizer> {
        let snapshot: SerializedTokenizer = match format {
            ModelFormat::Json => {
                let file = File::open(path).map_err(|e| TokenizerError::io(path, e))?;
                serde_json::from_reader(BufReader::new(file)).map_err(|e| {
                    TokenizerError::Load(format!(
                        "Failed to deserialize tokenizer from {}: {}",
                        path.display(),
                        e
                    ))
                })?
            }
            // Decoding from memory bounds every length prefix by the file size.
            ModelFormat::Binary => {
                let bytes = std::fs::read(path).map_err(|e| TokenizerError::io(path, e))?;
                bincode::deserialize(&bytes).map_err(|e| {
                    TokenizerError::Load(format!(
                        "Failed to deserialize tokenizer from {}: {}",
                        path.display(),
                        e
                    ))
                })?
            }
        };

        debug!(
            "Read {} ({} tokens) from {}",
            snapshot.tokenizer_type,
            snapshot.vocab.len(),
            path.display()
        );

        Ok(snapshot)
    }

    /// Fail unless the snapshot was written by the `expected` tokenizer type.
    pub fn check_type(snapshot: &SerializedTokenizer, expected: &str) -> Result<()> {
        if snapshot.tokenizer_type != expected {
            return Err(TokenizerError::TypeMismatch {
                expected: expected.to_string(),
                found: snapshot.tokenizer_type.clone(),
            });
        }
        Ok(())
    }

    /// Rebuild the vocabulary, checking `vocab` against `id_to_token`.
    pub fn vocabulary(snapshot: &SerializedTokenizer) -> Result<Vocabulary> {
        if snapshot.vocab.len() != snapshot.id_to_token.len() {
            return Err(TokenizerError::Load(format!(
                "vocab has {} entries but id_to_token has {}",
                snapshot.vocab.len(),
                snapshot.id_to_token.len()
            )));
        }
        for (&id, token) in &snapshot.id_to_token {
            if snapshot.vocab.get(token) != Some(&id) {
                return Err(TokenizerError::Load(format!(
                    "id_to_token maps {} to {:?} but vocab disagrees",
                    id, token
                )));
            }
        }

        let freqs: TokenFreqs = snapshot
            .token_freqs
            .iter()
            .map(|(token, &count)| (CompactString::new(token), count))
            .collect();

        Vocabulary::from_entries(
            snapshot
                .vocab
                .iter()
                .map(|(token, &id)| (CompactString::new(token), id)),
            freqs,
        )
    }

    /// Rebuild BPE merge rules from `merge_order`, cross-checking `merges`.
    pub fn merge_rules(snapshot: &SerializedTokenizer, vocab: &Vocabulary) -> Result<MergeRules> {
        let order = snapshot
            .merge_order
            .as_ref()
            .ok_or_else(|| TokenizerError::Load("missing required field merge_order".to_string()))?;

        let rules = MergeRules::from_pairs(order.iter().map(|(left, right)| pair(left, right)));
        if rules.len() != order.len() {
            return Err(TokenizerError::Load(
                "merge_order contains duplicate pairs".to_string(),
            ));
        }

        for (pair, merged) in rules.iter() {
            if !vocab.contains(merged) {
                return Err(TokenizerError::Load(format!(
                    "merge {:?} produces {:?}, which is not in the vocabulary",
                    pair, merged
                )));
            }
        }

        if let Some(merges) = &snapshot.merges {
            if merges.len() != rules.len() {
                return Err(TokenizerError::Load(format!(
                    "merges has {} entries but merge_order has {}",
                    merges.len(),
                    rules.len()
                )));
            }
            for (pair, merged) in rules.iter() {
                let key = pair_key(pair);
                if merges.get(&key).map(String::as_str) != Some(merged) {
                    return Err(TokenizerError::Load(format!(
                        "merges entry {:?} disagrees with merge_order",
                        key
                    )));
                }
            }
        }

        Ok(rules)
    }

    /// The cached word frequency table (empty for legacy snapshots).
    pub fn word_counts(snapshot: &SerializedTokenizer) -> WordCounts {
        snapshot
            .word_freqs
            .iter()
            .map(|(word, &count)| (CompactString::new(word), count))
            .collect()
    }

    /// A required variant-specific field, or a load error naming it.
    pub fn required<'a, T>(field: &'a Option<T>, name: &str) -> Result<&'a T> {
        field
            .as_ref()
            .ok_or_else(|| TokenizerError::Load(format!("missing required field {}", name)))
    }
}
