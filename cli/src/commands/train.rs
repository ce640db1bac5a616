//! Train command implementation.

use clap::{Parser, ValueEnum};

/// Which subword algorithm to train.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TokenizerKind {
    Bpe,
    Wordpiece,
}

/// Train command arguments.
#[derive(Parser)]
pub struct TrainCommand {
    /// Path to the training data file, one text per line
    #[arg(short, long)]
    pub input: String,

    /// Output file for the trained model (.json for JSON, anything else is binary)
    #[arg(short, long)]
    pub output: String,

    /// Subword algorithm
    #[arg(short, long, value_enum, default_value_t = TokenizerKind::Bpe)]
    pub kind: TokenizerKind,

    /// Target vocabulary size
    #[arg(long, default_value_t = 1000)]
    pub vocab_size: usize,

    /// Minimum frequency for seed units and merges
    #[arg(short, long, default_value_t = 2)]
    pub min_frequency: u64,
}

use anyhow::{Context, Result as AnyhowResult};
use log::info;
use std::fs;
use std::time::Instant;
use subtok::{BpeTokenizer, Tokenizer, WordPieceTokenizer};

pub fn run(cmd: TrainCommand) -> AnyhowResult<()> {
    info!(
        "Training {:?} tokenizer on {} (vocab size {}, min frequency {})",
        cmd.kind, cmd.input, cmd.vocab_size, cmd.min_frequency
    );

    let data = fs::read_to_string(&cmd.input)
        .with_context(|| format!("failed to read training data from {}", cmd.input))?;

    let mut tokenizer: Tokenizer = match cmd.kind {
        TokenizerKind::Bpe => BpeTokenizer::builder()
            .vocab_size(cmd.vocab_size)
            .min_frequency(cmd.min_frequency)
            .build()?
            .into(),
        TokenizerKind::Wordpiece => WordPieceTokenizer::builder()
            .vocab_size(cmd.vocab_size)
            .min_frequency(cmd.min_frequency)
            .build()?
            .into(),
    };

    let start = Instant::now();
    tokenizer.train(data.lines())?;
    info!(
        "Training completed in {:.2}s, final vocab size {}",
        start.elapsed().as_secs_f64(),
        tokenizer.get_vocab_size()
    );

    tokenizer.save(&cmd.output)?;
    println!("Model saved to {}", cmd.output);

    Ok(())
}
