//! Analyze command implementation.

use clap::Parser;

/// Analyze command arguments.
#[derive(Parser)]
pub struct AnalyzeCommand {
    /// Path to a trained WordPiece model
    #[arg(short, long)]
    pub tokenizer: String,

    /// Words to split
    #[arg(required = true)]
    pub words: Vec<String>,
}

use anyhow::{bail, Result as AnyhowResult};
use subtok::Tokenizer;

pub fn run(cmd: AnalyzeCommand) -> AnyhowResult<()> {
    let tokenizer = Tokenizer::load(&cmd.tokenizer)?;
    let Some(wordpiece) = tokenizer.as_wordpiece() else {
        bail!(
            "analyze needs a WordPiece model, {} is a {}",
            cmd.tokenizer,
            tokenizer.tokenizer_type()
        );
    };

    for word in &cmd.words {
        println!("{} -> {}", word, wordpiece.analyze_word(word)?.join(" "));
    }

    Ok(())
}
