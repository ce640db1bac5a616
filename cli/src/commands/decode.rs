//! Decode command implementation.

use clap::Parser;

/// Decode command arguments.
#[derive(Parser)]
pub struct DecodeCommand {
    /// Path to the trained tokenizer model
    #[arg(short, long)]
    pub tokenizer: String,

    /// Whitespace separated token ids ("-" reads stdin)
    #[arg(short, long)]
    pub input: String,
}

use super::read_input;
use anyhow::{Context, Result as AnyhowResult};
use subtok::Tokenizer;

pub fn run(cmd: DecodeCommand) -> AnyhowResult<()> {
    let tokenizer = Tokenizer::load(&cmd.tokenizer)?;
    let input = read_input(cmd.input)?;

    let ids = input
        .split_whitespace()
        .map(|id| {
            id.parse::<u32>()
                .with_context(|| format!("invalid token id {:?}", id))
        })
        .collect::<AnyhowResult<Vec<u32>>>()?;

    println!("{}", tokenizer.decode(&ids)?);

    Ok(())
}
