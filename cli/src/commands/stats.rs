//! Stats command implementation.

use clap::Parser;

/// Stats command arguments.
#[derive(Parser)]
pub struct StatsCommand {
    /// Path to the trained tokenizer model
    #[arg(short, long)]
    pub tokenizer: String,

    /// Print the statistics as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

use anyhow::Result as AnyhowResult;
use subtok::Tokenizer;

pub fn run(cmd: StatsCommand) -> AnyhowResult<()> {
    let tokenizer = Tokenizer::load(&cmd.tokenizer)?;
    let stats = tokenizer.get_stats();

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("Type:       {}", stats.tokenizer_type);
    println!("Trained:    {}", stats.trained);
    println!(
        "Vocab size: {} (requested {})",
        stats.vocab_size, stats.target_vocab_size
    );
    println!("Most frequent tokens:");
    for (token, count) in &stats.most_frequent_tokens {
        println!("  {:>8}  {}", count, token);
    }

    if let Some(bpe) = tokenizer.as_bpe() {
        println!("Merge rules: {}", bpe.get_merge_rules().len());
    }
    if let Some(wordpiece) = tokenizer.as_wordpiece() {
        println!("Subword counts: {}", wordpiece.get_subword_vocab().len());
    }

    Ok(())
}
