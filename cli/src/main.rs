//! Subtok CLI - Command-line interface for the subword tokenizers.
//!
//! This is the main entry point for the `subtok` command-line tool.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AnalyzeCommand, DecodeCommand, EncodeCommand, StatsCommand, TrainCommand};

#[derive(Parser)]
#[command(name = "subtok")]
#[command(about = "Train and apply BPE and WordPiece subword tokenizers", long_about = None)]
#[command(version)]
struct Cli {
    /// Log debug output (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a new tokenizer from text data
    Train(TrainCommand),
    /// Encode text to token IDs
    Encode(EncodeCommand),
    /// Decode token IDs back to text
    Decode(DecodeCommand),
    /// Show vocabulary statistics of a saved tokenizer
    Stats(StatsCommand),
    /// Split a single word with a WordPiece tokenizer
    Analyze(AnalyzeCommand),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match cli.command {
        Commands::Train(cmd) => commands::train::run(cmd)?,
        Commands::Encode(cmd) => commands::encode::run(cmd)?,
        Commands::Decode(cmd) => commands::decode::run(cmd)?,
        Commands::Stats(cmd) => commands::stats::run(cmd)?,
        Commands::Analyze(cmd) => commands::analyze::run(cmd)?,
    }

    Ok(())
}
