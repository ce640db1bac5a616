//! Encode command implementation.

use clap::Parser;

/// Encode command arguments.
#[derive(Parser)]
pub struct EncodeCommand {
    /// Path to the trained tokenizer model
    #[arg(short, long)]
    pub tokenizer: String,

    /// Text to encode ("-" reads stdin)
    #[arg(short, long)]
    pub input: String,

    /// Print subword units instead of ids
    #[arg(short, long, default_value_t = false)]
    pub units: bool,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<String>,
}

use super::read_input;
use anyhow::Result as AnyhowResult;
use subtok::Tokenizer;

pub fn run(cmd: EncodeCommand) -> AnyhowResult<()> {
    let tokenizer = Tokenizer::load(&cmd.tokenizer)?;
    let text = read_input(cmd.input)?;

    let (output, count) = if cmd.units {
        let units = tokenizer.tokenize(&text)?;
        (units.join(" "), units.len())
    } else {
        let ids = tokenizer.encode(&text)?;
        let ids_str: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
        (ids_str.join(" "), ids.len())
    };

    match &cmd.output {
        Some(path) => {
            std::fs::write(path, &output)?;
            println!("Encoded {} tokens to {}", count, path);
        }
        None => {
            println!("{}", output);
        }
    }

    Ok(())
}
