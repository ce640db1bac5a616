//! CLI commands for the subtok tokenizers.

pub mod analyze;
pub mod decode;
pub mod encode;
pub mod stats;
pub mod train;

pub use analyze::AnalyzeCommand;
pub use decode::DecodeCommand;
pub use encode::EncodeCommand;
pub use stats::StatsCommand;
pub use train::TrainCommand;

use std::io::Read;

/// Literal argument, or stdin when it is "-".
pub(crate) fn read_input(input: String) -> std::io::Result<String> {
    if input != "-" {
        return Ok(input);
    }

    let mut buffer = String::new();
    std::io::stdin().read_to_string(&mut buffer)?;
    Ok(buffer)
}
