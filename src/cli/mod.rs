pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{CliArgs, Commands, EstimateArgs, ParamsArgs, SynthArgs, ValidateArgs};
pub use handlers::{handle_estimate, handle_params, handle_synth, handle_validate};
pub use output::{OutputFormat, OutputFormatter, ValidationReport};
