use clawstack::cli::commands::{CliArgs, Commands};
use clawstack::cli::handlers::{handle_estimate, handle_params, handle_synth, handle_validate};
use clawstack::util::{init_logging, resolve_level, LoggingConfig};
use clawstack::VERSION;

use clap::Parser;
use tracing::debug;

fn main() {
    let args = CliArgs::parse();
    init_logging(LoggingConfig::with_level(resolve_level(
        args.log_level.as_deref(),
        args.verbose,
        args.quiet,
    )));

    debug!("clawstack v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Synth(synth_args) => handle_synth(synth_args, args.quiet),
        Commands::Validate(validate_args) => handle_validate(validate_args),
        Commands::Estimate(estimate_args) => handle_estimate(estimate_args),
        Commands::Params(params_args) => handle_params(params_args),
    };

    std::process::exit(exit_code);
}
