//! Subcommand handlers
//!
//! Each handler returns the process exit code: 0 on success, 1 when the
//! caller's input was rejected, 2 for anything else.

use super::commands::{EstimateArgs, ParameterSourceArgs, ParamsArgs, SynthArgs, ValidateArgs};
use super::output::{OutputFormat, OutputFormatter, ValidationReport};
use crate::error::SynthError;
use crate::estimate::CostEstimate;
use crate::params::{ConfigValidator, ParameterCatalog, RawParameters, SourceError};
use crate::pipeline::Composer;
use crate::progress::LoggingHandler;
use crate::template::TemplateFormat;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, error, info, warn};

pub const EXIT_OK: i32 = 0;
pub const EXIT_INVALID_INPUT: i32 = 1;
pub const EXIT_FAILURE: i32 = 2;

/// Merges file, environment and `--param` values, later sources winning
pub fn load_parameters(args: &ParameterSourceArgs) -> Result<RawParameters, SourceError> {
    let mut raw = RawParameters::new();

    if let Some(path) = &args.params_file {
        debug!(path = %path.display(), "Reading parameter file");
        raw = raw.merge(RawParameters::from_file(path)?);
    }
    if !args.no_env {
        raw = raw.merge(RawParameters::from_env());
    }
    raw = raw.merge(RawParameters::from_assignments(&args.params)?);

    for key in raw.ignored_keys() {
        warn!(key = %key, "Ignoring unknown parameter");
    }
    Ok(raw)
}

pub fn handle_synth(args: &SynthArgs, quiet: bool) -> i32 {
    let raw = match load_parameters(&args.source) {
        Ok(raw) => raw,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            return EXIT_INVALID_INPUT;
        }
    };

    let mut composer = Composer::new();
    if !quiet {
        composer = composer.with_progress(Box::new(LoggingHandler));
    }

    let stack = match composer.synthesize(&raw) {
        Ok(stack) => stack,
        Err(e) => return report_synth_error(&e),
    };

    let format: TemplateFormat = args.format.into();
    let rendered = match stack.template().render(format) {
        Ok(rendered) => rendered,
        Err(e) => return report_synth_error(&e),
    };

    match write_output(&rendered, args.output.as_deref()) {
        Ok(()) => {
            if let Some(path) = &args.output {
                info!(path = %path.display(), "Template written");
            }
            info!(
                resources = stack.graph.len(),
                stack_name = %stack.config.product.stack_name(),
                "Template ready to deploy"
            );
            EXIT_OK
        }
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            EXIT_FAILURE
        }
    }
}

pub fn handle_validate(args: &ValidateArgs) -> i32 {
    let raw = match load_parameters(&args.source) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_INVALID_INPUT;
        }
    };

    let validator = ConfigValidator::new();
    let ignored = raw.ignored_keys().to_vec();
    let (report, code) = match validator.validate(&raw) {
        Ok(config) => {
            let advisories = validator.advise(&config);
            (
                ValidationReport::accepted(&config, advisories, ignored),
                EXIT_OK,
            )
        }
        Err(e) => (ValidationReport::rejected(&e, ignored), EXIT_INVALID_INPUT),
    };

    match print_formatted(args.format.into(), |f| f.format_validation(&report)) {
        Ok(()) => code,
        Err(code) => code,
    }
}

pub fn handle_estimate(args: &EstimateArgs) -> i32 {
    let raw = match load_parameters(&args.source) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_INVALID_INPUT;
        }
    };

    let config = match ConfigValidator::new().validate(&raw) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_INVALID_INPUT;
        }
    };

    let estimate = CostEstimate::for_config(&config);
    match print_formatted(args.format.into(), |f| f.format_estimate(&estimate)) {
        Ok(()) => EXIT_OK,
        Err(code) => code,
    }
}

pub fn handle_params(args: &ParamsArgs) -> i32 {
    let catalog = ParameterCatalog::standard();
    match print_formatted(args.format.into(), |f| f.format_catalog(&catalog)) {
        Ok(()) => EXIT_OK,
        Err(code) => code,
    }
}

fn print_formatted<F>(format: OutputFormat, render: F) -> Result<(), i32>
where
    F: FnOnce(&OutputFormatter) -> Result<String>,
{
    let formatter = OutputFormatter::new(format);
    match render(&formatter) {
        Ok(text) => {
            print!("{}", text);
            if !text.ends_with('\n') {
                println!();
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            Err(EXIT_FAILURE)
        }
    }
}

fn report_synth_error(e: &SynthError) -> i32 {
    eprintln!("Error: {}", e);
    if e.is_user_error() {
        EXIT_INVALID_INPUT
    } else {
        error!(error = %e, "Synthesis failed");
        EXIT_FAILURE
    }
}

fn write_output(content: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => fs::write(path, content)
            .with_context(|| format!("Failed to write template to {}", path.display())),
        None => {
            println!("{}", content.trim_end());
            Ok(())
        }
    }
}
