use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CloudFormation stack composer for Telegram-to-Bedrock gateway hosts
#[derive(Parser, Debug)]
#[command(
    name = "clawstack",
    about = "CloudFormation stack composer for Telegram-to-Bedrock gateway hosts",
    version,
    author,
    long_about = "clawstack turns a handful of typed parameters into a deployable CloudFormation \
                  template for a single EC2 host running Clawdbot, Moltbot or OpenClaw, with \
                  optional content guardrails, power scheduling and spot pricing."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Validate parameters and print the CloudFormation template",
        long_about = "Validates the parameters, composes the resource graph and prints the \
                      template.\n\n\
                      Examples:\n  \
                      clawstack synth --param telegramToken=123:abc\n  \
                      clawstack synth --params-file params.yaml --format yaml\n  \
                      CLAWSTACK_TELEGRAM_TOKEN=123:abc clawstack synth --output stack.json"
    )]
    Synth(SynthArgs),

    #[command(
        about = "Validate parameters only",
        long_about = "Checks every parameter and reports all violations at once. Exits with \
                      code 1 when the configuration is invalid.\n\n\
                      Examples:\n  \
                      clawstack validate --params-file params.json\n  \
                      clawstack validate --param monthlyBudgetLimit=5 --format json"
    )]
    Validate(ValidateArgs),

    #[command(
        about = "Estimate the monthly compute cost",
        long_about = "Replays the power schedule over a month and prices the active hours.\n\n\
                      Examples:\n  \
                      clawstack estimate --param scheduleEnabled=true\n  \
                      clawstack estimate --param useSpotPricing=true --format json"
    )]
    Estimate(EstimateArgs),

    #[command(
        about = "List the accepted parameters",
        long_about = "Prints every parameter with its type, default, constraint and \
                      environment variable.\n\n\
                      Examples:\n  \
                      clawstack params\n  \
                      clawstack params --format yaml"
    )]
    Params(ParamsArgs),
}

/// Where parameters come from; later sources override earlier ones
#[derive(Args, Debug, Clone, Default)]
pub struct ParameterSourceArgs {
    #[arg(
        long,
        value_name = "FILE",
        help = "Parameter file (JSON, YAML or TOML)"
    )]
    pub params_file: Option<PathBuf>,

    #[arg(
        short = 'p',
        long = "param",
        value_name = "KEY=VALUE",
        help = "Set a parameter (repeatable, overrides file and environment)"
    )]
    pub params: Vec<String>,

    #[arg(long, help = "Ignore CLAWSTACK_* environment variables")]
    pub no_env: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SynthArgs {
    #[command(flatten)]
    pub source: ParameterSourceArgs,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "json",
        help = "Template format"
    )]
    pub format: TemplateFormatArg,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write the template to a file instead of stdout"
    )]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub source: ParameterSourceArgs,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Args, Debug, Clone)]
pub struct EstimateArgs {
    #[command(flatten)]
    pub source: ParameterSourceArgs,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Args, Debug, Clone)]
pub struct ParamsArgs {
    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateFormatArg {
    Json,
    Yaml,
}

impl From<TemplateFormatArg> for crate::template::TemplateFormat {
    fn from(arg: TemplateFormatArg) -> Self {
        match arg {
            TemplateFormatArg::Json => crate::template::TemplateFormat::Json,
            TemplateFormatArg::Yaml => crate::template::TemplateFormat::Yaml,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_args_verify() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_default_synth_args() {
        let args = CliArgs::parse_from(["clawstack", "synth"]);
        match args.command {
            Commands::Synth(synth) => {
                assert_eq!(synth.format, TemplateFormatArg::Json);
                assert!(synth.output.is_none());
                assert!(synth.source.params.is_empty());
                assert!(synth.source.params_file.is_none());
                assert!(!synth.source.no_env);
            }
            _ => panic!("Expected Synth command"),
        }
    }

    #[test]
    fn test_repeated_params() {
        let args = CliArgs::parse_from([
            "clawstack",
            "validate",
            "--param",
            "product=moltbot",
            "-p",
            "telegramToken=1:a",
        ]);
        match args.command {
            Commands::Validate(validate) => {
                assert_eq!(validate.source.params, vec!["product=moltbot", "telegramToken=1:a"]);
                assert_eq!(validate.format, OutputFormatArg::Human);
            }
            _ => panic!("Expected Validate command"),
        }
    }

    #[test]
    fn test_global_flags() {
        let args = CliArgs::parse_from(["clawstack", "params", "--log-level", "debug"]);
        assert_eq!(args.log_level.as_deref(), Some("debug"));

        let args = CliArgs::parse_from(["clawstack", "-v", "estimate"]);
        assert!(args.verbose);
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(CliArgs::try_parse_from(["clawstack", "-q", "-v", "params"]).is_err());
    }

    #[test]
    fn test_yaml_template() {
        let args = CliArgs::parse_from(["clawstack", "synth", "--format", "yaml", "-o", "out.yaml"]);
        match args.command {
            Commands::Synth(synth) => {
                assert_eq!(synth.format, TemplateFormatArg::Yaml);
                assert_eq!(synth.output, Some(PathBuf::from("out.yaml")));
            }
            _ => panic!("Expected Synth command"),
        }
    }
}
