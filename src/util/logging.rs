//! Structured logging setup for clawstack
//!
//! Logs go to stderr so a template printed on stdout stays clean.
//! Initialization happens at most once per process; later calls are no-ops.
//!
//! # Example
//!
//! ```no_run
//! use clawstack::util::logging;
//! use tracing::{debug, info};
//!
//! logging::init_from_env();
//!
//! info!("Composition started");
//! debug!(stage = "network", "Applying stage");
//! ```

use std::env;
use std::str::FromStr;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default log level when no flag is given
pub const LOG_LEVEL_ENV: &str = "CLAWSTACK_LOG_LEVEL";
/// `json` or `plain`
pub const LOG_FORMAT_ENV: &str = "CLAWSTACK_LOG_FORMAT";

static INIT: Once = Once::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" | "text" => Ok(Self::Plain),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: Level,
    pub format: LogFormat,
    /// Source file and line of each event
    pub show_source: bool,
    /// Thread id and name of each event
    pub show_threads: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Plain,
            show_source: false,
            show_threads: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Self::default()
        }
    }

    /// JSON lines with source locations, for log shippers
    pub fn production() -> Self {
        Self {
            format: LogFormat::Json,
            show_source: true,
            show_threads: true,
            ..Self::default()
        }
    }

    pub fn development() -> Self {
        Self::with_level(Level::DEBUG)
    }
}

/// Parses a level name case-insensitively
///
/// ```
/// use clawstack::util::logging::parse_level;
/// use tracing::Level;
///
/// assert_eq!(parse_level("Warn"), Some(Level::WARN));
/// assert_eq!(parse_level("loud"), None);
/// ```
pub fn parse_level(name: &str) -> Option<Level> {
    Level::from_str(name.trim()).ok()
}

fn level_or_info(name: &str, origin: &str) -> Level {
    parse_level(name).unwrap_or_else(|| {
        eprintln!(
            "Invalid log level '{}' from {}, using info (expected trace, debug, info, warn or error)",
            name, origin
        );
        Level::INFO
    })
}

/// Picks the level from CLI flags, then `CLAWSTACK_LOG_LEVEL`
///
/// `--log-level` beats `--verbose`, which beats `--quiet`.
pub fn resolve_level(explicit: Option<&str>, verbose: bool, quiet: bool) -> Level {
    match (explicit, verbose, quiet) {
        (Some(name), _, _) => level_or_info(name, "--log-level"),
        (None, true, _) => Level::DEBUG,
        (None, false, true) => Level::ERROR,
        (None, false, false) => env::var(LOG_LEVEL_ENV)
            .map(|name| level_or_info(&name, LOG_LEVEL_ENV))
            .unwrap_or(Level::INFO),
    }
}

fn directive(spec: &str) -> Option<Directive> {
    spec.parse().ok()
}

/// `RUST_LOG` when set, otherwise everything from this crate at `level`
fn filter_for(level: Level) -> EnvFilter {
    if env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        return EnvFilter::from_default_env();
    }
    let filter = EnvFilter::new("warn");
    match directive(&format!("{}={}", env!("CARGO_PKG_NAME"), level)) {
        Some(d) => filter.add_directive(d),
        None => filter,
    }
}

pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let json = (config.format == LogFormat::Json).then(|| {
            fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_file(config.show_source)
                .with_line_number(config.show_source)
                .with_thread_ids(config.show_threads)
                .with_thread_names(config.show_threads)
        });
        let plain = (config.format == LogFormat::Plain).then(|| {
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_file(config.show_source)
                .with_line_number(config.show_source)
                .with_thread_ids(config.show_threads)
                .with_thread_names(config.show_threads)
        });

        tracing_subscriber::registry()
            .with(filter_for(config.level))
            .with(json)
            .with(plain)
            .init();
    });
}

pub fn init_default() {
    init_logging(LoggingConfig::default());
}

/// Reads `CLAWSTACK_LOG_LEVEL` and `CLAWSTACK_LOG_FORMAT`
pub fn init_from_env() {
    let format = env::var(LOG_FORMAT_ENV)
        .ok()
        .and_then(|f| f.parse().ok())
        .unwrap_or_default();
    init_logging(LoggingConfig {
        format,
        ..LoggingConfig::with_level(resolve_level(None, false, false))
    });
}
