//! clawstack - CloudFormation stack composer for Telegram-to-Bedrock gateways
//!
//! Turns a small set of typed parameters into a CloudFormation template for a
//! single EC2 host running Clawdbot, Moltbot or OpenClaw. The host polls
//! Telegram, forwards messages to Amazon Bedrock and accepts no inbound
//! traffic.
//!
//! # Core Concepts
//!
//! - **Parameters**: declared once in a catalog, collected from files,
//!   environment and arguments, and validated all at once into a
//!   [`StackConfig`]
//! - **Resource graph**: an ordered set of typed nodes in which every
//!   reference points at an earlier node
//! - **Stages**: pure functions from one graph to the next, some gated by a
//!   feature flag
//!
//! # Example Usage
//!
//! ```
//! use clawstack::{Composer, RawParameters};
//!
//! let raw = RawParameters::from_pairs([
//!     ("telegramToken", "123456:ABC-DEF"),
//!     ("product", "moltbot"),
//! ]);
//! let stack = Composer::new().synthesize(&raw).expect("valid stack");
//! let json = stack.template().to_json().expect("serializable");
//! assert!(json.contains("MoltbotInstance"));
//! ```
//!
//! # Project Structure
//!
//! - [`params`]: parameter catalog, sources and validation
//! - [`graph`]: resource nodes, references and IAM policy documents
//! - [`pipeline`]: composition stages, outputs and the [`Composer`]
//! - [`template`]: the rendered CloudFormation document
//! - [`schedule`] and [`estimate`]: power schedule and monthly cost

pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod error;
pub mod estimate;
pub mod graph;
pub mod params;
pub mod pipeline;
pub mod progress;
pub mod schedule;
pub mod template;
pub mod util;

pub use config::{ConfigurationError, Feature, StackConfig};
pub use error::{ConstraintViolation, SynthError};
pub use estimate::CostEstimate;
pub use graph::{ResourceGraph, ResourceKind, ResourceNode};
pub use params::{ConfigValidator, ParameterCatalog, Product, RawParameters};
pub use pipeline::{Composer, CompositionStage, StackOutput, SynthesizedStack};
pub use schedule::PowerSchedule;
pub use template::{Template, TemplateFormat};
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_name_is_clawstack() {
        assert_eq!(NAME, "clawstack");
    }
}
