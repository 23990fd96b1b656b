use crate::config::{ConfigurationError, Feature};
use crate::graph::ResourceKind;
use crate::params::SourceError;
use thiserror::Error;

/// An internal graph invariant would be broken
///
/// These indicate a defect in a composition stage, never bad user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstraintViolation {
    #[error("logical id '{id}' is already defined")]
    DuplicateLogicalId { id: String },

    #[error("'{node}' references '{reference}', which is not defined before it")]
    DanglingReference { node: String, reference: String },

    #[error("no resource named '{id}' to supersede")]
    UnknownResource { id: String },

    #[error("cannot supersede '{id}': '{dependent}' depends on it and '{reference}' is defined later")]
    SupersedeBlocked {
        id: String,
        dependent: String,
        reference: String,
    },

    #[error("'{id}' is a {found} node, not a {expected} node")]
    KindMismatch {
        id: String,
        expected: ResourceKind,
        found: ResourceKind,
    },

    #[error("'{id}' has no readable {property} to extend")]
    MalformedProperty { id: String, property: &'static str },

    #[error("graph has no {kind} node")]
    MissingKind { kind: ResourceKind },

    #[error("graph has {count} {kind} nodes where exactly one is allowed")]
    AmbiguousKind { kind: ResourceKind, count: usize },

    #[error("grant requested for {feature}, which is not enabled")]
    FeatureNotEnabled { feature: Feature },

    #[error("asset '{asset}' still contains placeholder '{placeholder}' after rendering")]
    UnresolvedPlaceholder {
        asset: &'static str,
        placeholder: String,
    },
}

#[derive(Debug, Error)]
pub enum SynthError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("internal composition error in stage '{stage}': {source}")]
    Constraint {
        stage: &'static str,
        #[source]
        source: ConstraintViolation,
    },

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("failed to serialize template: {0}")]
    Serialization(String),
}

impl SynthError {
    /// Whether the failure is the caller's input rather than a defect
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::Source(_))
    }
}

impl From<serde_json::Error> for SynthError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

impl From<serde_yaml::Error> for SynthError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}
