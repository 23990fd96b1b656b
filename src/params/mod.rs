//! Stack parameters: declaration, collection and validation

pub mod advisories;
pub mod catalog;
pub mod choice_enum_macro;
pub mod choices;
pub mod rules;
pub mod secret;
pub mod source;
pub mod validator;

pub use advisories::{Advisory, AdvisoryRule};
pub use catalog::{keys, ParamType, ParameterCatalog, ParameterSpec};
pub use choices::{BedrockModel, EgressPolicy, InstanceSize, Product};
pub use rules::{Constraint, ParamValue, Violation};
pub use secret::SecretString;
pub use source::{FileFormat, RawParameters, SourceError, ENV_PREFIX};
pub use validator::ConfigValidator;
