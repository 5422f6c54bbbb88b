//! Template Transformation
//!
//! Compile-time rewrite of parsed templates before their first execution.

pub mod config;
pub mod info;
pub mod options;
pub mod provenance;
pub mod scope;
pub mod walker;

pub use config::{Config, ConfigError, DEFAULT_CONFIG};
pub use info::{Info, InfoCollector, TemplateKind, TransformFeatures};
pub use options::{TransformOptions, DEFAULT_OPTIONS};
pub use provenance::{normalize, ChainClassifier, ChainRoot, Provenance};
pub use scope::ScopeStack;
pub use walker::{transform, transform_tree};
