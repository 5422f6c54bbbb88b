//! Transform Errors
//!
//! Error types returned by the transformation pass and the template registry.

use thiserror::Error;

use crate::transform::config::ConfigError;
use crate::transform::TemplateKind;

/// Result alias used throughout the crate
pub type Result<T, E = TransformError> = std::result::Result<T, E>;

/// A fatal condition that aborts the transformation of one root template
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("template {template:?} has kind {kind:?}, which cannot be transformed")]
    UnsupportedKind { template: String, kind: TemplateKind },

    #[error("template {name:?} referenced from {referenced_from:?} is not registered")]
    TemplateNotFound {
        name: String,
        referenced_from: String,
    },

    #[error("invalid {variable} declaration in template {template:?}")]
    Config {
        template: String,
        variable: String,
        #[source]
        source: ConfigError,
    },

    #[error("no root template named {name:?}")]
    UnknownTemplate { name: String },
}

impl TransformError {
    /// Name of the template the error is attributed to
    pub fn template_name(&self) -> &str {
        match self {
            TransformError::UnsupportedKind { template, .. } => template,
            TransformError::TemplateNotFound {
                referenced_from, ..
            } => referenced_from,
            TransformError::Config { template, .. } => template,
            TransformError::UnknownTemplate { name } => name,
        }
    }
}

/// Failures collected while preparing a registration batch
#[derive(Debug, Error)]
#[error("{} template(s) failed to transform: {}", .failures.len(), failed_names(.failures))]
pub struct BatchError {
    pub failures: Vec<(String, TransformError)>,
}

impl BatchError {
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.failures.iter().map(|(name, _)| name.as_str())
    }
}

fn failed_names(failures: &[(String, TransformError)]) -> String {
    failures
        .iter()
        .map(|(name, _)| name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
