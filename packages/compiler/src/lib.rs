#![deny(clippy::all)]

/**
 * Template Compiler
 *
 * Compile-time passes over parsed template syntax trees: parameter key
 * normalization, scope tracking and template metadata collection.
 */

pub mod error;
pub mod template_ast;
pub mod transform;

// Re-exports
pub use error::{BatchError, Result, TransformError};
pub use template_ast::{
    serialize, Node, NodeId, ReadyTemplates, SyntaxTree, TemplateSet, TreeBuilder, TreeId,
    TreeLookup,
};
pub use transform::{
    transform, transform_tree, Config, Info, TemplateKind, TransformOptions, DEFAULT_OPTIONS,
};
