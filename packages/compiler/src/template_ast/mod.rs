pub mod ast;
/**
 * Template Syntax Tree Module
 *
 * Tree model, construction, serialization and the template registry
 */
pub mod builder;
pub mod registry;
pub mod serializer;

pub use ast::*;
pub use builder::TreeBuilder;
pub use registry::{ReadyTemplates, TemplateSet, TreeLookup};
pub use serializer::{serialize, serialize_node};
