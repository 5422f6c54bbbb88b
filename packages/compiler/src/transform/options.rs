//! Transform Options
//!
//! Reserved identifiers the pass recognizes in templates.

use once_cell::sync::Lazy;

/// Shared default options
pub static DEFAULT_OPTIONS: Lazy<TransformOptions> = Lazy::new(TransformOptions::default);

/// Names the transformation treats specially
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOptions {
    /// Segment that introduces a case-folded parameter map (matched case-insensitively)
    pub params_marker: String,
    /// Zero-argument functions whose result can root a field chain
    pub global_accessors: Vec<String>,
    /// Segments holding user data whose keys keep their casing
    pub data_containers: Vec<String>,
    /// Accessor for content injected by a calling template
    pub inner_accessor: String,
    /// Variable carrying an inline config literal
    pub config_variable: String,
    /// Function that returns a value from a partial
    pub return_function: String,
}

impl Default for TransformOptions {
    fn default() -> Self {
        TransformOptions {
            params_marker: "Params".to_string(),
            global_accessors: vec!["site".to_string()],
            data_containers: vec!["Data".to_string()],
            inner_accessor: "Inner".to_string(),
            config_variable: "$_hugo_config".to_string(),
            return_function: "return".to_string(),
        }
    }
}

impl TransformOptions {
    pub fn with_params_marker(mut self, marker: impl Into<String>) -> Self {
        self.params_marker = marker.into();
        self
    }

    pub fn with_global_accessor(mut self, name: impl Into<String>) -> Self {
        self.global_accessors.push(name.into());
        self
    }

    pub fn with_data_container(mut self, name: impl Into<String>) -> Self {
        self.data_containers.push(name.into());
        self
    }

    pub fn is_params_marker(&self, segment: &str) -> bool {
        segment.to_lowercase() == self.params_marker.to_lowercase()
    }

    pub fn is_global_accessor(&self, ident: &str) -> bool {
        self.global_accessors.iter().any(|g| g == ident)
    }

    pub fn is_data_container(&self, segment: &str) -> bool {
        self.data_containers.iter().any(|d| d == segment)
    }
}
