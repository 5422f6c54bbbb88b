//! Template Info Collector
//!
//! Per-template metadata gathered during the rewrite traversal.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::config::Config;

/// What a template is used as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemplateKind {
    /// Not transformable
    Undefined,
    Ordinary,
    Shortcode,
    Partial,
}

impl TemplateKind {
    pub fn is_transformable(self) -> bool {
        !matches!(self, TemplateKind::Undefined)
    }

    /// Metadata collected for templates of this kind
    pub fn features(self) -> TransformFeatures {
        match self {
            TemplateKind::Undefined => TransformFeatures::empty(),
            TemplateKind::Ordinary | TemplateKind::Shortcode => {
                TransformFeatures::COLLECT_INNER | TransformFeatures::COLLECT_CONFIG
            }
            TemplateKind::Partial => TransformFeatures::all(),
        }
    }
}

bitflags! {
    /// Collection features enabled for a traversal
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TransformFeatures: u8 {
        const COLLECT_INNER = 0b0001;
        const COLLECT_CONFIG = 0b0010;
        const COLLECT_RETURN = 0b0100;
    }
}

/// Metadata of a transformed template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Info {
    /// The template reads injected inner content
    pub accepts_inner: bool,
    /// The template ends with a top-level `return`
    pub has_explicit_return: bool,
    pub config: Config,
}

/// Accumulates `Info` for one root transformation
#[derive(Debug)]
pub struct InfoCollector {
    features: TransformFeatures,
    info: Info,
}

impl InfoCollector {
    pub fn new(kind: TemplateKind) -> Self {
        InfoCollector {
            features: kind.features(),
            info: Info::default(),
        }
    }

    pub fn features(&self) -> TransformFeatures {
        self.features
    }

    pub fn info(&self) -> &Info {
        &self.info
    }

    /// Look for the inner accessor among `segments[..accessor_end]`.
    /// Segments past `accessor_end` are map keys.
    pub fn observe_chain(&mut self, segments: &[String], accessor_end: usize, inner_accessor: &str) {
        if self.info.accepts_inner || !self.features.contains(TransformFeatures::COLLECT_INNER) {
            return;
        }
        let end = accessor_end.min(segments.len());
        if segments[..end].iter().any(|s| s == inner_accessor) {
            self.info.accepts_inner = true;
        }
    }

    pub fn wants_config(&self) -> bool {
        self.features.contains(TransformFeatures::COLLECT_CONFIG)
    }

    pub fn record_config(&mut self, config: Config) {
        if self.wants_config() {
            self.info.config = config;
        }
    }

    pub fn wants_return(&self) -> bool {
        self.features.contains(TransformFeatures::COLLECT_RETURN)
    }

    pub fn mark_return(&mut self) {
        if self.wants_return() {
            self.info.has_explicit_return = true;
        }
    }

    pub fn finish(self) -> Info {
        self.info
    }
}
