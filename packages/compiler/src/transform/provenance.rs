//! Chain Classifier
//!
//! Decides whether a field chain addresses a case-folded parameter map, and
//! from which segment on its keys must be lowercased.

use serde::Serialize;

use super::options::TransformOptions;
use super::scope::ScopeStack;

/// Where a value or chain comes from, as far as key casing is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Provenance {
    /// No rewrite applies
    #[default]
    None,
    /// Segments from index `at` onward are keys of a case-folded map
    ParamsChain { at: usize },
    /// Inside user data, where keys keep their casing
    DataTree,
}

impl Provenance {
    pub fn is_params(self) -> bool {
        matches!(self, Provenance::ParamsChain { .. })
    }

    /// Provenance of the value reached after `consumed` segments
    pub fn rebase(self, consumed: usize) -> Provenance {
        match self {
            Provenance::ParamsChain { at } => Provenance::ParamsChain {
                at: at.saturating_sub(consumed),
            },
            other => other,
        }
    }

    /// Provenance of the elements when ranging over a value
    pub fn element(self) -> Provenance {
        match self {
            Provenance::ParamsChain { .. } => Provenance::ParamsChain { at: 0 },
            other => other,
        }
    }
}

/// What a field chain hangs off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainRoot<'a> {
    /// `.A.B`
    Dot,
    /// `$x.A.B`
    Variable(&'a str),
    /// `site.A.B`
    Global(&'a str),
    /// `(pipeline).A.B`, carrying the pipeline's provenance
    Expr(Provenance),
}

/// Classifies field chains against the live scope
#[derive(Debug, Clone, Copy)]
pub struct ChainClassifier<'a> {
    options: &'a TransformOptions,
}

impl<'a> ChainClassifier<'a> {
    pub fn new(options: &'a TransformOptions) -> Self {
        ChainClassifier { options }
    }

    pub fn classify(&self, root: ChainRoot<'_>, segments: &[String], scope: &ScopeStack) -> Provenance {
        let inherited = match root {
            ChainRoot::Dot => scope.current_dot(),
            ChainRoot::Variable(name) => scope.lookup(name),
            ChainRoot::Expr(provenance) => provenance,
            ChainRoot::Global(name) if !self.options.is_global_accessor(name) => {
                return Provenance::None;
            }
            ChainRoot::Global(_) => Provenance::None,
        };

        match inherited {
            Provenance::None => self.scan(segments),
            other => other,
        }
    }

    /// Find the marker in a chain without inherited provenance
    pub fn scan(&self, segments: &[String]) -> Provenance {
        for (i, segment) in segments.iter().enumerate() {
            if self.options.is_data_container(segment) {
                return Provenance::DataTree;
            }
            if self.options.is_params_marker(segment) {
                return Provenance::ParamsChain { at: i + 1 };
            }
        }
        Provenance::None
    }
}

/// Lowercase every segment from `at` onward; returns how many changed
pub fn normalize(segments: &mut [String], at: usize) -> usize {
    let mut changed = 0;
    for segment in segments.iter_mut().skip(at) {
        let lowered = segment.to_lowercase();
        if lowered != *segment {
            *segment = lowered;
            changed += 1;
        }
    }
    changed
}
