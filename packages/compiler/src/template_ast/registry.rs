//! Template Registry
//!
//! Name resolution for sub-template invocations and the registration batch
//! that must be fully transformed before anything executes.

use std::sync::Arc;

use indexmap::IndexMap;

use super::ast::{SyntaxTree, TreeId};
use crate::error::{BatchError, Result, TransformError};
use crate::transform::{self, Info, TemplateKind, TransformOptions};

/// Resolves template names to trees during transformation
pub trait TreeLookup {
    /// Resolve a named template, possibly defined in another source file
    fn lookup(&self, name: &str) -> Option<TreeId>;

    /// Whether `id` addresses a tree of this registry
    fn contains(&self, id: TreeId) -> bool;

    /// Only called with ids for which `contains` holds
    fn tree(&self, id: TreeId) -> &SyntaxTree;

    fn tree_mut(&mut self, id: TreeId) -> &mut SyntaxTree;
}

/// One registration batch of templates.
///
/// Roots are added with a kind and get transformed by `mark_ready`.
/// Definitions are only reached through `{{ template }}` invocations.
#[derive(Debug, Clone, Default)]
pub struct TemplateSet {
    trees: Vec<SyntaxTree>,
    kinds: Vec<Option<TemplateKind>>,
    index: IndexMap<String, TreeId>,
}

impl TemplateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a root template. A tree with the same name is replaced in place.
    pub fn add(&mut self, tree: SyntaxTree, kind: TemplateKind) -> TreeId {
        let id = self.insert(tree);
        self.kinds[id.0] = Some(kind);
        id
    }

    /// Register a named sub-template. Overrides an earlier tree of the same name.
    pub fn add_definition(&mut self, tree: SyntaxTree) -> TreeId {
        self.insert(tree)
    }

    fn insert(&mut self, tree: SyntaxTree) -> TreeId {
        if let Some(&id) = self.index.get(tree.name()) {
            self.trees[id.0] = tree;
            return id;
        }
        let id = TreeId(self.trees.len());
        self.index.insert(tree.name().to_string(), id);
        self.trees.push(tree);
        self.kinds.push(None);
        id
    }

    pub fn get(&self, name: &str) -> Option<&SyntaxTree> {
        self.index.get(name).map(|id| &self.trees[id.0])
    }

    /// Kind of a root template; `None` for definitions and unknown names
    pub fn kind(&self, name: &str) -> Option<TemplateKind> {
        self.index.get(name).and_then(|id| self.kinds[id.0])
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// Names of registered root templates, in registration order
    pub fn roots(&self) -> impl Iterator<Item = &str> {
        self.index
            .iter()
            .filter(|(_, id)| self.kinds[id.0].is_some())
            .map(|(name, _)| name.as_str())
    }

    /// Transform one root template in place
    pub fn transform(&mut self, name: &str, options: &TransformOptions) -> Result<Info> {
        let (id, kind) = self
            .index
            .get(name)
            .and_then(|&id| self.kinds[id.0].map(|kind| (id, kind)))
            .ok_or_else(|| TransformError::UnknownTemplate {
                name: name.to_string(),
            })?;
        transform::transform(self, id, kind, options)
    }

    /// Transform every root and freeze the batch for execution.
    ///
    /// Fails if any root fails; in that case nothing of the batch is usable.
    pub fn mark_ready(mut self, options: &TransformOptions) -> Result<ReadyTemplates, BatchError> {
        let roots: Vec<(String, TreeId, TemplateKind)> = self
            .index
            .iter()
            .filter_map(|(name, &id)| self.kinds[id.0].map(|kind| (name.clone(), id, kind)))
            .collect();

        let mut infos = IndexMap::with_capacity(roots.len());
        let mut failures = Vec::new();
        for (name, id, kind) in roots {
            match transform::transform(&mut self, id, kind, options) {
                Ok(info) => {
                    infos.insert(name, info);
                }
                Err(err) => {
                    tracing::warn!(template = %name, error = %err, "template failed to transform");
                    failures.push((name, err));
                }
            }
        }

        if !failures.is_empty() {
            return Err(BatchError { failures });
        }

        tracing::debug!(templates = self.trees.len(), roots = infos.len(), "batch ready");
        Ok(ReadyTemplates {
            inner: Arc::new(ReadyInner {
                trees: self.trees,
                index: self.index,
                infos,
            }),
        })
    }
}

impl TreeLookup for TemplateSet {
    fn lookup(&self, name: &str) -> Option<TreeId> {
        self.index.get(name).copied()
    }

    fn contains(&self, id: TreeId) -> bool {
        id.0 < self.trees.len()
    }

    fn tree(&self, id: TreeId) -> &SyntaxTree {
        &self.trees[id.0]
    }

    fn tree_mut(&mut self, id: TreeId) -> &mut SyntaxTree {
        &mut self.trees[id.0]
    }
}

/// A transformed batch, shared read-only across executing threads
#[derive(Debug, Clone)]
pub struct ReadyTemplates {
    inner: Arc<ReadyInner>,
}

#[derive(Debug)]
struct ReadyInner {
    trees: Vec<SyntaxTree>,
    index: IndexMap<String, TreeId>,
    infos: IndexMap<String, Info>,
}

impl ReadyTemplates {
    pub fn get(&self, name: &str) -> Option<&SyntaxTree> {
        self.inner.index.get(name).map(|id| &self.inner.trees[id.0])
    }

    /// Collected metadata of a root template
    pub fn info(&self, name: &str) -> Option<&Info> {
        self.inner.infos.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.inner.index.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.inner.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.trees.is_empty()
    }
}

/// Lookup over a single standalone tree, which can only resolve itself
pub(crate) struct SingleTree<'a> {
    tree: &'a mut SyntaxTree,
}

impl<'a> SingleTree<'a> {
    pub(crate) fn new(tree: &'a mut SyntaxTree) -> Self {
        SingleTree { tree }
    }
}

impl TreeLookup for SingleTree<'_> {
    fn lookup(&self, name: &str) -> Option<TreeId> {
        (self.tree.name() == name).then_some(TreeId(0))
    }

    fn contains(&self, id: TreeId) -> bool {
        id.0 == 0
    }

    fn tree(&self, _id: TreeId) -> &SyntaxTree {
        &*self.tree
    }

    fn tree_mut(&mut self, _id: TreeId) -> &mut SyntaxTree {
        &mut *self.tree
    }
}
