//! Tree Walker
//!
//! Single depth-first pass that lowercases parameter keys in place, tracks
//! declarations and follows `{{ template }}` invocations into the trees they
//! name. Invoked trees are queued and walked after the current one, so the
//! call stack does not grow with the length of an invocation chain. Each
//! reachable tree is walked at most once per root run.

use std::collections::{HashSet, VecDeque};

use tracing::{debug, instrument, trace};

use super::config;
use super::info::{Info, InfoCollector, TemplateKind};
use super::options::{TransformOptions, DEFAULT_OPTIONS};
use super::provenance::{normalize, ChainClassifier, ChainRoot, Provenance};
use super::scope::ScopeStack;
use crate::error::{Result, TransformError};
use crate::template_ast::registry::SingleTree;
use crate::template_ast::{Node, NodeId, PipeNode, SyntaxTree, TemplateNode, TreeId, TreeLookup};

/// Transform the tree `root` and everything it invokes.
///
/// Mutates the trees in place and returns the metadata of `root`.
#[instrument(level = "debug", skip(lookup, options))]
pub fn transform<L>(
    lookup: &mut L,
    root: TreeId,
    kind: TemplateKind,
    options: &TransformOptions,
) -> Result<Info>
where
    L: TreeLookup + ?Sized,
{
    if !lookup.contains(root) {
        return Err(TransformError::UnknownTemplate {
            name: format!("#{}", root.index()),
        });
    }
    let name = lookup.tree(root).name().to_string();
    if !kind.is_transformable() {
        return Err(TransformError::UnsupportedKind {
            template: name,
            kind,
        });
    }

    let mut ctx = TransformContext::new(lookup, root, kind, options);
    ctx.scheduled.insert(name.clone());
    ctx.walk_root()?;
    while let Some((tree, dot)) = ctx.pending.pop_front() {
        ctx.tree = tree;
        ctx.scopes = ScopeStack::new(dot);
        ctx.walk_root()?;
    }

    debug!(
        template = %name,
        rewritten = ctx.rewritten,
        subtemplates = ctx.scheduled.len() - 1,
        "transformed"
    );
    Ok(ctx.collector.finish())
}

/// Transform a standalone tree with the default options
pub fn transform_tree(tree: &mut SyntaxTree, kind: TemplateKind) -> Result<Info> {
    let mut single = SingleTree::new(tree);
    transform(&mut single, TreeId::new(0), kind, &DEFAULT_OPTIONS)
}

/// How declarations in a pipeline receive their values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeclMode {
    /// `$x := pipeline`
    Value,
    /// `range $i, $e := pipeline`
    RangeElements,
}

/// State of one root transformation
struct TransformContext<'a, L: ?Sized> {
    lookup: &'a mut L,
    options: &'a TransformOptions,
    classifier: ChainClassifier<'a>,
    /// Names of every tree queued or walked in this run, the root included
    scheduled: HashSet<String>,
    /// Invoked trees waiting to be walked, with the provenance of their dot
    pending: VecDeque<(TreeId, Provenance)>,
    collector: InfoCollector,
    root_tree: TreeId,
    tree: TreeId,
    scopes: ScopeStack,
    rewritten: usize,
}

impl<'a, L> TransformContext<'a, L>
where
    L: TreeLookup + ?Sized,
{
    fn new(lookup: &'a mut L, root: TreeId, kind: TemplateKind, options: &'a TransformOptions) -> Self {
        TransformContext {
            lookup,
            options,
            classifier: ChainClassifier::new(options),
            scheduled: HashSet::new(),
            pending: VecDeque::new(),
            collector: InfoCollector::new(kind),
            root_tree: root,
            tree: root,
            scopes: ScopeStack::new(Provenance::None),
            rewritten: 0,
        }
    }

    fn current(&self) -> &SyntaxTree {
        self.lookup.tree(self.tree)
    }

    fn node(&self, id: NodeId) -> Node {
        self.current().node(id).clone()
    }

    /// Run `f` inside a fresh scope; the scope is left on every path
    fn scoped<T>(
        &mut self,
        dot: Option<Provenance>,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        match dot {
            Some(dot) => self.scopes.enter_scope_with_dot(dot),
            None => self.scopes.enter_scope(),
        }
        let result = f(self);
        self.scopes.leave_scope();
        result
    }

    fn walk_root(&mut self) -> Result<()> {
        let root = self.current().root();
        let children = self.current().root_nodes().to_vec();
        if self.tree == self.root_tree && self.collector.wants_return() {
            for &child in &children {
                if self.is_return_action(child) {
                    self.collector.mark_return();
                }
            }
        }
        trace!(template = %self.current().name(), root = root.index(), "walking");
        for child in children {
            self.walk(child)?;
        }
        Ok(())
    }

    fn walk(&mut self, id: NodeId) -> Result<()> {
        match self.node(id) {
            Node::List(list) => {
                for child in list.nodes {
                    self.walk(child)?;
                }
                Ok(())
            }
            Node::Action(action) => self.walk_pipe(action.pipe, DeclMode::Value).map(drop),
            Node::Pipe(_) => self.walk_pipe(id, DeclMode::Value).map(drop),
            Node::Command(_) => self.walk_command(id).map(drop),
            Node::Field(_) | Node::Variable(_) | Node::Chain(_) => self.walk_operand(id).map(drop),
            Node::If(branch) => self.scoped(None, |ctx| {
                ctx.walk_pipe(branch.pipe, DeclMode::Value)?;
                ctx.scoped(None, |ctx| ctx.walk(branch.list))?;
                match branch.else_list {
                    Some(else_list) => ctx.scoped(None, |ctx| ctx.walk(else_list)),
                    None => Ok(()),
                }
            }),
            Node::With(branch) => self.scoped(None, |ctx| {
                let value = ctx.walk_pipe(branch.pipe, DeclMode::Value)?;
                ctx.scoped(Some(value), |ctx| ctx.walk(branch.list))?;
                match branch.else_list {
                    Some(else_list) => ctx.scoped(None, |ctx| ctx.walk(else_list)),
                    None => Ok(()),
                }
            }),
            Node::Range(branch) => self.scoped(None, |ctx| {
                let value = ctx.walk_pipe(branch.pipe, DeclMode::RangeElements)?;
                ctx.scoped(Some(value.element()), |ctx| ctx.walk(branch.list))?;
                match branch.else_list {
                    Some(else_list) => ctx.scoped(None, |ctx| ctx.walk(else_list)),
                    None => Ok(()),
                }
            }),
            Node::Template(template) => self.walk_template(template),
            Node::Text(_)
            | Node::Comment(_)
            | Node::Identifier(_)
            | Node::Dot
            | Node::Nil
            | Node::Bool(_)
            | Node::Number(_)
            | Node::String(_)
            | Node::Break
            | Node::Continue => Ok(()),
        }
    }

    /// Walk a pipeline and bind its declarations; returns the provenance of its value
    fn walk_pipe(&mut self, id: NodeId, mode: DeclMode) -> Result<Provenance> {
        let pipe = match self.node(id) {
            Node::Pipe(pipe) => pipe,
            _ => return self.walk_operand(id),
        };

        let mut value = Provenance::None;
        for &cmd in &pipe.cmds {
            let provenance = self.walk_command(cmd)?;
            if pipe.cmds.len() == 1 {
                value = provenance;
            }
        }

        if !pipe.decl.is_empty() {
            self.collect_config(&pipe)?;
            self.declare(&pipe, value, mode);
        }
        Ok(value)
    }

    fn declare(&mut self, pipe: &PipeNode, value: Provenance, mode: DeclMode) {
        let names: Vec<String> = pipe
            .decl
            .iter()
            .filter_map(|&var| match self.current().node(var) {
                Node::Variable(v) => Some(v.name.clone()),
                _ => None,
            })
            .collect();

        let bindings: Vec<(&String, Provenance)> = match (mode, names.as_slice()) {
            (DeclMode::RangeElements, [elem]) => vec![(elem, value.element())],
            (DeclMode::RangeElements, [key, elem]) => {
                vec![(key, Provenance::None), (elem, value.element())]
            }
            _ => names.iter().map(|name| (name, value)).collect(),
        };

        for (name, provenance) in bindings {
            if pipe.is_assign {
                self.scopes.assign(name, provenance);
            } else {
                self.scopes.bind(name, provenance);
            }
        }
    }

    /// Provenance of a command is defined only for a single operand
    fn walk_command(&mut self, id: NodeId) -> Result<Provenance> {
        let cmd = match self.node(id) {
            Node::Command(cmd) => cmd,
            _ => return self.walk_operand(id),
        };

        let mut value = Provenance::None;
        for &arg in &cmd.args {
            let provenance = self.walk_operand(arg)?;
            if cmd.args.len() == 1 {
                value = provenance;
            }
        }
        Ok(value)
    }

    fn walk_operand(&mut self, id: NodeId) -> Result<Provenance> {
        match self.node(id) {
            Node::Field(_) => self.rewrite_chain(id, ChainRoot::Dot),
            Node::Variable(var) => self.rewrite_chain(id, ChainRoot::Variable(&var.name)),
            Node::Chain(chain) => match self.node(chain.node) {
                Node::Identifier(ident) => self.rewrite_chain(id, ChainRoot::Global(&ident.ident)),
                _ => {
                    let inner = self.walk_pipe(chain.node, DeclMode::Value)?;
                    self.rewrite_chain(id, ChainRoot::Expr(inner))
                }
            },
            Node::Pipe(_) => self.walk_pipe(id, DeclMode::Value),
            Node::Dot => Ok(self.scopes.current_dot()),
            Node::Identifier(_)
            | Node::Nil
            | Node::Bool(_)
            | Node::Number(_)
            | Node::String(_) => Ok(Provenance::None),
            _ => self.walk(id).map(|_| Provenance::None),
        }
    }

    /// Classify a field chain, lowercase its keys if needed and return the
    /// provenance of the value it reaches
    fn rewrite_chain(&mut self, id: NodeId, root: ChainRoot<'_>) -> Result<Provenance> {
        let segments: Vec<String> = match self.current().node(id).segments() {
            Some(segments) => segments.to_vec(),
            None => return Ok(Provenance::None),
        };
        let provenance = self.classifier.classify(root, &segments, &self.scopes);

        let accessor_end = match provenance {
            Provenance::ParamsChain { at } => at,
            _ => segments.len(),
        };
        self.collector
            .observe_chain(&segments, accessor_end, &self.options.inner_accessor);

        if let Provenance::ParamsChain { at } = provenance {
            let tree = self.tree;
            if let Some(stored) = self.lookup.tree_mut(tree).node_mut(id).segments_mut() {
                let changed = normalize(stored, at);
                if changed > 0 {
                    trace!(node = id.index(), from = at, changed, "lowercased params keys");
                    self.rewritten += changed;
                }
            }
        }

        Ok(provenance.rebase(segments.len()))
    }

    fn collect_config(&mut self, pipe: &PipeNode) -> Result<()> {
        if !self.collector.wants_config()
            || pipe.is_assign
            || pipe.decl.len() != 1
            || pipe.cmds.len() != 1
        {
            return Ok(());
        }
        match self.current().node(pipe.decl[0]) {
            Node::Variable(var) if var.name == self.options.config_variable && var.ident.is_empty() => {}
            _ => return Ok(()),
        }
        let literal = match self.current().node(pipe.cmds[0]) {
            Node::Command(cmd) if cmd.args.len() == 1 => match self.current().node(cmd.args[0]) {
                Node::String(s) => s.text.clone(),
                _ => return Ok(()),
            },
            _ => return Ok(()),
        };

        let config = config::decode(&literal).map_err(|source| TransformError::Config {
            template: self.current().name().to_string(),
            variable: self.options.config_variable.clone(),
            source,
        })?;
        debug!(version = config.version, "inline config");
        self.collector.record_config(config);
        Ok(())
    }

    /// `{{ return X }}` as a direct child of the root body
    fn is_return_action(&self, id: NodeId) -> bool {
        let tree = self.current();
        let pipe = match tree.node(id) {
            Node::Action(action) => action.pipe,
            _ => return false,
        };
        let first_cmd = match tree.node(pipe) {
            Node::Pipe(pipe) if pipe.decl.is_empty() => match pipe.cmds.first() {
                Some(&cmd) => cmd,
                None => return false,
            },
            _ => return false,
        };
        match tree.node(first_cmd) {
            Node::Command(cmd) if cmd.args.len() >= 2 => matches!(
                tree.node(cmd.args[0]),
                Node::Identifier(ident) if ident.ident == self.options.return_function
            ),
            _ => false,
        }
    }

    fn walk_template(&mut self, template: TemplateNode) -> Result<()> {
        let dot = match template.pipe {
            Some(pipe) => self.walk_pipe(pipe, DeclMode::Value)?,
            None => Provenance::None,
        };

        let target = match self.lookup.lookup(&template.name) {
            Some(target) if self.lookup.contains(target) => target,
            _ => {
                return Err(TransformError::TemplateNotFound {
                    name: template.name,
                    referenced_from: self.current().name().to_string(),
                })
            }
        };
        let target_name = self.lookup.tree(target).name().to_string();

        if !self.scheduled.insert(target_name.clone()) {
            debug!(template = %target_name, "already scheduled, not re-entering");
            return Ok(());
        }
        trace!(template = %target_name, "queued");
        self.pending.push_back((target, dot));
        Ok(())
    }
}
