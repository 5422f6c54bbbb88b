//! Template Syntax Tree
//!
//! Arena-indexed node definitions for a parsed template. Every node lives in
//! the owning tree's node vector and is addressed by a `NodeId`; child links
//! are ids, so a pass can hold the tree mutably while it walks it.

use smallvec::SmallVec;

/// Identifier segments of a field chain, in source order
pub type Segments = SmallVec<[String; 4]>;

/// Index of a node inside its `SyntaxTree`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Index of a tree inside a template registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TreeId(pub(crate) usize);

impl TreeId {
    pub(crate) fn new(index: usize) -> Self {
        TreeId(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// Node type union
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    List(ListNode),
    Text(TextNode),
    Comment(CommentNode),
    Action(ActionNode),
    Pipe(PipeNode),
    Command(CommandNode),
    Field(FieldNode),
    Variable(VariableNode),
    Chain(ChainNode),
    Identifier(IdentifierNode),
    Dot,
    Nil,
    Bool(bool),
    Number(NumberNode),
    String(StringNode),
    If(BranchNode),
    With(BranchNode),
    Range(BranchNode),
    Template(TemplateNode),
    Break,
    Continue,
}

impl Node {
    /// Short name of the node type, used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Node::List(_) => "list",
            Node::Text(_) => "text",
            Node::Comment(_) => "comment",
            Node::Action(_) => "action",
            Node::Pipe(_) => "pipe",
            Node::Command(_) => "command",
            Node::Field(_) => "field",
            Node::Variable(_) => "variable",
            Node::Chain(_) => "chain",
            Node::Identifier(_) => "identifier",
            Node::Dot => "dot",
            Node::Nil => "nil",
            Node::Bool(_) => "bool",
            Node::Number(_) => "number",
            Node::String(_) => "string",
            Node::If(_) => "if",
            Node::With(_) => "with",
            Node::Range(_) => "range",
            Node::Template(_) => "template",
            Node::Break => "break",
            Node::Continue => "continue",
        }
    }

    /// Field segments of a field-access node
    pub fn segments(&self) -> Option<&Segments> {
        match self {
            Node::Field(f) => Some(&f.ident),
            Node::Variable(v) => Some(&v.ident),
            Node::Chain(c) => Some(&c.field),
            _ => None,
        }
    }

    pub fn segments_mut(&mut self) -> Option<&mut Segments> {
        match self {
            Node::Field(f) => Some(&mut f.ident),
            Node::Variable(v) => Some(&mut v.ident),
            Node::Chain(c) => Some(&mut c.field),
            _ => None,
        }
    }
}

/// Sequence of nodes
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListNode {
    pub nodes: Vec<NodeId>,
}

/// Plain text outside actions
#[derive(Debug, Clone, PartialEq)]
pub struct TextNode {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommentNode {
    pub text: String,
}

/// `{{ pipeline }}`
#[derive(Debug, Clone, PartialEq)]
pub struct ActionNode {
    pub pipe: NodeId,
}

/// A pipeline with optional variable declarations.
///
/// `decl` holds `Variable` nodes. `is_assign` distinguishes `$x = …` from
/// `$x := …`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PipeNode {
    pub is_assign: bool,
    pub decl: Vec<NodeId>,
    pub cmds: Vec<NodeId>,
}

/// One pipeline stage. A leading `Identifier` argument is a function call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CommandNode {
    pub args: Vec<NodeId>,
}

/// `.A.B` rooted at the current dot
#[derive(Debug, Clone, PartialEq)]
pub struct FieldNode {
    pub ident: Segments,
}

/// `$x.A.B`; `name` includes the leading `$`
#[derive(Debug, Clone, PartialEq)]
pub struct VariableNode {
    pub name: String,
    pub ident: Segments,
}

/// `(pipeline).A.B` or `identifier.A.B`
#[derive(Debug, Clone, PartialEq)]
pub struct ChainNode {
    pub node: NodeId,
    pub field: Segments,
}

/// Function or global accessor name
#[derive(Debug, Clone, PartialEq)]
pub struct IdentifierNode {
    pub ident: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumberNode {
    pub text: String,
}

/// String literal; `quoted` keeps the original quoting, `text` is the value
#[derive(Debug, Clone, PartialEq)]
pub struct StringNode {
    pub quoted: String,
    pub text: String,
}

/// Shared shape of `if`, `with` and `range`
#[derive(Debug, Clone, PartialEq)]
pub struct BranchNode {
    pub pipe: NodeId,
    pub list: NodeId,
    pub else_list: Option<NodeId>,
}

/// `{{ template "name" pipeline }}`
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateNode {
    pub name: String,
    pub pipe: Option<NodeId>,
}

/// A named, parsed template
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxTree {
    pub(crate) name: String,
    pub(crate) nodes: Vec<Node>,
    pub(crate) root: NodeId,
}

impl SyntaxTree {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Root `List` node
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Children of the root list
    pub fn root_nodes(&self) -> &[NodeId] {
        match self.node(self.root) {
            Node::List(list) => &list.nodes,
            _ => &[],
        }
    }

    /// All field-access nodes in arena order
    pub fn field_chains(&self) -> impl Iterator<Item = (NodeId, &Segments)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, node)| node.segments().map(|s| (NodeId(i), s)))
    }
}
