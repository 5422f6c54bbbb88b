//! Tree Builder
//!
//! Construction helpers for `SyntaxTree`. Parsers and tests allocate nodes
//! bottom-up and finish with the root list.

use super::ast::*;

/// Allocates nodes into a fresh arena
#[derive(Debug)]
pub struct TreeBuilder {
    name: String,
    nodes: Vec<Node>,
}

impl TreeBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        TreeBuilder {
            name: name.into(),
            nodes: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(Node::Text(TextNode { text: text.into() }))
    }

    pub fn comment(&mut self, text: impl Into<String>) -> NodeId {
        self.push(Node::Comment(CommentNode { text: text.into() }))
    }

    /// `.A.B`; a bare `.` yields a `Dot` node
    pub fn field(&mut self, path: &str) -> NodeId {
        let ident = split_segments(path);
        if ident.is_empty() {
            return self.dot();
        }
        self.push(Node::Field(FieldNode { ident }))
    }

    /// `$x.A.B`
    pub fn variable(&mut self, path: &str) -> NodeId {
        let (name, rest) = match path.find('.') {
            Some(pos) => (&path[..pos], &path[pos..]),
            None => (path, ""),
        };
        self.push(Node::Variable(VariableNode {
            name: name.to_string(),
            ident: split_segments(rest),
        }))
    }

    /// `node.A.B` where `node` is an identifier or a pipeline
    pub fn chain(&mut self, node: NodeId, path: &str) -> NodeId {
        self.push(Node::Chain(ChainNode {
            node,
            field: split_segments(path),
        }))
    }

    pub fn identifier(&mut self, ident: impl Into<String>) -> NodeId {
        self.push(Node::Identifier(IdentifierNode {
            ident: ident.into(),
        }))
    }

    pub fn dot(&mut self) -> NodeId {
        self.push(Node::Dot)
    }

    pub fn nil(&mut self) -> NodeId {
        self.push(Node::Nil)
    }

    pub fn bool(&mut self, value: bool) -> NodeId {
        self.push(Node::Bool(value))
    }

    pub fn number(&mut self, text: impl Into<String>) -> NodeId {
        self.push(Node::Number(NumberNode { text: text.into() }))
    }

    /// Interpreted string literal
    pub fn string(&mut self, text: impl Into<String>) -> NodeId {
        let text = text.into();
        self.push(Node::String(StringNode {
            quoted: format!("{:?}", text),
            text,
        }))
    }

    /// Raw (backquoted) string literal
    pub fn raw_string(&mut self, text: impl Into<String>) -> NodeId {
        let text = text.into();
        self.push(Node::String(StringNode {
            quoted: format!("`{}`", text),
            text,
        }))
    }

    pub fn command(&mut self, args: Vec<NodeId>) -> NodeId {
        self.push(Node::Command(CommandNode { args }))
    }

    pub fn pipe(&mut self, cmds: Vec<NodeId>) -> NodeId {
        self.push(Node::Pipe(PipeNode {
            is_assign: false,
            decl: Vec::new(),
            cmds,
        }))
    }

    /// `$a, $b := cmds`
    pub fn decl_pipe(&mut self, vars: &[&str], cmds: Vec<NodeId>) -> NodeId {
        let decl = vars.iter().map(|v| self.variable(v)).collect();
        self.push(Node::Pipe(PipeNode {
            is_assign: false,
            decl,
            cmds,
        }))
    }

    /// `$a = cmds`
    pub fn assign_pipe(&mut self, vars: &[&str], cmds: Vec<NodeId>) -> NodeId {
        let decl = vars.iter().map(|v| self.variable(v)).collect();
        self.push(Node::Pipe(PipeNode {
            is_assign: true,
            decl,
            cmds,
        }))
    }

    /// Single-command pipeline around one operand
    pub fn expr_pipe(&mut self, arg: NodeId) -> NodeId {
        let cmd = self.command(vec![arg]);
        self.pipe(vec![cmd])
    }

    pub fn action(&mut self, pipe: NodeId) -> NodeId {
        self.push(Node::Action(ActionNode { pipe }))
    }

    /// `{{ arg }}`
    pub fn action_expr(&mut self, arg: NodeId) -> NodeId {
        let pipe = self.expr_pipe(arg);
        self.action(pipe)
    }

    pub fn list(&mut self, nodes: Vec<NodeId>) -> NodeId {
        self.push(Node::List(ListNode { nodes }))
    }

    pub fn if_(&mut self, pipe: NodeId, list: NodeId, else_list: Option<NodeId>) -> NodeId {
        self.push(Node::If(BranchNode {
            pipe,
            list,
            else_list,
        }))
    }

    pub fn with_(&mut self, pipe: NodeId, list: NodeId, else_list: Option<NodeId>) -> NodeId {
        self.push(Node::With(BranchNode {
            pipe,
            list,
            else_list,
        }))
    }

    pub fn range(&mut self, pipe: NodeId, list: NodeId, else_list: Option<NodeId>) -> NodeId {
        self.push(Node::Range(BranchNode {
            pipe,
            list,
            else_list,
        }))
    }

    pub fn template(&mut self, name: impl Into<String>, pipe: Option<NodeId>) -> NodeId {
        self.push(Node::Template(TemplateNode {
            name: name.into(),
            pipe,
        }))
    }

    pub fn break_(&mut self) -> NodeId {
        self.push(Node::Break)
    }

    pub fn continue_(&mut self) -> NodeId {
        self.push(Node::Continue)
    }

    /// Wrap `root_nodes` in the root list and produce the tree
    pub fn finish(mut self, root_nodes: Vec<NodeId>) -> SyntaxTree {
        let root = self.list(root_nodes);
        SyntaxTree {
            name: self.name,
            nodes: self.nodes,
            root,
        }
    }
}

fn split_segments(path: &str) -> Segments {
    path.split('.')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
