/**
 * Template Serializer
 *
 * Renders a syntax tree back to template source
 */
use super::ast::*;

/// Serialize a tree to template source
pub fn serialize(tree: &SyntaxTree) -> String {
    serialize_node(tree, tree.root())
}

/// Serialize the subtree rooted at `id`
pub fn serialize_node(tree: &SyntaxTree, id: NodeId) -> String {
    let mut visitor = SerializeTemplateVisitor {
        tree,
        out: String::new(),
    };
    visitor.visit(id);
    visitor.out
}

struct SerializeTemplateVisitor<'a> {
    tree: &'a SyntaxTree,
    out: String,
}

impl SerializeTemplateVisitor<'_> {
    fn visit(&mut self, id: NodeId) {
        let tree = self.tree;
        match tree.node(id) {
            Node::List(list) => {
                for &child in &list.nodes {
                    self.visit(child);
                }
            }
            Node::Text(text) => self.out.push_str(&text.text),
            Node::Comment(comment) => {
                self.out.push_str("{{/*");
                self.out.push_str(&comment.text);
                self.out.push_str("*/}}");
            }
            Node::Action(action) => {
                self.out.push_str("{{");
                self.visit(action.pipe);
                self.out.push_str("}}");
            }
            Node::Pipe(pipe) => self.visit_pipe(pipe),
            Node::Command(cmd) => self.visit_command(cmd),
            Node::Field(field) => push_segments(&mut self.out, &field.ident),
            Node::Variable(var) => {
                self.out.push_str(&var.name);
                push_segments(&mut self.out, &var.ident);
            }
            Node::Chain(chain) => {
                if matches!(tree.node(chain.node), Node::Pipe(_)) {
                    self.out.push('(');
                    self.visit(chain.node);
                    self.out.push(')');
                } else {
                    self.visit(chain.node);
                }
                push_segments(&mut self.out, &chain.field);
            }
            Node::Identifier(ident) => self.out.push_str(&ident.ident),
            Node::Dot => self.out.push('.'),
            Node::Nil => self.out.push_str("nil"),
            Node::Bool(value) => self.out.push_str(if *value { "true" } else { "false" }),
            Node::Number(number) => self.out.push_str(&number.text),
            Node::String(string) => self.out.push_str(&string.quoted),
            Node::If(branch) => self.visit_branch("if", branch),
            Node::With(branch) => self.visit_branch("with", branch),
            Node::Range(branch) => self.visit_branch("range", branch),
            Node::Template(template) => {
                self.out.push_str("{{template ");
                self.out.push_str(&format!("{:?}", template.name));
                if let Some(pipe) = template.pipe {
                    self.out.push(' ');
                    self.visit(pipe);
                }
                self.out.push_str("}}");
            }
            Node::Break => self.out.push_str("{{break}}"),
            Node::Continue => self.out.push_str("{{continue}}"),
        }
    }

    fn visit_pipe(&mut self, pipe: &PipeNode) {
        if !pipe.decl.is_empty() {
            for (i, &var) in pipe.decl.iter().enumerate() {
                if i > 0 {
                    self.out.push_str(", ");
                }
                self.visit(var);
            }
            self.out.push_str(if pipe.is_assign { " = " } else { " := " });
        }
        for (i, &cmd) in pipe.cmds.iter().enumerate() {
            if i > 0 {
                self.out.push_str(" | ");
            }
            self.visit(cmd);
        }
    }

    fn visit_command(&mut self, cmd: &CommandNode) {
        for (i, &arg) in cmd.args.iter().enumerate() {
            if i > 0 {
                self.out.push(' ');
            }
            if matches!(self.tree.node(arg), Node::Pipe(_)) {
                self.out.push('(');
                self.visit(arg);
                self.out.push(')');
            } else {
                self.visit(arg);
            }
        }
    }

    fn visit_branch(&mut self, keyword: &str, branch: &BranchNode) {
        self.out.push_str("{{");
        self.out.push_str(keyword);
        self.out.push(' ');
        self.visit(branch.pipe);
        self.out.push_str("}}");
        self.visit(branch.list);
        if let Some(else_list) = branch.else_list {
            self.out.push_str("{{else}}");
            self.visit(else_list);
        }
        self.out.push_str("{{end}}");
    }
}

fn push_segments(out: &mut String, segments: &Segments) {
    for segment in segments {
        out.push('.');
        out.push_str(segment);
    }
}
