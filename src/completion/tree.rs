//! Parse tree of an already-typed command line
//!
//! Nodes live in an arena owned by [`ParseTree`]; children are owned through
//! the arena and the parent link is a plain [`NodeId`], used only for upward
//! lookups (directive merging, persistent options).

use std::fmt;
use std::sync::Arc;

use crate::spec::{ArgumentSpec, CommandSpec, OptionSpec, ParserDirectives};

/// Index of a node inside its [`ParseTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// How a subcommand node came to be
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// The command being completed
    Root,
    /// A subcommand declared by its parent's spec
    Declared,
    /// A command typed into an argument that accepts a nested command
    NestedCommand,
}

/// What a parse node stands for
#[derive(Debug, Clone)]
pub enum NodeKind {
    Subcommand {
        spec: Arc<CommandSpec>,
        scope: Scope,
    },
    Option {
        spec: Arc<OptionSpec>,
    },
    Argument {
        spec: Arc<ArgumentSpec>,
    },
    /// A token nothing in the spec accounts for
    Unknown,
}

/// One node of the parse tree
#[derive(Debug, Clone)]
pub struct ParseNode {
    kind: NodeKind,
    /// Token text the node was matched from
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl ParseNode {
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Parse tree built for a single completion request
#[derive(Debug, Clone)]
pub struct ParseTree {
    nodes: Vec<ParseNode>,
    /// Node completion of the next token resumes at
    position: NodeId,
}

impl ParseTree {
    /// Create a tree holding only the root command
    pub fn new(command_name: impl Into<String>, spec: Arc<CommandSpec>) -> Self {
        let root = ParseNode {
            kind: NodeKind::Subcommand {
                spec,
                scope: Scope::Root,
            },
            text: command_name.into(),
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: vec![root],
            position: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn position(&self) -> NodeId {
        self.position
    }

    pub(crate) fn set_position(&mut self, id: NodeId) {
        self.position = id;
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &ParseNode {
        &self.nodes[id.0]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn text(&self, id: NodeId) -> &str {
        &self.nodes[id.0].text
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Append a child node, keeping token order
    pub(crate) fn add_child(
        &mut self,
        parent: NodeId,
        kind: NodeKind,
        text: impl Into<String>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(ParseNode {
            kind,
            text: text.into(),
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Nearest subcommand node at or above `id`
    pub fn enclosing_subcommand(&self, id: NodeId) -> NodeId {
        let mut current = id;
        loop {
            if matches!(self.kind(current), NodeKind::Subcommand { .. }) {
                return current;
            }
            match self.parent(current) {
                Some(parent) => current = parent,
                None => return self.root(),
            }
        }
    }

    /// Directives of the enclosing subcommand combined with every ancestor's
    pub fn merged_directives(&self, id: NodeId) -> ParserDirectives {
        let mut merged = ParserDirectives::default();
        let mut current = Some(id);
        while let Some(node) = current {
            if let NodeKind::Subcommand { spec, .. } = self.kind(node) {
                merged.merge(&spec.parser_directives);
            }
            current = self.parent(node);
        }
        merged
    }

    /// Argument specs attached directly under `id`, in token order
    pub fn argument_children(&self, id: NodeId) -> impl Iterator<Item = &Arc<ArgumentSpec>> {
        self.children(id)
            .iter()
            .filter_map(|&child| match self.kind(child) {
                NodeKind::Argument { spec } => Some(spec),
                _ => None,
            })
    }

    /// Option specs attached directly under `id`, in token order
    pub fn option_children(&self, id: NodeId) -> impl Iterator<Item = &Arc<OptionSpec>> {
        self.children(id)
            .iter()
            .filter_map(|&child| match self.kind(child) {
                NodeKind::Option { spec } => Some(spec),
                _ => None,
            })
    }

    /// Indented textual rendering, one node per line
    pub fn dump(&self) -> String {
        self.to_string()
    }

    fn dump_node(&self, id: NodeId, depth: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.kind(id) {
            NodeKind::Subcommand { scope: Scope::NestedCommand, .. } => "command",
            NodeKind::Subcommand { .. } => "subcommand",
            NodeKind::Option { .. } => "option",
            NodeKind::Argument { .. } => "argument",
            NodeKind::Unknown => "unknown",
        };
        let marker = if id == self.position { " <" } else { "" };
        writeln!(
            f,
            "{}{} [{}]{}",
            "  ".repeat(depth),
            self.text(id),
            label,
            marker
        )?;
        for &child in self.children(id) {
            self.dump_node(child, depth + 1, f)?;
        }
        Ok(())
    }
}

impl fmt::Display for ParseTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.dump_node(self.root(), 0, f)
    }
}
