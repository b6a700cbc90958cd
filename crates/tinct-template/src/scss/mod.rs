//! A minimal tree model for SCSS stylesheet sources.
//!
//! The generator only needs to see rules, declarations, at-rules and comments,
//! so that is all this module models. Selectors, values and at-rule params are
//! kept as raw text (comments removed) and never interpreted.
//!
//! # Example
//!
//! ```rust
//! use tinct_template::scss::{self, Node};
//!
//! let sheet = scss::parse(".popup { color: $fg_color; }").unwrap();
//! match &sheet.nodes[0] {
//!     Node::Rule(rule) => assert_eq!(rule.selector, ".popup"),
//!     other => panic!("unexpected node {:?}", other),
//! }
//! ```

mod parser;

use std::fmt;

pub use parser::parse;

/// A parsed stylesheet: an ordered list of top-level nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stylesheet {
    pub nodes: Vec<Node>,
}

/// One statement or block in a stylesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// `selector { ... }`
    Rule(Rule),
    /// `@name params;` or `@name params { ... }`
    AtRule(AtRule),
    /// `prop: value;`
    Declaration(Declaration),
    /// `/* text */`, with SCSS `//` comments normalized to this form.
    Comment(String),
    /// A statement that is neither a declaration nor an at-rule.
    Raw(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub selector: String,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtRule {
    /// The at-keyword without `@`, e.g. `import`.
    pub name: String,
    pub params: String,
    /// `None` for statement at-rules terminated by `;`.
    pub children: Option<Vec<Node>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub prop: String,
    pub value: String,
}

impl Declaration {
    pub fn new(prop: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            prop: prop.into(),
            value: value.into(),
        }
    }
}

impl Stylesheet {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Inserts a node before all others.
    pub fn prepend(&mut self, node: Node) {
        self.nodes.insert(0, node);
    }

    /// Keeps only the nodes for which `keep` returns true, at every depth.
    ///
    /// Children of a removed node are removed with it and never visited.
    pub fn retain(&mut self, mut keep: impl FnMut(&Node) -> bool) {
        retain_nodes(&mut self.nodes, &mut keep);
    }

    /// Visits every declaration, at every depth, in document order.
    pub fn for_each_declaration_mut(&mut self, mut visit: impl FnMut(&mut Declaration)) {
        visit_declarations(&mut self.nodes, &mut visit);
    }
}

fn retain_nodes(nodes: &mut Vec<Node>, keep: &mut dyn FnMut(&Node) -> bool) {
    nodes.retain(|node| keep(node));
    for node in nodes.iter_mut() {
        if let Some(children) = node.children_mut() {
            retain_nodes(children, keep);
        }
    }
}

fn visit_declarations(nodes: &mut [Node], visit: &mut dyn FnMut(&mut Declaration)) {
    for node in nodes {
        match node {
            Node::Declaration(decl) => visit(decl),
            other => {
                if let Some(children) = other.children_mut() {
                    visit_declarations(children, visit);
                }
            }
        }
    }
}

impl Node {
    pub fn children(&self) -> Option<&[Node]> {
        match self {
            Node::Rule(rule) => Some(&rule.children),
            Node::AtRule(AtRule {
                children: Some(children),
                ..
            }) => Some(children),
            _ => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Rule(rule) => Some(&mut rule.children),
            Node::AtRule(AtRule {
                children: Some(children),
                ..
            }) => Some(children),
            _ => None,
        }
    }
}

impl fmt::Display for Stylesheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_nodes(f, &self.nodes, 0)
    }
}

fn write_nodes(f: &mut fmt::Formatter<'_>, nodes: &[Node], depth: usize) -> fmt::Result {
    let indent = "  ".repeat(depth);
    for node in nodes {
        match node {
            Node::Rule(rule) => {
                writeln!(f, "{}{} {{", indent, rule.selector)?;
                write_nodes(f, &rule.children, depth + 1)?;
                writeln!(f, "{}}}", indent)?;
            }
            Node::AtRule(at) => {
                write!(f, "{}@{}", indent, at.name)?;
                if !at.params.is_empty() {
                    write!(f, " {}", at.params)?;
                }
                match &at.children {
                    Some(children) => {
                        writeln!(f, " {{")?;
                        write_nodes(f, children, depth + 1)?;
                        writeln!(f, "{}}}", indent)?;
                    }
                    None => writeln!(f, ";")?,
                }
            }
            Node::Declaration(decl) => writeln!(f, "{}{}: {};", indent, decl.prop, decl.value)?,
            Node::Comment(text) => writeln!(f, "{}/*{}*/", indent, text)?,
            Node::Raw(text) => writeln!(f, "{}{};", indent, text)?,
        }
    }
    Ok(())
}
