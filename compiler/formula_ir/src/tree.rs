//! Flat formula tree.
//!
//! A formula is stored as an arena of `Node`s. Children are referenced by
//! `NodeId`, and the ordered argument list of a call is a `NodeRange` into
//! a shared argument buffer. Trees are produced by the external parser (or
//! by `TreeBuilder`) and are never mutated afterwards.

use std::fmt;

use crate::{Name, Span};

/// Index of a node in a `FormulaTree`.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// Invalid node ID (sentinel value).
    pub const INVALID: NodeId = NodeId(u32::MAX);

    /// Create a new `NodeId`.
    #[inline]
    pub const fn new(index: u32) -> Self {
        NodeId(index)
    }

    /// Get the index into the arena.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Check if this is a valid ID.
    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != u32::MAX
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "NodeId({})", self.0)
        } else {
            write!(f, "NodeId::INVALID")
        }
    }
}

/// Ordered children of a call node, stored contiguously in the tree's
/// argument buffer.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct NodeRange {
    pub start: u32,
    pub len: u16,
}

impl NodeRange {
    #[inline]
    pub const fn new(start: u32, len: u16) -> Self {
        NodeRange { start, len }
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Literal value written directly in formula text.
///
/// Numbers are stored as `f64` bits so literals stay `Eq + Hash`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Literal {
    Number(u64),
    Str(Name),
    Bool(bool),
}

impl Literal {
    /// Create a number literal.
    #[inline]
    pub fn number(value: f64) -> Self {
        Literal::Number(value.to_bits())
    }

    /// Numeric value, if this is a number literal.
    #[inline]
    pub fn as_number(self) -> Option<f64> {
        match self {
            Literal::Number(bits) => Some(f64::from_bits(bits)),
            _ => None,
        }
    }
}

/// Built-in operator symbols recognized by the formula grammar.
///
/// Operator *semantics* (which formats they accept, what they compute) are
/// owned by the operator library, not by the tree.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
    Neg,
    Not,
    And,
    Or,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl Operator {
    /// Source symbol for diagnostics.
    pub fn as_symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub | Operator::Neg => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::Rem => "%",
            Operator::Pow => "^",
            Operator::Not => "!",
            Operator::And => "&&",
            Operator::Or => "||",
            Operator::Eq => "==",
            Operator::NotEq => "!=",
            Operator::Lt => "<",
            Operator::LtEq => "<=",
            Operator::Gt => ">",
            Operator::GtEq => ">=",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_symbol())
    }
}

/// Node kinds.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum NodeKind {
    /// Literal value.
    Literal(Literal),
    /// Reference to a named variable.
    Variable(Name),
    /// Named function call, `name(args...)`.
    Call { function: Name, args: NodeRange },
    /// Operator application; unary operators have one argument.
    Operator { op: Operator, args: NodeRange },
}

/// A node with its source location.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
}

/// Arena-allocated formula tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormulaTree {
    nodes: Vec<Node>,
    args: Vec<NodeId>,
    root: NodeId,
}

impl FormulaTree {
    pub(crate) fn from_parts(nodes: Vec<Node>, args: Vec<NodeId>, root: NodeId) -> Self {
        FormulaTree { nodes, args, root }
    }

    /// Root node of the formula.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Get a node by ID.
    ///
    /// `None` if `id` was never built into this tree.
    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Ordered children of a call node.
    ///
    /// `None` if `range` does not lie in this tree's argument buffer.
    #[inline]
    pub fn args(&self, range: NodeRange) -> Option<&[NodeId]> {
        let start = range.start as usize;
        self.args.get(start..start + range.len())
    }

    /// Number of nodes in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "tests use unwrap to panic on unexpected state")]
mod tests;
