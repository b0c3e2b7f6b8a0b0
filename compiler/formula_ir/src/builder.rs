//! Programmatic construction of formula trees.
//!
//! The formula parser lives outside this workspace; hosts that assemble
//! formulas in code (and every test) build trees through `TreeBuilder`.
//! Children must be built before their parent, which keeps the arena in
//! post-order.
//!
//! Building never fails. Ids the builder never handed out, and nodes past
//! its capacity, leave holes in the finished tree; every pass reports a
//! hole as a configuration error instead of walking into it.

use crate::tree::{FormulaTree, Literal, Node, NodeId, NodeKind, NodeRange, Operator};
use crate::{Span, StringInterner};

/// Builder for `FormulaTree`.
///
/// # Example
///
/// ```
/// use formula_ir::{Operator, StringInterner, TreeBuilder};
///
/// let interner = StringInterner::new();
/// let mut b = TreeBuilder::new(&interner);
/// let strength = b.variable("STR");
/// let two = b.number(2.0);
/// let sum = b.binary(Operator::Add, strength, two);
/// let tree = b.finish(sum);
/// assert_eq!(tree.len(), 3);
/// ```
pub struct TreeBuilder<'a> {
    interner: &'a StringInterner,
    nodes: Vec<Node>,
    args: Vec<NodeId>,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(interner: &'a StringInterner) -> Self {
        TreeBuilder {
            interner,
            nodes: Vec::new(),
            args: Vec::new(),
        }
    }

    /// Number literal.
    pub fn number(&mut self, value: f64) -> NodeId {
        self.push(NodeKind::Literal(Literal::number(value)))
    }

    /// String literal.
    pub fn string(&mut self, value: &str) -> NodeId {
        let Ok(name) = self.interner.try_intern(value) else {
            return NodeId::INVALID;
        };
        self.push(NodeKind::Literal(Literal::Str(name)))
    }

    /// Boolean literal.
    pub fn boolean(&mut self, value: bool) -> NodeId {
        self.push(NodeKind::Literal(Literal::Bool(value)))
    }

    /// Variable reference.
    pub fn variable(&mut self, name: &str) -> NodeId {
        let Ok(name) = self.interner.try_intern(name) else {
            return NodeId::INVALID;
        };
        self.push(NodeKind::Variable(name))
    }

    /// Named function call.
    pub fn call(&mut self, function: &str, args: &[NodeId]) -> NodeId {
        let Ok(function) = self.interner.try_intern(function) else {
            return NodeId::INVALID;
        };
        let args = self.push_args(args);
        self.push(NodeKind::Call { function, args })
    }

    /// Operator applied to any number of operands.
    pub fn operator(&mut self, op: Operator, args: &[NodeId]) -> NodeId {
        let args = self.push_args(args);
        self.push(NodeKind::Operator { op, args })
    }

    /// Binary operator.
    pub fn binary(&mut self, op: Operator, left: NodeId, right: NodeId) -> NodeId {
        self.operator(op, &[left, right])
    }

    /// Prefix operator.
    pub fn unary(&mut self, op: Operator, operand: NodeId) -> NodeId {
        self.operator(op, &[operand])
    }

    /// Attach a source span to an already-built node.
    pub fn set_span(&mut self, id: NodeId, span: Span) {
        if let Some(node) = self.nodes.get_mut(id.index()) {
            node.span = span;
        }
    }

    /// Finish the tree with the given root.
    pub fn finish(self, root: NodeId) -> FormulaTree {
        FormulaTree::from_parts(self.nodes, self.args, root)
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let index = match u32::try_from(self.nodes.len()) {
            Ok(index) if index != u32::MAX => index,
            _ => return NodeId::INVALID,
        };
        self.nodes.push(Node {
            kind,
            span: Span::DUMMY,
        });
        NodeId::new(index)
    }

    /// Store `args` contiguously. A list that does not fit gets a range
    /// past the end of the buffer.
    fn push_args(&mut self, args: &[NodeId]) -> NodeRange {
        match (u32::try_from(self.args.len()), u16::try_from(args.len())) {
            (Ok(start), Ok(len)) => {
                self.args.extend_from_slice(args);
                NodeRange::new(start, len)
            }
            _ => NodeRange::new(u32::MAX, u16::MAX),
        }
    }
}
