//! Formula IR - tree and identifier types for the formula engine.
//!
//! This crate contains the data structures every formula pass consumes:
//! - `Name` handles for interned identifiers (variables, functions, formats)
//! - `Span` source locations reported by the external parser
//! - `FormulaTree`, a flat arena of literal, variable, function-call and
//!   operator nodes addressed by `NodeId`
//! - `TreeBuilder`, the programmatic construction surface used in place of
//!   a parser
//!
//! # Design Philosophy
//!
//! - **Intern names**: identifiers are `Name(u32)` for O(1) equality
//! - **Flat trees**: no `Box<Node>`, children are `NodeId` indices
//! - **Read-only after construction**: a `FormulaTree` is never mutated by
//!   a pass, so the same tree can be walked by every pass and every thread

mod builder;
mod interner;
mod name;
mod span;
mod tree;

pub use builder::TreeBuilder;
pub use interner::{InternError, SharedInterner, StringInterner};
pub use name::Name;
pub use span::Span;
pub use tree::{FormulaTree, Literal, Node, NodeId, NodeKind, NodeRange, Operator};
