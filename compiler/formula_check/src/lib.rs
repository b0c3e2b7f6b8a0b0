//! Semantics pass.
//!
//! Walks a formula tree bottom-up and computes the format of every node
//! against a legal scope. A formula that passes is safe to analyze for
//! dependencies and to evaluate.
//!
//! # Format assertions
//!
//! The manager's `ASSERTED` key carries the format the current node must
//! produce. The caller may assert a root format; calls assert the format
//! every overload agrees on for each argument position before visiting the
//! argument. A node whose format differs from its assertion is an error.
//!
//! # Unknown formats
//!
//! A node beneath which an error was already reported has no known
//! format. Unknown formats never produce further errors, so each defect is
//! reported once.

mod error;

pub use error::SemanticsError;

use std::fmt::Debug;
use std::hash::Hash;

use formula_context::keys::ASSERTED;
use formula_context::{FormulaManager, SemanticsManager};
use formula_ir::{FormulaTree, Literal, NodeId, NodeKind, Span};
use formula_library::{CallError, Library};
use formula_scope::{LegalScope, ResolveError};
use formula_stack::{ensure_sufficient_stack, DepthGuard};
use formula_types::{ConfigError, Format};

/// Compute the format of `tree` in the manager's scope.
///
/// Returns every error found, in visit order, if the formula is unsafe.
#[tracing::instrument(level = "debug", skip_all, fields(nodes = tree.len()))]
pub fn run_semantics(
    manager: &SemanticsManager,
    tree: &FormulaTree,
) -> Result<Format, Vec<SemanticsError>> {
    let fm = manager
        .formula_manager()
        .map_err(|e| vec![SemanticsError::Config(e)])?;
    let scope = manager.scope().map_err(|e| vec![SemanticsError::Config(e)])?;

    let mut checker = Checker {
        fm: &fm,
        scope: &scope,
        tree,
        guard: DepthGuard::new(fm.config().max_tree_depth),
        errors: Vec::new(),
    };
    let format = checker.check(manager, tree.root());

    match format {
        Some(format) if checker.errors.is_empty() => {
            tracing::debug!(%format, "formula checked");
            Ok(format)
        }
        _ => {
            tracing::debug!(errors = checker.errors.len(), "formula rejected");
            Err(checker.errors)
        }
    }
}

struct Checker<'a> {
    fm: &'a FormulaManager,
    scope: &'a LegalScope,
    tree: &'a FormulaTree,
    guard: DepthGuard,
    errors: Vec<SemanticsError>,
}

impl Checker<'_> {
    /// Format of `id`, or `None` if an error beneath it was reported.
    #[tracing::instrument(level = "trace", skip(self, manager))]
    fn check(&mut self, manager: &SemanticsManager, id: NodeId) -> Option<Format> {
        ensure_sufficient_stack(|| self.check_inner(manager, id))
    }

    fn check_inner(&mut self, manager: &SemanticsManager, id: NodeId) -> Option<Format> {
        let (fm, tree) = (self.fm, self.tree);
        let Some(&node) = tree.node(id) else {
            return self.malformed(id);
        };

        if let Err(exceeded) = self.guard.enter() {
            self.errors.push(SemanticsError::NestingTooDeep {
                limit: exceeded.limit,
                span: node.span,
            });
            return None;
        }
        let computed = match node.kind {
            NodeKind::Literal(literal) => Some(literal_format(literal)),
            NodeKind::Variable(name) => self.check_variable(name, node.span),
            NodeKind::Call { function, args } => match tree.args(args) {
                None => self.malformed(id),
                Some(args) => {
                    let callee = fm.interner().lookup(function);
                    if fm.functions().contains(function) {
                        self.check_call(manager, fm.functions(), function, callee, args, node.span)
                    } else {
                        self.errors.push(SemanticsError::UnknownFunction {
                            name: callee.to_owned(),
                            span: node.span,
                        });
                        self.check_unconstrained(manager, args);
                        None
                    }
                }
            },
            NodeKind::Operator { op, args } => match tree.args(args) {
                None => self.malformed(id),
                Some(args) => {
                    if fm.operators().contains(op) {
                        self.check_call(
                            manager,
                            fm.operators(),
                            op,
                            op.as_symbol(),
                            args,
                            node.span,
                        )
                    } else {
                        self.errors.push(SemanticsError::UnknownOperator {
                            op,
                            span: node.span,
                        });
                        self.check_unconstrained(manager, args);
                        None
                    }
                }
            },
        };
        self.guard.exit();

        let computed = computed?;
        self.check_asserted(manager, id, computed, node.span)
    }

    fn malformed(&mut self, id: NodeId) -> Option<Format> {
        self.errors
            .push(SemanticsError::Config(ConfigError::MalformedTree { node: id }));
        None
    }

    fn check_variable(&mut self, name: formula_ir::Name, span: Span) -> Option<Format> {
        match self.fm.resolve_in_scope(self.scope, name) {
            Ok((_, format)) => Some(format),
            Err(ResolveError::Undeclared { name, scope }) => {
                self.errors
                    .push(SemanticsError::UnresolvedVariable { name, scope, span });
                None
            }
            Err(ResolveError::Config(error)) => {
                self.errors.push(SemanticsError::Config(error));
                None
            }
        }
    }

    /// Check a call to a key known to `library`.
    fn check_call<K: Copy + Eq + Hash + Debug>(
        &mut self,
        manager: &SemanticsManager,
        library: &Library<K>,
        key: K,
        callee: &str,
        args: &[NodeId],
        span: Span,
    ) -> Option<Format> {
        let Some(expected) = library.expected_formats(key, args.len()) else {
            self.errors.push(SemanticsError::WrongArgCount {
                callee: callee.to_owned(),
                expected: library.arities(key),
                found: args.len(),
                span,
            });
            self.check_unconstrained(manager, args);
            return None;
        };

        let mut formats = Vec::with_capacity(args.len());
        let mut complete = true;
        for (&arg, &assertion) in args.iter().zip(expected.iter()) {
            let child = manager.derive(ASSERTED, assertion);
            match self.check(&child, arg) {
                Some(format) => formats.push(format),
                None => complete = false,
            }
        }
        if !complete {
            return None;
        }

        match library.result_format(key, &formats) {
            Ok(format) => Some(format),
            Err(CallError::NoMatchingOverload { found }) => {
                self.errors.push(SemanticsError::NoMatchingOverload {
                    callee: callee.to_owned(),
                    found,
                    span,
                });
                None
            }
            Err(CallError::WrongArgCount { expected, found }) => {
                self.errors.push(SemanticsError::WrongArgCount {
                    callee: callee.to_owned(),
                    expected,
                    found,
                    span,
                });
                None
            }
            // Resolving formats never runs an implementation, and the key
            // is known to exist.
            Err(CallError::Unknown | CallError::Failed(_)) => None,
        }
    }

    /// Visit arguments of a call that cannot be typed, to report errors
    /// inside them.
    fn check_unconstrained(&mut self, manager: &SemanticsManager, args: &[NodeId]) {
        let child = manager.derive(ASSERTED, None);
        for &arg in args {
            self.check(&child, arg);
        }
    }

    fn check_asserted(
        &mut self,
        manager: &SemanticsManager,
        id: NodeId,
        computed: Format,
        span: Span,
    ) -> Option<Format> {
        let asserted = match manager.asserted() {
            Ok(asserted) => asserted,
            Err(error) => {
                self.errors.push(SemanticsError::Config(error));
                return None;
            }
        };
        match asserted {
            Some(expected) if expected != computed => {
                let error = if id == self.tree.root() {
                    SemanticsError::RootFormatMismatch {
                        expected,
                        found: computed,
                        span,
                    }
                } else {
                    SemanticsError::ArgumentFormatMismatch {
                        expected,
                        found: computed,
                        span,
                    }
                };
                self.errors.push(error);
                None
            }
            _ => Some(computed),
        }
    }
}

fn literal_format(literal: Literal) -> Format {
    match literal {
        Literal::Number(_) => Format::Number,
        Literal::Str(_) => Format::String,
        Literal::Bool(_) => Format::Boolean,
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
