//! Dependency pass.
//!
//! Resolves every variable reference of a formula against a scope
//! instance and records the resulting `VariableId`s. The set is what a
//! host watches to know when a derived value must be recomputed, so it
//! must never miss a variable; variables found through an enclosing
//! instance are recorded against that instance.

mod error;

pub use error::DependencyError;

use formula_context::keys::ASSERTED;
use formula_context::{DependencyManager, DependencySet, FormulaManager};
use formula_ir::{FormulaTree, Name, NodeId, NodeKind, Span};
use formula_scope::{ResolveError, ScopeInstance};
use formula_stack::{ensure_sufficient_stack, DepthGuard};
use formula_types::ConfigError;

/// Capture the variables `tree` reads when run against the manager's
/// instance.
///
/// Variables are added to the manager's `VARIABLES` collector; the
/// returned set is a snapshot of it. Stops at the first failure.
#[tracing::instrument(level = "debug", skip_all, fields(nodes = tree.len()))]
pub fn run_dependency(
    manager: &DependencyManager,
    tree: &FormulaTree,
) -> Result<DependencySet, DependencyError> {
    let fm = manager.formula_manager()?;
    let instance = manager.instance()?;

    let mut visitor = Visitor {
        fm: &fm,
        instance: &instance,
        tree,
        guard: DepthGuard::new(fm.config().max_tree_depth),
    };
    visitor.visit(manager, tree.root())?;

    let dependencies = manager.variables()?.snapshot();
    tracing::debug!(count = dependencies.len(), "dependencies captured");
    Ok(dependencies)
}

struct Visitor<'a> {
    fm: &'a FormulaManager,
    instance: &'a ScopeInstance,
    tree: &'a FormulaTree,
    guard: DepthGuard,
}

impl Visitor<'_> {
    #[tracing::instrument(level = "trace", skip(self, manager))]
    fn visit(&mut self, manager: &DependencyManager, id: NodeId) -> Result<(), DependencyError> {
        ensure_sufficient_stack(|| self.visit_inner(manager, id))
    }

    fn visit_inner(
        &mut self,
        manager: &DependencyManager,
        id: NodeId,
    ) -> Result<(), DependencyError> {
        let (fm, tree) = (self.fm, self.tree);
        let &node = tree
            .node(id)
            .ok_or(ConfigError::MalformedTree { node: id })?;

        self.guard
            .enter()
            .map_err(|exceeded| DependencyError::NestingTooDeep {
                limit: exceeded.limit,
                span: node.span,
            })?;
        let result = match node.kind {
            NodeKind::Literal(_) => Ok(()),
            NodeKind::Variable(name) => self.record(manager, name, node.span),
            NodeKind::Call { function, args } => {
                let expected = fm.functions().expected_formats(function, args.len());
                self.visit_args(manager, id, tree.args(args), expected.as_deref())
            }
            NodeKind::Operator { op, args } => {
                let expected = fm.operators().expected_formats(op, args.len());
                self.visit_args(manager, id, tree.args(args), expected.as_deref())
            }
        };
        self.guard.exit();
        result
    }

    fn visit_args(
        &mut self,
        manager: &DependencyManager,
        parent: NodeId,
        args: Option<&[NodeId]>,
        expected: Option<&[Option<formula_types::Format>]>,
    ) -> Result<(), DependencyError> {
        let args = args.ok_or(ConfigError::MalformedTree { node: parent })?;
        for (i, &arg) in args.iter().enumerate() {
            let assertion = expected.and_then(|e| e.get(i).copied().flatten());
            let child = manager.derive(ASSERTED, assertion);
            self.visit(&child, arg)?;
        }
        Ok(())
    }

    fn record(
        &mut self,
        manager: &DependencyManager,
        name: Name,
        span: Span,
    ) -> Result<(), DependencyError> {
        let id = self
            .fm
            .resolve_name(self.instance, name)
            .map_err(|error| match error {
                ResolveError::Undeclared { name, scope } => {
                    DependencyError::UnresolvedVariable { name, scope, span }
                }
                ResolveError::Config(error) => DependencyError::Config(error),
            })?;
        if manager.variables()?.insert(id) {
            tracing::trace!(name = self.fm.interner().lookup(name), "dependency recorded");
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
