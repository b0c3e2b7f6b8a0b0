//! Checked-formula handles.

use std::sync::Arc;

use formula_check::{run_semantics, SemanticsError};
use formula_context::{DependencySet, ManagerFactory, SharedFormulaManager};
use formula_deps::{run_dependency, DependencyError};
use formula_eval::{run_evaluation, EvalError};
use formula_ir::FormulaTree;
use formula_scope::{LegalScope, ScopeInstance};
use formula_types::{ConfigError, Format, Value};

/// A parsed formula that has not been checked yet.
#[derive(Clone, Debug)]
pub struct Formula {
    tree: Arc<FormulaTree>,
}

impl Formula {
    pub fn new(tree: FormulaTree) -> Self {
        Formula {
            tree: Arc::new(tree),
        }
    }

    pub fn tree(&self) -> &FormulaTree {
        &self.tree
    }

    /// Run the semantics pass for `scope`.
    ///
    /// On success the formula may be handed to the dependency and
    /// evaluation passes for any instance of `scope`.
    pub fn check<F: ManagerFactory + ?Sized>(
        &self,
        factory: &F,
        fm: &SharedFormulaManager,
        scope: &LegalScope,
        asserted: Option<Format>,
    ) -> Result<CheckedFormula, Vec<SemanticsError>> {
        let manager = factory.make_semantics_manager(fm, scope, asserted);
        let format = run_semantics(&manager, &self.tree)?;
        tracing::debug!(scope = %scope, %format, "formula checked");
        Ok(CheckedFormula {
            tree: Arc::clone(&self.tree),
            scope: scope.clone(),
            asserted,
            format,
        })
    }
}

/// A formula that passed semantics for one legal scope.
///
/// Cheap to clone and shareable across threads.
#[derive(Clone, Debug)]
pub struct CheckedFormula {
    tree: Arc<FormulaTree>,
    scope: LegalScope,
    asserted: Option<Format>,
    format: Format,
}

impl CheckedFormula {
    /// The format the formula produces.
    pub fn format(&self) -> Format {
        self.format
    }

    pub fn tree(&self) -> &FormulaTree {
        &self.tree
    }

    pub fn scope(&self) -> &LegalScope {
        &self.scope
    }

    /// Collect the variables the formula reads when run on `instance`.
    pub fn dependencies<F: ManagerFactory + ?Sized>(
        &self,
        factory: &F,
        fm: &SharedFormulaManager,
        instance: &ScopeInstance,
    ) -> Result<DependencySet, DependencyError> {
        self.expect_scope(instance)?;
        let manager = factory.make_dependency_manager(fm, instance, self.asserted);
        run_dependency(&manager, &self.tree)
    }

    /// Compute the formula's value on `instance`.
    pub fn evaluate<F: ManagerFactory + ?Sized>(
        &self,
        factory: &F,
        fm: &SharedFormulaManager,
        instance: &ScopeInstance,
    ) -> Result<Value, EvalError> {
        self.expect_scope(instance)?;
        let manager = factory.make_evaluation_manager(fm, instance, self.asserted);
        run_evaluation(&manager, &self.tree)
    }

    fn expect_scope(&self, instance: &ScopeInstance) -> Result<(), ConfigError> {
        if instance.scope() == &self.scope {
            Ok(())
        } else {
            Err(ConfigError::InstanceScopeMismatch {
                expected: self.scope.path().to_owned(),
                found: instance.scope().path().to_owned(),
            })
        }
    }
}
