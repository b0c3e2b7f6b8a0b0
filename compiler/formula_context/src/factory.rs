//! Construction point for pass managers.

use formula_scope::{LegalScope, ScopeInstance, VariableId};
use formula_types::Format;

use crate::keys::{ASSERTED, FMANAGER, INSTANCE, SCOPE, VARIABLES};
use crate::{
    DependencyCollector, DependencyManager, EvaluationManager, SemanticsManager,
    SharedFormulaManager,
};

/// Builds the manager each pass is driven by.
///
/// Every method has a default body. To add ambient keys, wrap another
/// factory, delegate to it and `set` the extra keys on the result:
///
/// ```
/// use formula_context::keys::TOLERANCE;
/// use formula_context::{
///     DefaultManagerFactory, EvaluationManager, ManagerFactory, SharedFormulaManager,
/// };
/// use formula_scope::ScopeInstance;
/// use formula_types::Format;
///
/// struct Loose<F>(F);
///
/// impl<F: ManagerFactory> ManagerFactory for Loose<F> {
///     fn make_evaluation_manager(
///         &self,
///         fm: &SharedFormulaManager,
///         instance: &ScopeInstance,
///         asserted: Option<Format>,
///     ) -> EvaluationManager {
///         let mut manager = self.0.make_evaluation_manager(fm, instance, asserted);
///         manager.set(TOLERANCE, 0.001);
///         manager
///     }
/// }
///
/// let _factory = Loose(DefaultManagerFactory);
/// ```
pub trait ManagerFactory: Send + Sync {
    fn make_semantics_manager(
        &self,
        fm: &SharedFormulaManager,
        scope: &LegalScope,
        asserted: Option<Format>,
    ) -> SemanticsManager {
        let mut manager = SemanticsManager::empty();
        manager.set(FMANAGER, fm.clone());
        manager.set(SCOPE, scope.clone());
        manager.set(ASSERTED, asserted);
        manager
    }

    /// The returned manager carries a fresh, empty dependency collector.
    fn make_dependency_manager(
        &self,
        fm: &SharedFormulaManager,
        instance: &ScopeInstance,
        asserted: Option<Format>,
    ) -> DependencyManager {
        let mut manager = DependencyManager::empty();
        manager.set(FMANAGER, fm.clone());
        manager.set(INSTANCE, instance.clone());
        manager.set(ASSERTED, asserted);
        manager.set(VARIABLES, DependencyCollector::new());
        manager
    }

    fn make_evaluation_manager(
        &self,
        fm: &SharedFormulaManager,
        instance: &ScopeInstance,
        asserted: Option<Format>,
    ) -> EvaluationManager {
        let mut manager = EvaluationManager::empty();
        manager.set(FMANAGER, fm.clone());
        manager.set(INSTANCE, instance.clone());
        manager.set(ASSERTED, asserted);
        manager
    }

    /// Manager for computing the value of `variable`: its instance, with
    /// its format asserted.
    fn make_evaluation_manager_for(
        &self,
        fm: &SharedFormulaManager,
        variable: &VariableId,
    ) -> EvaluationManager {
        self.make_evaluation_manager(fm, variable.instance(), Some(variable.format()))
    }
}

/// Factory using every default.
#[derive(Copy, Clone, Debug, Default)]
pub struct DefaultManagerFactory;

impl ManagerFactory for DefaultManagerFactory {}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
