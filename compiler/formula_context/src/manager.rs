//! The formula manager and its builder.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use formula_ir::{Name, SharedInterner};
use formula_library::{builtins, FunctionLibrary, OperatorLibrary};
use formula_scope::{
    LegalScope, ResolveError, ScopeInstance, ScopeInstanceFactory, ScopeTree, SimpleVariableStore,
    VariableId, VariableLibrary, VariableStore,
};
use formula_types::{ConfigError, Format, FormatRegistry};

/// Engine limits.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct FormulaConfig {
    /// Maximum number of scopes a resolution walk may visit.
    pub max_scope_depth: usize,
    /// Maximum nesting depth of a formula tree.
    pub max_tree_depth: usize,
}

impl Default for FormulaConfig {
    fn default() -> Self {
        FormulaConfig {
            max_scope_depth: 64,
            max_tree_depth: 256,
        }
    }
}

/// Read-only registry shared by every pass.
///
/// Holds the function, operator and variable libraries, the format
/// registry, the scope tree, the scope instance factory and the live value
/// store. Built once with `FormulaManagerBuilder`.
pub struct FormulaManager {
    interner: SharedInterner,
    functions: FunctionLibrary,
    operators: OperatorLibrary,
    variables: VariableLibrary,
    formats: FormatRegistry,
    scopes: ScopeTree,
    instances: ScopeInstanceFactory,
    store: Arc<dyn VariableStore>,
    config: FormulaConfig,
}

impl FormulaManager {
    pub fn builder(interner: SharedInterner) -> FormulaManagerBuilder {
        FormulaManagerBuilder::new(interner)
    }

    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    pub fn functions(&self) -> &FunctionLibrary {
        &self.functions
    }

    pub fn operators(&self) -> &OperatorLibrary {
        &self.operators
    }

    pub fn variables(&self) -> &VariableLibrary {
        &self.variables
    }

    pub fn formats(&self) -> &FormatRegistry {
        &self.formats
    }

    pub fn scopes(&self) -> &ScopeTree {
        &self.scopes
    }

    pub fn store(&self) -> &dyn VariableStore {
        &*self.store
    }

    pub fn config(&self) -> &FormulaConfig {
        &self.config
    }

    /// Get the instance of `scope` bound to `subject`.
    pub fn instance(
        &self,
        scope: &LegalScope,
        subject: &str,
        parent: Option<&ScopeInstance>,
    ) -> Result<ScopeInstance, ConfigError> {
        self.instances.get(scope, subject, parent)
    }

    /// Drop `instance` and the instances nested under it from the cache,
    /// returning how many were dropped.
    ///
    /// Values the store holds for their variables are not touched.
    pub fn release_instance(&self, instance: &ScopeInstance) -> usize {
        self.instances.release(instance)
    }

    /// Number of scope instances currently cached.
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Resolve a variable by name against an instance.
    pub fn resolve(&self, instance: &ScopeInstance, name: &str) -> Result<VariableId, ResolveError> {
        let Some(interned) = self.interner.get(name) else {
            return Err(ResolveError::Undeclared {
                name: name.to_owned(),
                scope: instance.scope().path().to_owned(),
            });
        };
        self.resolve_name(instance, interned)
    }

    /// Resolve an interned variable name against an instance, honoring the
    /// configured scope depth.
    pub fn resolve_name(
        &self,
        instance: &ScopeInstance,
        name: Name,
    ) -> Result<VariableId, ResolveError> {
        self.variables
            .resolve(instance, name, self.config.max_scope_depth)
    }

    /// Resolve an interned variable name against a legal scope, honoring
    /// the configured scope depth.
    pub fn resolve_in_scope(
        &self,
        scope: &LegalScope,
        name: Name,
    ) -> Result<(LegalScope, Format), ResolveError> {
        self.variables
            .resolve_in_scope(scope, name, self.config.max_scope_depth)
    }
}

impl fmt::Debug for FormulaManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormulaManager")
            .field("functions", &self.functions.len())
            .field("operators", &self.operators.len())
            .field("variables", &self.variables.len())
            .field("scopes", &self.scopes.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Shared, immutable handle to a `FormulaManager`.
#[derive(Clone)]
pub struct SharedFormulaManager(Arc<FormulaManager>);

impl SharedFormulaManager {
    pub fn new(manager: FormulaManager) -> Self {
        SharedFormulaManager(Arc::new(manager))
    }

    /// Check if both handles point at the same manager.
    pub fn same(&self, other: &SharedFormulaManager) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Deref for SharedFormulaManager {
    type Target = FormulaManager;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Debug for SharedFormulaManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedFormulaManager({:?})", &*self.0)
    }
}

/// Builder for a `FormulaManager`.
///
/// Scopes, variables and custom formats are added through `&mut self`
/// methods while the rule set loads; engine settings use the consuming
/// methods. `build` freezes everything.
pub struct FormulaManagerBuilder {
    interner: SharedInterner,
    functions: FunctionLibrary,
    operators: OperatorLibrary,
    variables: VariableLibrary,
    formats: FormatRegistry,
    scopes: ScopeTree,
    store: Option<Arc<dyn VariableStore>>,
    config: FormulaConfig,
}

impl FormulaManagerBuilder {
    /// Create a builder with empty libraries.
    pub fn new(interner: SharedInterner) -> Self {
        FormulaManagerBuilder {
            functions: FunctionLibrary::new(),
            operators: OperatorLibrary::new(),
            variables: VariableLibrary::new(interner.clone()),
            formats: FormatRegistry::new(),
            scopes: ScopeTree::new(interner.clone()),
            store: None,
            config: FormulaConfig::default(),
            interner,
        }
    }

    /// Install the standard operators and functions.
    #[must_use]
    pub fn with_standard_library(mut self) -> Self {
        builtins::install(&mut self.functions, &mut self.operators, &self.interner);
        self
    }

    #[must_use]
    pub fn max_scope_depth(mut self, depth: usize) -> Self {
        self.config.max_scope_depth = depth;
        self
    }

    #[must_use]
    pub fn max_tree_depth(mut self, depth: usize) -> Self {
        self.config.max_tree_depth = depth;
        self
    }

    #[must_use]
    pub fn config(mut self, config: FormulaConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the live value store.
    ///
    /// Defaults to an empty `SimpleVariableStore`, in which case every
    /// variable evaluates to its format's default.
    #[must_use]
    pub fn store(mut self, store: Arc<dyn VariableStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn add_root_scope(&mut self, name: &str) -> Result<LegalScope, ConfigError> {
        self.scopes.add_root(name)
    }

    pub fn add_child_scope(
        &mut self,
        parent: &LegalScope,
        name: &str,
    ) -> Result<LegalScope, ConfigError> {
        self.scopes.add_child(parent, name)
    }

    pub fn declare(
        &mut self,
        scope: &LegalScope,
        name: &str,
        format: Format,
    ) -> Result<Name, ConfigError> {
        self.variables.declare(scope, name, format)
    }

    /// Register a custom format whose default value is the host object
    /// `default_key`.
    pub fn register_format(&mut self, name: &str, default_key: &str) -> Result<Format, ConfigError> {
        self.formats.register(&self.interner, name, default_key)
    }

    pub fn functions_mut(&mut self) -> &mut FunctionLibrary {
        &mut self.functions
    }

    pub fn operators_mut(&mut self) -> &mut OperatorLibrary {
        &mut self.operators
    }

    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    pub fn build(self) -> SharedFormulaManager {
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(SimpleVariableStore::new()));
        tracing::debug!(
            scopes = self.scopes.len(),
            variables = self.variables.len(),
            functions = self.functions.len(),
            operators = self.operators.len(),
            "formula manager built"
        );
        SharedFormulaManager::new(FormulaManager {
            interner: self.interner,
            functions: self.functions,
            operators: self.operators,
            variables: self.variables,
            formats: self.formats,
            scopes: self.scopes,
            instances: ScopeInstanceFactory::new(),
            store,
            config: self.config,
        })
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
