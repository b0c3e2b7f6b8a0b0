//! The three manager flavors and the dependency collector.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use formula_scope::{LegalScope, ScopeInstance, VariableId};
use formula_types::{ConfigError, Format};
use parking_lot::Mutex;
use rustc_hash::FxHashSet;

use crate::keys::{ASSERTED, FMANAGER, INSTANCE, SCOPE, TOLERANCE, VARIABLES};
use crate::{ContextMap, SharedFormulaManager, TypedKey};

/// Define a manager newtype over `ContextMap`.
///
/// Each generated type has:
/// - crate-private `empty()`; managers are built by a `ManagerFactory`
/// - `get`, `set`, `derive` and `contains` forwarding to the map
/// - `formula_manager()` and `asserted()` accessors
macro_rules! define_manager {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => { $(
        $(#[$meta])*
        #[derive(Clone, Debug)]
        pub struct $name {
            map: ContextMap,
        }

        impl $name {
            pub(crate) fn empty() -> Self {
                Self { map: ContextMap::new() }
            }

            pub fn get<T: Any + Send + Sync + Clone>(
                &self,
                key: TypedKey<T>,
            ) -> Result<T, ConfigError> {
                self.map.get(key)
            }

            pub fn set<T: Any + Send + Sync>(&mut self, key: TypedKey<T>, value: T) {
                self.map.set(key, value);
            }

            /// A copy of this manager with `key` set to `value`.
            #[must_use]
            pub fn derive<T: Any + Send + Sync>(&self, key: TypedKey<T>, value: T) -> Self {
                Self { map: self.map.derive(key, value) }
            }

            pub fn contains<T>(&self, key: TypedKey<T>) -> bool {
                self.map.contains(key)
            }

            pub fn formula_manager(&self) -> Result<SharedFormulaManager, ConfigError> {
                self.map.get(FMANAGER)
            }

            /// Format the current node must produce, if any.
            pub fn asserted(&self) -> Result<Option<Format>, ConfigError> {
                self.map.get(ASSERTED)
            }
        }
    )* };
}

define_manager!(
    /// Context for the semantics pass: `FMANAGER`, `SCOPE`, `ASSERTED`.
    SemanticsManager,
    /// Context for the dependency pass: `FMANAGER`, `INSTANCE`,
    /// `ASSERTED`, `VARIABLES`.
    DependencyManager,
    /// Context for the evaluation pass: `FMANAGER`, `INSTANCE`, `ASSERTED`,
    /// optionally `TOLERANCE`.
    EvaluationManager,
);

impl SemanticsManager {
    pub fn scope(&self) -> Result<LegalScope, ConfigError> {
        self.map.get(SCOPE)
    }
}

impl DependencyManager {
    pub fn instance(&self) -> Result<ScopeInstance, ConfigError> {
        self.map.get(INSTANCE)
    }

    pub fn variables(&self) -> Result<DependencyCollector, ConfigError> {
        self.map.get(VARIABLES)
    }
}

impl EvaluationManager {
    pub fn instance(&self) -> Result<ScopeInstance, ConfigError> {
        self.map.get(INSTANCE)
    }

    pub fn tolerance(&self) -> Result<f64, ConfigError> {
        self.map.get(TOLERANCE)
    }
}

/// Accumulates resolved variables during a dependency pass.
///
/// Clones share one set, so every manager derived from the same root adds
/// to the same collection.
#[derive(Clone, Default)]
pub struct DependencyCollector(Arc<Mutex<FxHashSet<VariableId>>>);

impl DependencyCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable; returns `false` if it was already collected.
    pub fn insert(&self, id: VariableId) -> bool {
        self.0.lock().insert(id)
    }

    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }

    /// Copy of everything collected so far.
    pub fn snapshot(&self) -> DependencySet {
        DependencySet(self.0.lock().clone())
    }
}

impl fmt::Debug for DependencyCollector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DependencyCollector({} variables)", self.len())
    }
}

/// Variables a formula reads, deduplicated.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct DependencySet(FxHashSet<VariableId>);

impl DependencySet {
    pub fn contains(&self, id: &VariableId) -> bool {
        self.0.contains(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VariableId> {
        self.0.iter()
    }

    /// Variables ordered by display form, for stable output.
    pub fn to_sorted_vec(&self) -> Vec<VariableId> {
        let mut ids: Vec<VariableId> = self.0.iter().cloned().collect();
        ids.sort_by_cached_key(ToString::to_string);
        ids
    }
}

impl FromIterator<VariableId> for DependencySet {
    fn from_iter<I: IntoIterator<Item = VariableId>>(iter: I) -> Self {
        DependencySet(iter.into_iter().collect())
    }
}

impl IntoIterator for DependencySet {
    type Item = VariableId;
    type IntoIter = std::collections::hash_set::IntoIter<VariableId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Debug for DependencySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.to_sorted_vec()).finish()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
