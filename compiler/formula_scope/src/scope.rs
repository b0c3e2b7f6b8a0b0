//! Static scope hierarchy.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use formula_ir::{Name, SharedInterner};
use formula_types::ConfigError;
use rustc_hash::FxHashMap;

/// Index of a legal scope within its `ScopeTree`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Debug)]
pub struct ScopeId(u32);

impl ScopeId {
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

#[derive(Debug)]
struct ScopeData {
    id: ScopeId,
    name: Name,
    path: Arc<str>,
    parent: Option<LegalScope>,
}

/// A named node in the static scope hierarchy.
///
/// Cheap to clone. Two handles are equal when they name the same scope of
/// the same tree.
#[derive(Clone)]
pub struct LegalScope(Arc<ScopeData>);

impl LegalScope {
    pub fn id(&self) -> ScopeId {
        self.0.id
    }

    /// Unqualified scope name.
    pub fn name(&self) -> Name {
        self.0.name
    }

    /// Dotted path from the root, e.g. `Global.Equipment`.
    pub fn path(&self) -> &str {
        &self.0.path
    }

    pub fn parent(&self) -> Option<&LegalScope> {
        self.0.parent.as_ref()
    }

    /// This scope followed by each ancestor up to the root.
    pub fn ancestors(&self) -> impl Iterator<Item = &LegalScope> {
        std::iter::successors(Some(self), |scope| scope.parent())
    }

    /// Number of ancestors above this scope.
    pub fn depth(&self) -> usize {
        self.ancestors().count() - 1
    }
}

impl PartialEq for LegalScope {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for LegalScope {}

impl Hash for LegalScope {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl fmt::Debug for LegalScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LegalScope({})", self.path())
    }
}

impl fmt::Display for LegalScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Registry of every legal scope of a rule set.
///
/// Scopes are added while the rule set loads and never change afterwards.
/// Paths are unique.
pub struct ScopeTree {
    interner: SharedInterner,
    scopes: Vec<LegalScope>,
    by_path: FxHashMap<Arc<str>, ScopeId>,
}

impl ScopeTree {
    pub fn new(interner: SharedInterner) -> Self {
        ScopeTree {
            interner,
            scopes: Vec::new(),
            by_path: FxHashMap::default(),
        }
    }

    /// Add a scope with no parent.
    pub fn add_root(&mut self, name: &str) -> Result<LegalScope, ConfigError> {
        self.insert(name, Arc::from(name), None)
    }

    /// Add a scope nested under `parent`.
    pub fn add_child(&mut self, parent: &LegalScope, name: &str) -> Result<LegalScope, ConfigError> {
        let path: Arc<str> = Arc::from(format!("{}.{name}", parent.path()));
        self.insert(name, path, Some(parent.clone()))
    }

    fn insert(
        &mut self,
        name: &str,
        path: Arc<str>,
        parent: Option<LegalScope>,
    ) -> Result<LegalScope, ConfigError> {
        if self.by_path.contains_key(&path) {
            return Err(ConfigError::DuplicateScope {
                path: path.to_string(),
            });
        }

        let raw = u32::try_from(self.scopes.len()).map_err(|_| ConfigError::TooManyScopes {
            limit: u32::MAX as usize,
        })?;
        let id = ScopeId(raw);
        let scope = LegalScope(Arc::new(ScopeData {
            id,
            name: self.interner.try_intern(name)?,
            path: Arc::clone(&path),
            parent,
        }));
        tracing::trace!(path = %path, "scope added");
        self.scopes.push(scope.clone());
        self.by_path.insert(path, id);
        Ok(scope)
    }

    /// Look up a scope by dotted path.
    pub fn get(&self, path: &str) -> Option<LegalScope> {
        let id = self.by_path.get(path)?;
        self.scopes.get(id.0 as usize).cloned()
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LegalScope> {
        self.scopes.iter()
    }
}

impl fmt::Debug for ScopeTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.scopes.iter()).finish()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
