//! Runtime scope instances.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use formula_types::ConfigError;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::{LegalScope, ScopeId};

/// Identity of a scope instance within its factory.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Debug)]
pub struct InstanceId(u64);

#[derive(Debug)]
struct InstanceData {
    id: InstanceId,
    scope: LegalScope,
    subject: Arc<str>,
    parent: Option<ScopeInstance>,
}

/// A legal scope bound to one concrete subject.
///
/// Instances are created only through a `ScopeInstanceFactory`, which
/// guarantees the instance chain mirrors the legal scope chain. An
/// instance never changes after creation, so the chain is acyclic.
#[derive(Clone)]
pub struct ScopeInstance(Arc<InstanceData>);

impl ScopeInstance {
    pub fn id(&self) -> InstanceId {
        self.0.id
    }

    pub fn scope(&self) -> &LegalScope {
        &self.0.scope
    }

    /// Host identifier of the subject this instance is bound to.
    pub fn subject(&self) -> &str {
        &self.0.subject
    }

    pub fn parent(&self) -> Option<&ScopeInstance> {
        self.0.parent.as_ref()
    }

    /// This instance followed by each enclosing instance up to the root.
    pub fn ancestors(&self) -> impl Iterator<Item = &ScopeInstance> {
        std::iter::successors(Some(self), |instance| instance.parent())
    }
}

impl PartialEq for ScopeInstance {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for ScopeInstance {}

impl Hash for ScopeInstance {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl fmt::Debug for ScopeInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScopeInstance({self})")
    }
}

impl fmt::Display for ScopeInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.scope().path(), self.subject())
    }
}

type InstanceKey = (ScopeId, Option<InstanceId>, Arc<str>);

#[derive(Default)]
struct InstanceCache {
    instances: FxHashMap<InstanceKey, ScopeInstance>,
    next_id: u64,
}

/// Creates and interns scope instances.
///
/// Asking twice for the same scope, subject and parent yields the same
/// instance, so instance equality is subject identity. Thread-safe.
#[derive(Default)]
pub struct ScopeInstanceFactory {
    cache: Mutex<InstanceCache>,
}

impl ScopeInstanceFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the instance of `scope` bound to `subject`.
    ///
    /// `parent` must be an instance of the scope's parent scope, and must
    /// be `None` exactly when the scope is a root.
    pub fn get(
        &self,
        scope: &LegalScope,
        subject: &str,
        parent: Option<&ScopeInstance>,
    ) -> Result<ScopeInstance, ConfigError> {
        let expected = scope.parent();
        let found = parent.map(ScopeInstance::scope);
        if expected != found {
            return Err(ConfigError::InstanceParentMismatch {
                scope: scope.path().to_owned(),
                expected: expected.map(|s| s.path().to_owned()),
                found: found.map(|s| s.path().to_owned()),
            });
        }

        let subject: Arc<str> = Arc::from(subject);
        let key = (scope.id(), parent.map(ScopeInstance::id), Arc::clone(&subject));

        let mut cache = self.cache.lock();
        if let Some(instance) = cache.instances.get(&key) {
            return Ok(instance.clone());
        }

        let id = InstanceId(cache.next_id);
        cache.next_id += 1;
        let instance = ScopeInstance(Arc::new(InstanceData {
            id,
            scope: scope.clone(),
            subject,
            parent: parent.cloned(),
        }));
        tracing::trace!(instance = %instance, "scope instance created");
        cache.instances.insert(key, instance.clone());
        Ok(instance)
    }

    /// Forget `instance` and every cached instance nested under it.
    ///
    /// Outstanding handles stay valid, but asking for the same subject
    /// again creates a new instance with a new id. Returns how many
    /// instances were dropped from the cache; zero if `instance` was
    /// already released.
    pub fn release(&self, instance: &ScopeInstance) -> usize {
        let id = instance.id();
        let mut cache = self.cache.lock();
        let before = cache.instances.len();
        cache
            .instances
            .retain(|_, cached| cached.ancestors().all(|a| a.id() != id));
        let released = before - cache.instances.len();
        if released > 0 {
            tracing::trace!(instance = %instance, released, "scope instance released");
        }
        released
    }

    /// Number of instances currently cached.
    pub fn len(&self) -> usize {
        self.cache.lock().instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for ScopeInstanceFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeInstanceFactory")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
