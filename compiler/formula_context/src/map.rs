//! Copy-on-write heterogeneous map.

use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

use formula_types::ConfigError;
use rustc_hash::FxHashMap;

use crate::TypedKey;

type Entry = Arc<dyn Any + Send + Sync>;

/// Map from `TypedKey` to a value of the key's type.
///
/// Cloning shares the underlying table; the first `set` on a shared map
/// copies it. `derive` therefore never affects the map it was called on.
#[derive(Clone, Default)]
pub struct ContextMap {
    entries: Arc<FxHashMap<&'static str, Entry>>,
}

impl ContextMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`, replacing any previous value.
    pub fn set<T: Any + Send + Sync>(&mut self, key: TypedKey<T>, value: T) {
        Arc::make_mut(&mut self.entries).insert(key.name(), Arc::new(value));
    }

    /// Get the value for `key`, falling back to the key's default.
    pub fn get<T: Any + Send + Sync + Clone>(&self, key: TypedKey<T>) -> Result<T, ConfigError> {
        match self.entries.get(key.name()) {
            Some(entry) => (**entry).downcast_ref::<T>().cloned().ok_or(
                ConfigError::KeyTypeMismatch {
                    key: key.name(),
                    expected: type_name::<T>(),
                },
            ),
            None => key
                .default_value()
                .ok_or(ConfigError::MissingKey { key: key.name() }),
        }
    }

    /// Check if `key` has an explicit entry (defaults do not count).
    pub fn contains<T>(&self, key: TypedKey<T>) -> bool {
        self.entries.contains_key(key.name())
    }

    /// A copy of this map with `key` set to `value`.
    #[must_use]
    pub fn derive<T: Any + Send + Sync>(&self, key: TypedKey<T>, value: T) -> Self {
        let mut derived = self.clone();
        derived.set(key, value);
        derived
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for ContextMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.entries.keys().copied().collect();
        keys.sort_unstable();
        f.debug_set().entries(keys).finish()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
