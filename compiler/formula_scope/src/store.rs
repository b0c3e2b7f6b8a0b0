//! Live variable values.

use formula_types::{ConfigError, Value};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::VariableId;

/// Source of current variable values for evaluation.
///
/// Implemented by the host. Implementations synchronize internally; the
/// engine only ever reads.
pub trait VariableStore: Send + Sync {
    /// Current value of a variable, or `None` if it was never assigned.
    fn get(&self, id: &VariableId) -> Option<Value>;
}

/// In-memory `VariableStore` that checks formats on write.
#[derive(Debug, Default)]
pub struct SimpleVariableStore {
    values: RwLock<FxHashMap<VariableId, Value>>,
}

impl SimpleVariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a value, returning the previous one.
    ///
    /// The value's format must match the variable's declared format.
    pub fn set(&self, id: &VariableId, value: Value) -> Result<Option<Value>, ConfigError> {
        if value.format() != id.format() {
            return Err(ConfigError::StoreFormatMismatch {
                expected: id.format(),
                found: value.format(),
            });
        }
        Ok(self.values.write().insert(id.clone(), value))
    }

    pub fn remove(&self, id: &VariableId) -> Option<Value> {
        self.values.write().remove(id)
    }

    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }
}

impl VariableStore for SimpleVariableStore {
    fn get(&self, id: &VariableId) -> Option<Value> {
        self.values.read().get(id).cloned()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
