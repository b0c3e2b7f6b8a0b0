//! Phantom-typed context keys.

use std::fmt;
use std::marker::PhantomData;

/// Key into a `ContextMap` whose value type is `T`.
///
/// Keys are identified by name. A key may carry a default, returned when
/// the map has no entry for it.
pub struct TypedKey<T> {
    name: &'static str,
    default: Option<fn() -> T>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> TypedKey<T> {
    /// Create a key with no default.
    pub const fn new(name: &'static str) -> Self {
        TypedKey {
            name,
            default: None,
            _marker: PhantomData,
        }
    }

    /// Create a key whose value defaults to `default()` when unset.
    pub const fn with_default(name: &'static str, default: fn() -> T) -> Self {
        TypedKey {
            name,
            default: Some(default),
            _marker: PhantomData,
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn default_value(&self) -> Option<T> {
        self.default.map(|make| make())
    }
}

// Manual impls: derives would require `T: Clone`.
impl<T> Clone for TypedKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for TypedKey<T> {}

impl<T> fmt::Debug for TypedKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypedKey({})", self.name)
    }
}
