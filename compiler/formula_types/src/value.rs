//! Runtime values produced by evaluation.

use std::fmt;
use std::sync::Arc;

use crate::{approx_eq, ConfigError, Format};

/// Reference to a host object of a custom format.
///
/// The engine never looks inside host objects; it only carries the key the
/// host uses to identify one, tagged with the object's format.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ObjectRef {
    format: Format,
    key: Arc<str>,
}

impl ObjectRef {
    pub fn new(format: Format, key: impl Into<Arc<str>>) -> Self {
        ObjectRef {
            format,
            key: key.into(),
        }
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

/// Result of evaluating a formula or one of its nodes.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Number(f64),
    Str(Arc<str>),
    Bool(bool),
    Object(ObjectRef),
}

impl Value {
    /// Create a string value.
    pub fn string(s: impl Into<Arc<str>>) -> Self {
        Value::Str(s.into())
    }

    /// Format of this value.
    pub fn format(&self) -> Format {
        match self {
            Value::Number(_) => Format::Number,
            Value::Str(_) => Format::String,
            Value::Bool(_) => Format::Boolean,
            Value::Object(object) => object.format(),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Compare two values, allowing numbers to differ by `tolerance`.
    ///
    /// Non-numeric values compare exactly. Values of different formats are
    /// never equal.
    pub fn approx_eq(&self, other: &Value, tolerance: f64) -> Result<bool, ConfigError> {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => approx_eq(*a, *b, tolerance),
            _ => {
                // Reject a bad tolerance even when it would go unused.
                approx_eq(0.0, 0.0, tolerance)?;
                Ok(self == other)
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Str(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Object(object) => write!(f, "{}({})", object.format(), object.key()),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
