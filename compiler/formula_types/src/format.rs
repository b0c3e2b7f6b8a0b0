//! Format tags and the custom format registry.

use std::fmt;
use std::hash::{Hash, Hasher};

use formula_ir::{Name, StringInterner};
use rustc_hash::FxHashMap;

use crate::{ConfigError, ObjectRef, Value};

/// Type tag of a formula result.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub enum Format {
    Number,
    String,
    Boolean,
    /// Host-defined format registered in a `FormatRegistry`.
    Custom(CustomFormat),
}

impl Format {
    /// Display name of the format.
    pub fn name(&self) -> &'static str {
        match self {
            Format::Number => "Number",
            Format::String => "String",
            Format::Boolean => "Boolean",
            Format::Custom(custom) => custom.label,
        }
    }

    /// Check if this is a host-defined format.
    pub fn is_custom(&self) -> bool {
        matches!(self, Format::Custom(_))
    }
}

impl fmt::Debug for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Handle for a registered custom format.
///
/// Identity is the interned name; the label is kept alongside so a format
/// can be displayed without access to the interner.
#[derive(Copy, Clone)]
pub struct CustomFormat {
    name: Name,
    label: &'static str,
}

impl CustomFormat {
    /// Interned name of the format.
    pub fn name(&self) -> Name {
        self.name
    }
}

impl PartialEq for CustomFormat {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for CustomFormat {}

impl Hash for CustomFormat {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

/// Registry of custom formats and the default value of every format.
///
/// Built-in formats are always known. A declared variable that has never
/// been assigned evaluates to its format's default value.
#[derive(Clone, Debug, Default)]
pub struct FormatRegistry {
    custom: FxHashMap<&'static str, (Format, Value)>,
}

impl FormatRegistry {
    /// Create a registry containing only the built-in formats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a custom format.
    ///
    /// `default_key` identifies the host object used as the default value
    /// of variables of this format.
    pub fn register(
        &mut self,
        interner: &StringInterner,
        name: &str,
        default_key: &str,
    ) -> Result<Format, ConfigError> {
        if self.get(name).is_some() {
            return Err(ConfigError::DuplicateFormat {
                name: name.to_owned(),
            });
        }

        let interned = interner.try_intern(name)?;
        let label = interner.lookup(interned);
        let format = Format::Custom(CustomFormat {
            name: interned,
            label,
        });
        let default = Value::Object(ObjectRef::new(format, default_key));
        self.custom.insert(label, (format, default));
        Ok(format)
    }

    /// Look up a format by display name.
    pub fn get(&self, name: &str) -> Option<Format> {
        match name {
            "Number" => Some(Format::Number),
            "String" => Some(Format::String),
            "Boolean" => Some(Format::Boolean),
            _ => self.custom.get(name).map(|(format, _)| *format),
        }
    }

    /// Default value for a format, if the format is known.
    pub fn default_value(&self, format: Format) -> Option<Value> {
        match format {
            Format::Number => Some(Value::Number(0.0)),
            Format::String => Some(Value::string("")),
            Format::Boolean => Some(Value::Bool(false)),
            Format::Custom(custom) => self
                .custom
                .get(custom.label)
                .filter(|(registered, _)| *registered == format)
                .map(|(_, default)| default.clone()),
        }
    }

    /// Number of registered custom formats.
    pub fn custom_count(&self) -> usize {
        self.custom.len()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
