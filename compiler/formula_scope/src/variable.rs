//! Variable declarations and resolution.

use std::fmt;
use std::hash::{Hash, Hasher};

use formula_ir::{Name, SharedInterner};
use formula_types::{ConfigError, Format};
use rustc_hash::FxHashMap;

use crate::{LegalScope, ScopeId, ScopeInstance};

/// A variable reference resolved to a concrete instance.
///
/// Only produced by successful resolution, so a `VariableId` always names
/// a declared variable. Equal when instance, name and format are equal.
#[derive(Clone)]
pub struct VariableId {
    instance: ScopeInstance,
    name: Name,
    format: Format,
    label: &'static str,
}

impl VariableId {
    pub(crate) fn new(
        instance: ScopeInstance,
        name: Name,
        format: Format,
        label: &'static str,
    ) -> Self {
        VariableId {
            instance,
            name,
            format,
            label,
        }
    }

    /// Instance the variable was found in (the nearest declaring one).
    pub fn instance(&self) -> &ScopeInstance {
        &self.instance
    }

    pub fn name(&self) -> Name {
        self.name
    }

    pub fn format(&self) -> Format {
        self.format
    }

    /// Variable name as written in formulas.
    pub fn label(&self) -> &'static str {
        self.label
    }
}

impl PartialEq for VariableId {
    fn eq(&self, other: &Self) -> bool {
        self.instance == other.instance && self.name == other.name && self.format == other.format
    }
}

impl Eq for VariableId {}

impl Hash for VariableId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.instance.hash(state);
        self.name.hash(state);
        self.format.hash(state);
    }
}

impl fmt::Debug for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VariableId({self})")
    }
}

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}: {}", self.label, self.instance, self.format)
    }
}

/// Variable resolution failure.
#[derive(Clone, Debug, PartialEq)]
pub enum ResolveError {
    /// No scope on the walk declares the name.
    Undeclared { name: String, scope: String },
    /// The walk itself failed.
    Config(ConfigError),
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::Undeclared { name, scope } => {
                write!(f, "variable `{name}` is not declared in `{scope}` or its ancestors")
            }
            ResolveError::Config(error) => write!(f, "{error}"),
        }
    }
}

impl std::error::Error for ResolveError {}

impl From<ConfigError> for ResolveError {
    fn from(error: ConfigError) -> Self {
        ResolveError::Config(error)
    }
}

/// Variable declarations, per legal scope.
///
/// Filled while the rule set loads; read-only afterwards.
pub struct VariableLibrary {
    interner: SharedInterner,
    declarations: FxHashMap<(ScopeId, Name), Format>,
}

impl VariableLibrary {
    pub fn new(interner: SharedInterner) -> Self {
        VariableLibrary {
            interner,
            declarations: FxHashMap::default(),
        }
    }

    /// Declare `name` in `scope` with `format`.
    ///
    /// Redeclaring with the same format is a no-op. Redeclaring with a
    /// different format in the same scope is an error; declaring the same
    /// name in a child scope shadows the parent's declaration.
    pub fn declare(
        &mut self,
        scope: &LegalScope,
        name: &str,
        format: Format,
    ) -> Result<Name, ConfigError> {
        let interned = self.interner.try_intern(name)?;
        match self.declarations.get(&(scope.id(), interned)) {
            Some(&existing) if existing == format => Ok(interned),
            Some(&existing) => Err(ConfigError::ConflictingDeclaration {
                variable: name.to_owned(),
                scope: scope.path().to_owned(),
                existing,
                requested: format,
            }),
            None => {
                tracing::trace!(scope = scope.path(), name, %format, "variable declared");
                self.declarations.insert((scope.id(), interned), format);
                Ok(interned)
            }
        }
    }

    /// Format `name` is declared with directly in `scope`, ignoring
    /// ancestors.
    pub fn declared_format(&self, scope: &LegalScope, name: Name) -> Option<Format> {
        self.declarations.get(&(scope.id(), name)).copied()
    }

    /// Find the nearest scope at or above `scope` declaring `name`.
    ///
    /// At most `max_depth` scopes are examined.
    pub fn resolve_in_scope(
        &self,
        scope: &LegalScope,
        name: Name,
        max_depth: usize,
    ) -> Result<(LegalScope, Format), ResolveError> {
        for (depth, candidate) in scope.ancestors().enumerate() {
            if depth >= max_depth {
                return Err(too_deep(scope.path(), max_depth));
            }
            if let Some(format) = self.declared_format(candidate, name) {
                return Ok((candidate.clone(), format));
            }
        }
        Err(self.undeclared(name, scope.path()))
    }

    /// Resolve `name` against `instance`, walking enclosing instances.
    ///
    /// The result names the nearest instance whose scope declares the
    /// variable, so a child declaration shadows its parent's.
    pub fn resolve(
        &self,
        instance: &ScopeInstance,
        name: Name,
        max_depth: usize,
    ) -> Result<VariableId, ResolveError> {
        for (depth, candidate) in instance.ancestors().enumerate() {
            if depth >= max_depth {
                return Err(too_deep(instance.scope().path(), max_depth));
            }
            if let Some(format) = self.declared_format(candidate.scope(), name) {
                return Ok(VariableId::new(
                    candidate.clone(),
                    name,
                    format,
                    self.interner.lookup(name),
                ));
            }
        }
        Err(self.undeclared(name, instance.scope().path()))
    }

    /// Total number of declarations across all scopes.
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    fn undeclared(&self, name: Name, scope: &str) -> ResolveError {
        ResolveError::Undeclared {
            name: self.interner.lookup(name).to_owned(),
            scope: scope.to_owned(),
        }
    }
}

fn too_deep(start: &str, limit: usize) -> ResolveError {
    ResolveError::Config(ConfigError::ScopeChainTooDeep {
        start: start.to_owned(),
        limit,
    })
}

impl fmt::Debug for VariableLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariableLibrary")
            .field("declarations", &self.declarations.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
