//! Errors shared by more than one pass.

use std::fmt;

use formula_diagnostic::{Diagnostic, ErrorCode};
use formula_ir::{InternError, NodeId};

use crate::Format;

/// Caller or rule-set misuse.
///
/// Configuration errors are fatal: they mean the engine was wired up
/// incorrectly, not that a formula is wrong.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// A required context key was never set and has no default.
    MissingKey { key: &'static str },
    /// A context key holds a value of a different type than it declares.
    KeyTypeMismatch {
        key: &'static str,
        expected: &'static str,
    },
    /// Comparison tolerance was negative or NaN.
    NegativeTolerance { tolerance: f64 },
    /// Scope ancestor walk exceeded the configured bound.
    ScopeChainTooDeep { start: String, limit: usize },
    /// A scope with this path already exists.
    DuplicateScope { path: String },
    /// A scope instance was given a parent that is not an instance of the
    /// scope's parent.
    InstanceParentMismatch {
        scope: String,
        expected: Option<String>,
        found: Option<String>,
    },
    /// A scope instance was used where an instance of another scope was
    /// required.
    InstanceScopeMismatch { expected: String, found: String },
    /// A variable was redeclared in the same scope with another format.
    ConflictingDeclaration {
        variable: String,
        scope: String,
        existing: Format,
        requested: Format,
    },
    /// A stored value does not have the variable's format.
    StoreFormatMismatch { expected: Format, found: Format },
    /// A custom format with this name already exists.
    DuplicateFormat { name: String },
    /// A formula tree refers to a node, or an argument list, it does not
    /// contain.
    MalformedTree { node: NodeId },
    /// No more scopes can be added.
    TooManyScopes { limit: usize },
    /// No more names can be interned.
    InternerFull { count: usize },
}

impl ConfigError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ConfigError::MissingKey { .. } => ErrorCode::E0001,
            ConfigError::KeyTypeMismatch { .. } => ErrorCode::E0002,
            ConfigError::NegativeTolerance { .. } => ErrorCode::E0003,
            ConfigError::ScopeChainTooDeep { .. } => ErrorCode::E0004,
            ConfigError::DuplicateScope { .. } => ErrorCode::E0005,
            ConfigError::InstanceParentMismatch { .. } => ErrorCode::E0006,
            ConfigError::ConflictingDeclaration { .. } => ErrorCode::E0007,
            ConfigError::StoreFormatMismatch { .. } => ErrorCode::E0008,
            ConfigError::DuplicateFormat { .. } => ErrorCode::E0009,
            ConfigError::InstanceScopeMismatch { .. } => ErrorCode::E0010,
            ConfigError::MalformedTree { .. } => ErrorCode::E0011,
            ConfigError::TooManyScopes { .. } => ErrorCode::E0012,
            ConfigError::InternerFull { .. } => ErrorCode::E0013,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.code()).with_message(self.to_string());
        match self {
            ConfigError::MissingKey { .. } => {
                diag.with_note("build contexts through a manager factory")
            }
            ConfigError::ScopeChainTooDeep { .. } => {
                diag.with_note("the scope hierarchy may contain a cycle")
            }
            ConfigError::MalformedTree { .. } => {
                diag.with_note("children must be built before their parent")
            }
            ConfigError::ConflictingDeclaration { .. } => {
                diag.with_suggestion("declare the variable in a child scope to shadow it")
            }
            _ => diag,
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingKey { key } => {
                write!(f, "context key `{key}` is not set and has no default")
            }
            ConfigError::KeyTypeMismatch { key, expected } => {
                write!(f, "context key `{key}` does not hold a `{expected}`")
            }
            ConfigError::NegativeTolerance { tolerance } => {
                write!(f, "tolerance must be non-negative, got {tolerance}")
            }
            ConfigError::ScopeChainTooDeep { start, limit } => write!(
                f,
                "scope chain starting at `{start}` exceeds {limit} ancestors"
            ),
            ConfigError::DuplicateScope { path } => {
                write!(f, "scope `{path}` is already defined")
            }
            ConfigError::InstanceParentMismatch {
                scope,
                expected,
                found,
            } => {
                let expected = expected.as_deref().unwrap_or("no parent");
                let found = found.as_deref().unwrap_or("no parent");
                write!(
                    f,
                    "instance of scope `{scope}` needs parent {expected}, got {found}"
                )
            }
            ConfigError::InstanceScopeMismatch { expected, found } => write!(
                f,
                "expected an instance of scope `{expected}`, got an instance of `{found}`"
            ),
            ConfigError::ConflictingDeclaration {
                variable,
                scope,
                existing,
                requested,
            } => write!(
                f,
                "variable `{variable}` in scope `{scope}` is already declared as {existing}, cannot redeclare as {requested}"
            ),
            ConfigError::StoreFormatMismatch { expected, found } => write!(
                f,
                "stored value has format {found}, variable expects {expected}"
            ),
            ConfigError::DuplicateFormat { name } => {
                write!(f, "format `{name}` is already registered")
            }
            ConfigError::MalformedTree { node } => {
                write!(f, "formula tree refers to {node:?}, which it does not contain")
            }
            ConfigError::TooManyScopes { limit } => {
                write!(f, "scope tree cannot hold more than {limit} scopes")
            }
            ConfigError::InternerFull { count } => {
                write!(f, "name interner is full after {count} names")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<InternError> for ConfigError {
    fn from(error: InternError) -> Self {
        match error {
            InternError::Overflow { count } => ConfigError::InternerFull { count },
        }
    }
}

/// Failure raised by a function or operator implementation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LibraryError {
    DivisionByZero,
    /// Argument outside the function's domain, or a non-finite result.
    Domain {
        function: String,
        message: String,
    },
}

impl LibraryError {
    pub fn domain(function: impl Into<String>, message: impl Into<String>) -> Self {
        LibraryError::Domain {
            function: function.into(),
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            LibraryError::DivisionByZero => ErrorCode::E3001,
            LibraryError::Domain { .. } => ErrorCode::E3002,
        }
    }
}

impl fmt::Display for LibraryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LibraryError::DivisionByZero => write!(f, "division by zero"),
            LibraryError::Domain { function, message } => {
                write!(f, "domain error in `{function}`: {message}")
            }
        }
    }
}

impl std::error::Error for LibraryError {}
