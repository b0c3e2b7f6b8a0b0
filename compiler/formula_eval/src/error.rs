//! Evaluation errors.

use std::fmt;

use formula_diagnostic::{Diagnostic, ErrorCode};
use formula_ir::Span;
use formula_types::{ConfigError, Format, LibraryError};

/// Evaluation failure. Evaluation aborts at the first one.
#[derive(Clone, Debug, PartialEq)]
pub enum EvalError {
    /// A function or operator implementation failed.
    Library { error: LibraryError, span: Span },
    UnresolvedVariable {
        name: String,
        scope: String,
        span: Span,
    },
    UnknownFunction { name: String, span: Span },
    /// No overload accepts the runtime argument values.
    NoMatchingOverload {
        callee: String,
        found: Vec<Format>,
        span: Span,
    },
    NestingTooDeep { limit: usize, span: Span },
    /// The variable has no stored value and its format has no default.
    UnsetVariable { name: String, span: Span },
    Config(ConfigError),
}

impl EvalError {
    pub fn code(&self) -> ErrorCode {
        match self {
            EvalError::Library { error, .. } => error.code(),
            EvalError::UnresolvedVariable { .. } => ErrorCode::E3003,
            EvalError::UnknownFunction { .. } => ErrorCode::E3004,
            EvalError::NoMatchingOverload { .. } => ErrorCode::E3005,
            EvalError::NestingTooDeep { .. } => ErrorCode::E3006,
            EvalError::UnsetVariable { .. } => ErrorCode::E3007,
            EvalError::Config(error) => error.code(),
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            EvalError::Library { span, .. }
            | EvalError::UnresolvedVariable { span, .. }
            | EvalError::UnknownFunction { span, .. }
            | EvalError::NoMatchingOverload { span, .. }
            | EvalError::NestingTooDeep { span, .. }
            | EvalError::UnsetVariable { span, .. } => Some(*span),
            EvalError::Config(_) => None,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        if let EvalError::Config(error) = self {
            return error.to_diagnostic();
        }
        let span = self.span().unwrap_or(Span::DUMMY);
        let diag = Diagnostic::error(self.code())
            .with_message(self.to_string())
            .with_label(span, "evaluation failed here");
        match self {
            EvalError::Library {
                error: LibraryError::DivisionByZero,
                ..
            } => diag.with_suggestion("guard the divisor with `if`"),
            EvalError::UnresolvedVariable { .. }
            | EvalError::UnknownFunction { .. }
            | EvalError::NoMatchingOverload { .. } => {
                diag.with_note("the formula was not checked against this scope")
            }
            _ => diag,
        }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::Library { error, .. } => write!(f, "{error}"),
            EvalError::UnresolvedVariable { name, scope, .. } => write!(
                f,
                "variable `{name}` cannot be resolved from an instance of `{scope}`"
            ),
            EvalError::UnknownFunction { name, .. } => write!(f, "unknown function `{name}`"),
            EvalError::NoMatchingOverload { callee, found, .. } => {
                let found: Vec<&str> = found.iter().map(Format::name).collect();
                write!(f, "no overload of `{callee}` accepts ({})", found.join(", "))
            }
            EvalError::NestingTooDeep { limit, .. } => {
                write!(f, "formula nests deeper than {limit} levels")
            }
            EvalError::UnsetVariable { name, .. } => {
                write!(f, "variable `{name}` has no value and no default")
            }
            EvalError::Config(error) => write!(f, "{error}"),
        }
    }
}

impl std::error::Error for EvalError {}

impl From<ConfigError> for EvalError {
    fn from(error: ConfigError) -> Self {
        EvalError::Config(error)
    }
}
