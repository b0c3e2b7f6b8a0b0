//! Semantics errors.

use std::fmt;

use formula_diagnostic::{Diagnostic, ErrorCode};
use formula_ir::{Operator, Span};
use formula_types::{ConfigError, Format};

/// A defect found while checking a formula.
///
/// Errors are accumulated; any error makes the formula unsafe to evaluate.
#[derive(Clone, Debug, PartialEq)]
pub enum SemanticsError {
    UnresolvedVariable {
        name: String,
        scope: String,
        span: Span,
    },
    UnknownFunction {
        name: String,
        span: Span,
    },
    UnknownOperator {
        op: Operator,
        span: Span,
    },
    WrongArgCount {
        callee: String,
        expected: Vec<usize>,
        found: usize,
        span: Span,
    },
    /// An argument's format differs from the one asserted for it.
    ArgumentFormatMismatch {
        expected: Format,
        found: Format,
        span: Span,
    },
    /// Overloads exist for this arity but none takes these formats.
    NoMatchingOverload {
        callee: String,
        found: Vec<Format>,
        span: Span,
    },
    /// The formula's format differs from the caller's assertion.
    RootFormatMismatch {
        expected: Format,
        found: Format,
        span: Span,
    },
    NestingTooDeep {
        limit: usize,
        span: Span,
    },
    Config(ConfigError),
}

impl SemanticsError {
    pub fn code(&self) -> ErrorCode {
        match self {
            SemanticsError::UnresolvedVariable { .. } => ErrorCode::E1001,
            SemanticsError::UnknownFunction { .. } => ErrorCode::E1002,
            SemanticsError::UnknownOperator { .. } => ErrorCode::E1003,
            SemanticsError::WrongArgCount { .. } => ErrorCode::E1004,
            SemanticsError::ArgumentFormatMismatch { .. } => ErrorCode::E1005,
            SemanticsError::NoMatchingOverload { .. } => ErrorCode::E1006,
            SemanticsError::RootFormatMismatch { .. } => ErrorCode::E1007,
            SemanticsError::NestingTooDeep { .. } => ErrorCode::E1008,
            SemanticsError::Config(error) => error.code(),
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            SemanticsError::UnresolvedVariable { span, .. }
            | SemanticsError::UnknownFunction { span, .. }
            | SemanticsError::UnknownOperator { span, .. }
            | SemanticsError::WrongArgCount { span, .. }
            | SemanticsError::ArgumentFormatMismatch { span, .. }
            | SemanticsError::NoMatchingOverload { span, .. }
            | SemanticsError::RootFormatMismatch { span, .. }
            | SemanticsError::NestingTooDeep { span, .. } => Some(*span),
            SemanticsError::Config(_) => None,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let SemanticsError::Config(error) = self else {
            let span = self.span().unwrap_or(Span::DUMMY);
            let diag = Diagnostic::error(self.code())
                .with_message(self.to_string())
                .with_label(span, self.label());
            return match self {
                SemanticsError::UnresolvedVariable { .. } => {
                    diag.with_suggestion("declare the variable in this scope or an enclosing one")
                }
                SemanticsError::RootFormatMismatch { expected, .. } => {
                    diag.with_note(format!("the formula was required to produce {expected}"))
                }
                _ => diag,
            };
        };
        error.to_diagnostic()
    }

    fn label(&self) -> String {
        match self {
            SemanticsError::UnresolvedVariable { .. } => "not found".to_owned(),
            SemanticsError::UnknownFunction { .. } | SemanticsError::UnknownOperator { .. } => {
                "not defined".to_owned()
            }
            SemanticsError::WrongArgCount { found, .. } => format!("{found} arguments"),
            SemanticsError::ArgumentFormatMismatch { expected, .. } => {
                format!("expected {expected}")
            }
            SemanticsError::NoMatchingOverload { .. } => "no matching overload".to_owned(),
            SemanticsError::RootFormatMismatch { found, .. } => format!("this is {found}"),
            SemanticsError::NestingTooDeep { .. } => "nested too deeply".to_owned(),
            SemanticsError::Config(_) => String::new(),
        }
    }
}

impl fmt::Display for SemanticsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticsError::UnresolvedVariable { name, scope, .. } => {
                write!(f, "variable `{name}` is not declared in scope `{scope}`")
            }
            SemanticsError::UnknownFunction { name, .. } => {
                write!(f, "unknown function `{name}`")
            }
            SemanticsError::UnknownOperator { op, .. } => {
                write!(f, "unknown operator `{op}`")
            }
            SemanticsError::WrongArgCount {
                callee,
                expected,
                found,
                ..
            } => {
                let expected: Vec<String> = expected.iter().map(ToString::to_string).collect();
                write!(
                    f,
                    "`{callee}` takes {} arguments, {found} given",
                    expected.join(" or ")
                )
            }
            SemanticsError::ArgumentFormatMismatch {
                expected, found, ..
            } => write!(f, "argument has format {found}, expected {expected}"),
            SemanticsError::NoMatchingOverload { callee, found, .. } => {
                let found: Vec<&str> = found.iter().map(Format::name).collect();
                write!(f, "no overload of `{callee}` accepts ({})", found.join(", "))
            }
            SemanticsError::RootFormatMismatch {
                expected, found, ..
            } => write!(f, "formula produces {found}, expected {expected}"),
            SemanticsError::NestingTooDeep { limit, .. } => {
                write!(f, "formula nests deeper than {limit} levels")
            }
            SemanticsError::Config(error) => write!(f, "{error}"),
        }
    }
}

impl std::error::Error for SemanticsError {}

impl From<ConfigError> for SemanticsError {
    fn from(error: ConfigError) -> Self {
        SemanticsError::Config(error)
    }
}
