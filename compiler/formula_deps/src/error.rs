use std::fmt;

use formula_diagnostic::{Diagnostic, ErrorCode};
use formula_ir::Span;
use formula_types::ConfigError;

/// Dependency capture failure. The pass stops at the first one.
#[derive(Clone, Debug, PartialEq)]
pub enum DependencyError {
    UnresolvedVariable {
        name: String,
        scope: String,
        span: Span,
    },
    NestingTooDeep {
        limit: usize,
        span: Span,
    },
    Config(ConfigError),
}

impl DependencyError {
    pub fn code(&self) -> ErrorCode {
        match self {
            DependencyError::UnresolvedVariable { .. } => ErrorCode::E2001,
            DependencyError::NestingTooDeep { .. } => ErrorCode::E2002,
            DependencyError::Config(error) => error.code(),
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            DependencyError::UnresolvedVariable { span, .. } => Diagnostic::error(self.code())
                .with_message(self.to_string())
                .with_label(*span, "not found")
                .with_note("run the semantics pass before capturing dependencies"),
            DependencyError::NestingTooDeep { span, .. } => Diagnostic::error(self.code())
                .with_message(self.to_string())
                .with_label(*span, "nested too deeply"),
            DependencyError::Config(error) => error.to_diagnostic(),
        }
    }
}

impl fmt::Display for DependencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyError::UnresolvedVariable { name, scope, .. } => write!(
                f,
                "variable `{name}` cannot be resolved from an instance of `{scope}`"
            ),
            DependencyError::NestingTooDeep { limit, .. } => {
                write!(f, "formula nests deeper than {limit} levels")
            }
            DependencyError::Config(error) => write!(f, "{error}"),
        }
    }
}

impl std::error::Error for DependencyError {}

impl From<ConfigError> for DependencyError {
    fn from(error: ConfigError) -> Self {
        DependencyError::Config(error)
    }
}
