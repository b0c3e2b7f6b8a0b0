//! Formula engine.
//!
//! Ties the passes together. A formula is a tree built with
//! [`TreeBuilder`]; the host registers scopes, variables, formats and
//! library entries on a [`FormulaManagerBuilder`], then drives the three
//! passes through managers made by a [`ManagerFactory`]:
//!
//! - [`run_semantics`] infers the formula's format for a legal scope.
//! - [`run_dependency`] collects the variables it reads for an instance.
//! - [`run_evaluation`] computes its value for an instance.
//!
//! Dependency and evaluation assume the formula passed semantics for the
//! instance's scope. [`Formula::check`] is the only way to obtain a
//! [`CheckedFormula`], which is the only handle the later passes accept.

mod formula;

use std::sync::Once;

pub use formula::{CheckedFormula, Formula};

pub use formula_check::{run_semantics, SemanticsError};
pub use formula_context::{
    keys, ContextMap, DefaultManagerFactory, DependencyManager, DependencySet, EvaluationManager,
    FormulaConfig, FormulaManager, FormulaManagerBuilder, ManagerFactory, SemanticsManager,
    SharedFormulaManager, TypedKey,
};
pub use formula_deps::{run_dependency, DependencyError};
pub use formula_diagnostic::{Diagnostic, ErrorCode};
pub use formula_eval::{run_evaluation, EvalError};
pub use formula_ir::{FormulaTree, Name, NodeId, Operator, SharedInterner, Span, TreeBuilder};
pub use formula_library::{
    CallContext, CallStrategy, FunctionLibrary, NativeFn, OperatorLibrary, Signature,
};
pub use formula_scope::{
    LegalScope, ScopeInstance, SimpleVariableStore, VariableId, VariableStore,
};
pub use formula_types::{approx_eq, ConfigError, Format, LibraryError, ObjectRef, Value};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call more than once. Does nothing unless `RUST_LOG` is set,
/// e.g. `RUST_LOG=formula_check=debug` or `RUST_LOG=formula_eval=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
