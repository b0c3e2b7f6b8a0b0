//! Keys every manager flavor understands.

use formula_scope::{LegalScope, ScopeInstance};
use formula_types::Format;

use crate::{DependencyCollector, SharedFormulaManager, TypedKey};

/// The formula manager. Always present.
pub const FMANAGER: TypedKey<SharedFormulaManager> = TypedKey::new("FMANAGER");

/// Legal scope a formula is checked against (semantics).
pub const SCOPE: TypedKey<LegalScope> = TypedKey::new("SCOPE");

/// Scope instance a formula runs against (dependency, evaluation).
pub const INSTANCE: TypedKey<ScopeInstance> = TypedKey::new("INSTANCE");

/// Format the current node must produce, if constrained.
pub const ASSERTED: TypedKey<Option<Format>> = TypedKey::with_default("ASSERTED", no_assertion);

/// Collector the dependency pass adds resolved variables to.
pub const VARIABLES: TypedKey<DependencyCollector> = TypedKey::new("VARIABLES");

/// Largest difference at which `==` still treats two numbers as equal
/// (evaluation). Zero unless a factory sets it.
pub const TOLERANCE: TypedKey<f64> = TypedKey::with_default("TOLERANCE", exact);

fn no_assertion() -> Option<Format> {
    None
}

fn exact() -> f64 {
    0.0
}
