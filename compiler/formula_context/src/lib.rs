//! Context propagation for formula passes.
//!
//! Every pass walks a formula tree carrying a small typed container of
//! ambient state: the formula manager, the scope or scope instance the
//! formula is processed against, and the format asserted for the current
//! node. Containers are copy-on-derive: a child visit gets a derived
//! container with one key changed, the parent's is never touched.
//!
//! # Pieces
//!
//! - `TypedKey<T>`: a key whose value type is fixed where the key is
//!   defined.
//! - `ContextMap`: the shared heterogeneous map behind every manager.
//! - `SemanticsManager`, `DependencyManager`, `EvaluationManager`: one
//!   container flavor per pass.
//! - `ManagerFactory`: the only place that builds correctly populated
//!   managers. Extend it by decoration.
//! - `FormulaManager`: the read-only registry every pass consults.

mod factory;
mod key;
pub mod keys;
mod manager;
mod managers;
mod map;

pub use factory::{DefaultManagerFactory, ManagerFactory};
pub use key::TypedKey;
pub use manager::{FormulaConfig, FormulaManager, FormulaManagerBuilder, SharedFormulaManager};
pub use managers::{
    DependencyCollector, DependencyManager, DependencySet, EvaluationManager, SemanticsManager,
};
pub use map::ContextMap;
