//! Scope hierarchy and variable resolution.
//!
//! Two parallel hierarchies live here:
//!
//! - **Legal scopes** are static, named nodes created when a rule set is
//!   loaded (`Global`, `Global.Equipment`, ...). Variables are declared
//!   against legal scopes.
//! - **Scope instances** bind a legal scope to one concrete subject at
//!   runtime (the `Global.Equipment` scope of one particular sword).
//!
//! Resolution walks from a start scope (or instance) towards the root; the
//! nearest declaring ancestor wins. The walk is bounded so a malformed
//! hierarchy reports an error instead of recursing forever.

mod instance;
mod scope;
mod store;
mod variable;

pub use instance::{InstanceId, ScopeInstance, ScopeInstanceFactory};
pub use scope::{LegalScope, ScopeId, ScopeTree};
pub use store::{SimpleVariableStore, VariableStore};
pub use variable::{ResolveError, VariableId, VariableLibrary};
