//! Formats and runtime values.
//!
//! A `Format` is the static type tag of a formula result or a declared
//! variable; a `Value` is what evaluation produces. Every `Value` knows its
//! `Format`, which is how the engine checks that the semantics pass and
//! the evaluation pass agree.
//!
//! This crate also owns the error types shared by more than one pass:
//! `ConfigError` for caller misuse and `LibraryError` for failures raised
//! by function and operator implementations.

mod error;
mod format;
mod tolerance;
mod value;

pub use error::{ConfigError, LibraryError};
pub use format::{CustomFormat, Format, FormatRegistry};
pub use tolerance::approx_eq;
pub use value::{ObjectRef, Value};
