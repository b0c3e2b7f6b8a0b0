//! Function and operator libraries.
//!
//! A library maps a key (an interned function name, or an `Operator`) to a
//! set of overloads. Each overload has a `Signature` and a native
//! implementation. The semantics pass asks a library for result formats,
//! the evaluation pass asks it to run an overload.
//!
//! `builtins::install` registers the standard operators and functions.

pub mod builtins;
mod library;

pub use library::{
    CallContext, CallError, CallStrategy, FunctionLibrary, Library, NativeFn, OperatorLibrary,
    Overload, Signature,
};
