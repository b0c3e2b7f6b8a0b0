//! Diagnostic system for formula errors.
//!
//! Every error the engine can report converts into a `Diagnostic`:
//! - an `ErrorCode` for searchability
//! - a message saying what went wrong
//! - labeled spans saying where
//! - notes and suggestions saying how to fix it
//!
//! Error code ranges follow the processing phase:
//! - `E0xxx`: configuration / caller misuse
//! - `E1xxx`: semantics pass
//! - `E2xxx`: dependency pass
//! - `E3xxx`: evaluation pass

mod diagnostic;
mod error_code;

pub use diagnostic::{Diagnostic, Label};
pub use error_code::{ErrorCode, Phase};
