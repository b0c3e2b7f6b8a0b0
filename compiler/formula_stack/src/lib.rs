//! Stack safety for recursive formula passes.
//!
//! Every pass walks the formula tree recursively. Two safeguards apply:
//!
//! - [`ensure_sufficient_stack`] grows the native stack on demand, so a
//!   legal but deep tree never overflows.
//! - [`DepthGuard`] enforces the configured maximum nesting depth, turning a
//!   runaway tree into a reported error instead of unbounded work.

use std::fmt;

/// Minimum stack space to keep available (100KB red zone).
const RED_ZONE: usize = 100 * 1024;

/// Stack space to allocate when growing (1MB).
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Ensure sufficient stack space is available before executing `f`.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

/// Nesting limit was exceeded.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DepthExceeded {
    /// The configured limit.
    pub limit: usize,
}

impl fmt::Display for DepthExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "nesting exceeds the limit of {}", self.limit)
    }
}

impl std::error::Error for DepthExceeded {}

/// Tracks recursion depth against a fixed limit.
///
/// Callers pair every successful [`enter`](DepthGuard::enter) with an
/// [`exit`](DepthGuard::exit).
#[derive(Debug)]
pub struct DepthGuard {
    depth: usize,
    limit: usize,
}

impl DepthGuard {
    /// Create a guard allowing at most `limit` nested levels.
    pub fn new(limit: usize) -> Self {
        DepthGuard { depth: 0, limit }
    }

    /// Enter one level.
    pub fn enter(&mut self) -> Result<(), DepthExceeded> {
        if self.depth >= self.limit {
            return Err(DepthExceeded { limit: self.limit });
        }
        self.depth += 1;
        Ok(())
    }

    /// Leave one level.
    pub fn exit(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Current depth.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Configured limit.
    pub fn limit(&self) -> usize {
        self.limit
    }
}
