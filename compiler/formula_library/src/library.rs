//! Overloaded library entries keyed by function name or operator.

use std::fmt;
use std::hash::Hash;

use formula_ir::{Name, Operator};
use formula_types::{approx_eq, ConfigError, Format, LibraryError, Value};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Native implementation of one overload.
///
/// Arguments arrive already matched against the overload's signature.
pub type NativeFn = fn(&CallContext, &[Value]) -> Result<Value, LibraryError>;

/// Ambient settings a native overload may consult.
///
/// Built by the evaluation pass from the node's manager, so a decorating
/// factory can change them for one formula.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CallContext {
    tolerance: f64,
}

impl CallContext {
    /// Context whose numeric equality allows `tolerance` of difference.
    ///
    /// A negative or NaN tolerance is rejected here, so overloads never
    /// see one.
    pub fn with_tolerance(tolerance: f64) -> Result<Self, ConfigError> {
        approx_eq(0.0, 0.0, tolerance)?;
        Ok(CallContext { tolerance })
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }
}

/// Parameter formats and return format of one overload.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Signature {
    params: SmallVec<[Format; 3]>,
    ret: Format,
}

impl Signature {
    pub fn new(params: &[Format], ret: Format) -> Self {
        Signature {
            params: SmallVec::from_slice(params),
            ret,
        }
    }

    pub fn params(&self) -> &[Format] {
        &self.params
    }

    pub fn ret(&self) -> Format {
        self.ret
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Check if the signature takes exactly these argument formats.
    pub fn accepts(&self, args: &[Format]) -> bool {
        self.params.as_slice() == args
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{param}")?;
        }
        write!(f, ") -> {}", self.ret)
    }
}

/// A signature paired with its implementation.
#[derive(Clone, Debug)]
pub struct Overload {
    pub signature: Signature,
    pub func: NativeFn,
}

/// How the evaluator treats the arguments of a call.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum CallStrategy {
    /// Evaluate every argument, then call the overload.
    #[default]
    Eager,
    /// Evaluate the first argument as a Boolean condition, then only the
    /// branch it selects (second when true, third when false).
    Select,
    /// Evaluate the first argument; if it equals the carried Boolean the
    /// call yields it without evaluating the rest.
    ShortCircuit(bool),
}

/// Why a library call could not be resolved or run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallError {
    /// No entry for the key.
    Unknown,
    /// No overload takes this many arguments.
    WrongArgCount { expected: Vec<usize>, found: usize },
    /// Overloads with this arity exist, none takes these formats.
    NoMatchingOverload { found: Vec<Format> },
    /// The implementation itself failed.
    Failed(LibraryError),
}

impl fmt::Display for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallError::Unknown => write!(f, "not defined"),
            CallError::WrongArgCount { expected, found } => {
                let expected: Vec<String> = expected.iter().map(ToString::to_string).collect();
                write!(
                    f,
                    "expects {} arguments, got {found}",
                    expected.join(" or ")
                )
            }
            CallError::NoMatchingOverload { found } => {
                let found: Vec<&str> = found.iter().map(Format::name).collect();
                write!(f, "no overload accepts ({})", found.join(", "))
            }
            CallError::Failed(error) => write!(f, "{error}"),
        }
    }
}

impl std::error::Error for CallError {}

#[derive(Clone, Debug, Default)]
struct Entry {
    overloads: Vec<Overload>,
    strategy: CallStrategy,
}

/// Overloaded entries keyed by `K`.
///
/// Read-only once the formula manager is built, so shared freely between
/// threads.
#[derive(Clone, Debug)]
pub struct Library<K> {
    entries: FxHashMap<K, Entry>,
}

/// Functions keyed by interned name.
pub type FunctionLibrary = Library<Name>;

/// Operators keyed by `Operator`.
pub type OperatorLibrary = Library<Operator>;

impl<K> Default for Library<K> {
    fn default() -> Self {
        Library {
            entries: FxHashMap::default(),
        }
    }
}

impl<K: Copy + Eq + Hash + fmt::Debug> Library<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an overload.
    ///
    /// An existing overload with identical parameter formats is replaced.
    pub fn register(&mut self, key: K, signature: Signature, func: NativeFn) -> &mut Self {
        let entry = self.entries.entry(key).or_default();
        if let Some(existing) = entry
            .overloads
            .iter_mut()
            .find(|o| o.signature.params == signature.params)
        {
            tracing::debug!(?key, %signature, "overload replaced");
            *existing = Overload { signature, func };
        } else {
            entry.overloads.push(Overload { signature, func });
        }
        self
    }

    /// Set how the evaluator feeds arguments to `key`.
    pub fn set_strategy(&mut self, key: K, strategy: CallStrategy) -> &mut Self {
        self.entries.entry(key).or_default().strategy = strategy;
        self
    }

    pub fn contains(&self, key: K) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn overloads(&self, key: K) -> &[Overload] {
        self.entries
            .get(&key)
            .map_or(&[] as &[Overload], |entry| entry.overloads.as_slice())
    }

    pub fn strategy(&self, key: K) -> CallStrategy {
        self.entries
            .get(&key)
            .map_or(CallStrategy::Eager, |entry| entry.strategy)
    }

    /// Distinct arities accepted by `key`, ascending.
    pub fn arities(&self, key: K) -> Vec<usize> {
        let mut arities: Vec<usize> = self
            .overloads(key)
            .iter()
            .map(|o| o.signature.arity())
            .collect();
        arities.sort_unstable();
        arities.dedup();
        arities
    }

    /// Per-position argument format every overload of this arity agrees on.
    ///
    /// A position is `None` when overloads disagree about it. Returns
    /// `None` when `key` is unknown or has no overload of this arity.
    pub fn expected_formats(
        &self,
        key: K,
        arity: usize,
    ) -> Option<SmallVec<[Option<Format>; 4]>> {
        let mut candidates = self
            .overloads(key)
            .iter()
            .filter(|o| o.signature.arity() == arity);
        let first = candidates.next()?;
        let mut expected: SmallVec<[Option<Format>; 4]> =
            first.signature.params.iter().copied().map(Some).collect();
        for overload in candidates {
            for (slot, param) in expected.iter_mut().zip(overload.signature.params.iter()) {
                if *slot != Some(*param) {
                    *slot = None;
                }
            }
        }
        Some(expected)
    }

    /// Pick the overload taking exactly `args`.
    pub fn select(&self, key: K, args: &[Format]) -> Result<&Overload, CallError> {
        let entry = self.entries.get(&key).ok_or(CallError::Unknown)?;
        if let Some(overload) = entry.overloads.iter().find(|o| o.signature.accepts(args)) {
            return Ok(overload);
        }
        if entry.overloads.iter().any(|o| o.signature.arity() == args.len()) {
            Err(CallError::NoMatchingOverload {
                found: args.to_vec(),
            })
        } else {
            Err(CallError::WrongArgCount {
                expected: self.arities(key),
                found: args.len(),
            })
        }
    }

    /// Return format of the overload taking `args`.
    pub fn result_format(&self, key: K, args: &[Format]) -> Result<Format, CallError> {
        self.select(key, args).map(|o| o.signature.ret)
    }

    /// Run the overload matching the formats of `args`.
    pub fn evaluate(
        &self,
        key: K,
        context: &CallContext,
        args: &[Value],
    ) -> Result<Value, CallError> {
        let formats: SmallVec<[Format; 4]> = args.iter().map(Value::format).collect();
        let overload = self.select(key, &formats)?;
        (overload.func)(context, args).map_err(CallError::Failed)
    }

    /// Number of keys with at least one entry.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
