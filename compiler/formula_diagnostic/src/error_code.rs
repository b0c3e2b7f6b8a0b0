use std::fmt;

/// Error codes for all formula diagnostics.
///
/// Format: E#### where the first digit indicates the phase that reports it.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Configuration Errors (E0xxx)
    /// Required context key missing
    E0001,
    /// Context key holds a value of the wrong type
    E0002,
    /// Negative comparison tolerance
    E0003,
    /// Scope ancestor chain exceeds the configured depth
    E0004,
    /// Duplicate scope name
    E0005,
    /// Scope instance parent does not match the scope hierarchy
    E0006,
    /// Variable redeclared with a different format
    E0007,
    /// Stored value does not match the variable's format
    E0008,
    /// Duplicate custom format
    E0009,
    /// Scope instance does not belong to the checked scope
    E0010,
    /// Formula tree references a node that was never built
    E0011,
    /// Scope tree is full
    E0012,
    /// String interner is full
    E0013,

    // Semantics Errors (E1xxx)
    /// Unresolved variable
    E1001,
    /// Unknown function
    E1002,
    /// Unknown operator
    E1003,
    /// Wrong number of arguments
    E1004,
    /// Argument format mismatch
    E1005,
    /// No overload accepts the argument formats
    E1006,
    /// Root format does not match the asserted format
    E1007,
    /// Formula nested too deeply
    E1008,

    // Dependency Errors (E2xxx)
    /// Variable unresolved during dependency capture
    E2001,
    /// Formula nested too deeply during dependency capture
    E2002,

    // Evaluation Errors (E3xxx)
    /// Division by zero
    E3001,
    /// Argument outside the function's domain
    E3002,
    /// Variable unresolved during evaluation
    E3003,
    /// Unknown function or operator during evaluation
    E3004,
    /// No overload accepts the runtime argument values
    E3005,
    /// Formula nested too deeply during evaluation
    E3006,
    /// Variable has neither a stored value nor a format default
    E3007,
}

/// Processing phase an error code belongs to.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Phase {
    Configuration,
    Semantics,
    Dependency,
    Evaluation,
}

impl ErrorCode {
    /// Get the code as a string (e.g., "E1001").
    pub fn as_str(&self) -> &'static str {
        match self {
            // Configuration
            ErrorCode::E0001 => "E0001",
            ErrorCode::E0002 => "E0002",
            ErrorCode::E0003 => "E0003",
            ErrorCode::E0004 => "E0004",
            ErrorCode::E0005 => "E0005",
            ErrorCode::E0006 => "E0006",
            ErrorCode::E0007 => "E0007",
            ErrorCode::E0008 => "E0008",
            ErrorCode::E0009 => "E0009",
            ErrorCode::E0010 => "E0010",
            ErrorCode::E0011 => "E0011",
            ErrorCode::E0012 => "E0012",
            ErrorCode::E0013 => "E0013",
            // Semantics
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E1006 => "E1006",
            ErrorCode::E1007 => "E1007",
            ErrorCode::E1008 => "E1008",
            // Dependency
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            // Evaluation
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E3003 => "E3003",
            ErrorCode::E3004 => "E3004",
            ErrorCode::E3005 => "E3005",
            ErrorCode::E3006 => "E3006",
            ErrorCode::E3007 => "E3007",
        }
    }

    /// Phase that reports this code.
    pub fn phase(&self) -> Phase {
        match self.as_str().as_bytes().get(1) {
            Some(b'0') => Phase::Configuration,
            Some(b'1') => Phase::Semantics,
            Some(b'2') => Phase::Dependency,
            _ => Phase::Evaluation,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
