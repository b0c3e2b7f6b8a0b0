//! Tolerance comparison for numeric results.

use crate::ConfigError;

/// Compare two numbers, allowing them to differ by at most `tolerance`.
///
/// Equal numbers compare equal for every valid tolerance, zero included.
/// A negative or NaN tolerance is a configuration error.
pub fn approx_eq(a: f64, b: f64, tolerance: f64) -> Result<bool, ConfigError> {
    if !(tolerance >= 0.0) {
        return Err(ConfigError::NegativeTolerance { tolerance });
    }
    #[allow(clippy::float_cmp)]
    let exact = a == b;
    Ok(exact || (a - b).abs() <= tolerance)
}
