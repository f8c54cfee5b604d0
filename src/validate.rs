//! Input validation helpers.
//!
//! Uses `!is_finite()` to reject NaN, +Inf and -Inf uniformly.

use crate::error::{Result, VolSurfError};

/// Strictly positive and finite (rejects NaN, Inf, zero, negatives).
pub(crate) fn validate_positive(value: f64, name: &str) -> Result<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(VolSurfError::InvalidInput {
            message: format!("{name} must be positive and finite, got {value}"),
        });
    }
    Ok(value)
}

/// Finite (rejects NaN and Inf; allows zero and negatives).
pub(crate) fn validate_finite(value: f64, name: &str) -> Result<f64> {
    if !value.is_finite() {
        return Err(VolSurfError::InvalidInput {
            message: format!("{name} must be finite, got {value}"),
        });
    }
    Ok(value)
}

/// Strictly inside the open unit interval `(0, 1)`.
pub(crate) fn validate_open_unit(value: f64, name: &str) -> Result<f64> {
    if !value.is_finite() || value <= 0.0 || value >= 1.0 {
        return Err(VolSurfError::InvalidInput {
            message: format!("{name} must lie in (0, 1), got {value}"),
        });
    }
    Ok(value)
}
