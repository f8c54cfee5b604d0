//! Safeguarded Newton-Raphson root finding.
//!
//! Newton steps are taken while they stay inside the current bracket and the
//! slope is positive; otherwise the step falls back to bisection. The target
//! function must be increasing across the root, so a negative residual moves
//! the lower bracket and a positive one the upper bracket.

use crate::error::{Result, VolSurfError};

/// Stopping rule for [`bracketed_newton`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RootConfig {
    /// Converged once `|f(x)| <= tolerance`.
    pub tolerance: f64,
    /// Maximum number of steps after the initial evaluation.
    pub max_iterations: usize,
}

/// Result of a root search, converged or not.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RootOutcome {
    pub root: f64,
    pub residual: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Find `x ∈ (lo, hi)` with `f(x) = 0`, where `f` returns `(value, slope)`.
///
/// A starting point outside the open bracket is replaced by its midpoint.
/// Running out of iterations is not an error: the outcome reports
/// `converged = false` along with the last residual so the caller can decide.
///
/// # Errors
/// [`VolSurfError::NumericalError`] if `f` returns a non-finite value.
pub(crate) fn bracketed_newton<F>(
    mut f: F,
    x0: f64,
    mut lo: f64,
    mut hi: f64,
    config: RootConfig,
) -> Result<RootOutcome>
where
    F: FnMut(f64) -> (f64, f64),
{
    let mut x = if x0 > lo && x0 < hi {
        x0
    } else {
        0.5 * (lo + hi)
    };
    let mut residual = f64::NAN;

    for iteration in 0..=config.max_iterations {
        let (value, slope) = f(x);
        if !value.is_finite() {
            return Err(VolSurfError::NumericalError {
                message: format!("root function returned {value} at x={x}"),
            });
        }
        residual = value;
        if value.abs() <= config.tolerance {
            return Ok(RootOutcome {
                root: x,
                residual,
                iterations: iteration,
                converged: true,
            });
        }
        if iteration == config.max_iterations {
            break;
        }

        if value < 0.0 {
            lo = x;
        } else {
            hi = x;
        }
        let newton = x - value / slope;
        x = if slope > 0.0 && newton > lo && newton < hi {
            newton
        } else {
            0.5 * (lo + hi)
        };
    }

    Ok(RootOutcome {
        root: x,
        residual,
        iterations: config.max_iterations,
        converged: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const CONFIG: RootConfig = RootConfig {
        tolerance: 1e-12,
        max_iterations: 50,
    };

    #[test]
    fn solves_cubic() {
        let cubic = |x: f64| (x * x * x - 0.125, 3.0 * x * x);
        let out = bracketed_newton(cubic, 0.9, 0.0, 1.0, CONFIG).unwrap();
        assert!(out.converged);
        assert_abs_diff_eq!(out.root, 0.5, epsilon = 1e-10);
        assert!(out.iterations < 10);
    }

    #[test]
    fn bisects_when_slope_is_useless() {
        // Zero slope everywhere forces pure bisection.
        let out = bracketed_newton(|x| (x - 0.3, 0.0), 0.9, 0.0, 1.0, CONFIG).unwrap();
        assert!(out.converged);
        assert_abs_diff_eq!(out.root, 0.3, epsilon = 1e-12);
    }

    #[test]
    fn seed_outside_bracket_starts_at_midpoint() {
        let mut first = None;
        let _ = bracketed_newton(
            |x| {
                first.get_or_insert(x);
                (x - 0.7, 1.0)
            },
            5.0,
            0.0,
            1.0,
            CONFIG,
        )
        .unwrap();
        assert_eq!(first, Some(0.5));
    }

    #[test]
    fn reports_non_convergence_with_residual() {
        let config = RootConfig {
            tolerance: 1e-14,
            max_iterations: 2,
        };
        let out = bracketed_newton(|x| (x - 0.3, 0.0), 0.9, 0.0, 1.0, config).unwrap();
        assert!(!out.converged);
        assert_eq!(out.iterations, 2);
        assert!(out.residual.abs() > 1e-14);
    }

    #[test]
    fn zero_iterations_only_evaluates_seed() {
        let config = RootConfig {
            tolerance: 1e-12,
            max_iterations: 0,
        };
        let out = bracketed_newton(|x| (x - 0.5, 1.0), 0.5, 0.0, 1.0, config).unwrap();
        assert!(out.converged);
        assert_eq!(out.iterations, 0);
    }

    #[test]
    fn non_finite_value_is_an_error() {
        let result = bracketed_newton(|_| (f64::NAN, 1.0), 0.5, 0.0, 1.0, CONFIG);
        assert!(matches!(result, Err(VolSurfError::NumericalError { .. })));
    }
}
