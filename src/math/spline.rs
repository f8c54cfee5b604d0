//! Natural cubic spline with flat extrapolation.
//!
//! Knots are solved with the Thomas algorithm under natural boundary
//! conditions (`S''(x₀) = S''(xₙ₋₁) = 0`). Evaluation is a binary search plus
//! Horner form. Outside the knot range the spline holds the end values and
//! its derivative is zero.

use serde::Serialize;

use crate::error::{Result, VolSurfError};

/// Coefficients for one cubic polynomial interval.
///
/// On interval \[xᵢ, xᵢ₊₁\], the spline is:
/// `S(x) = a + b·(x - xᵢ) + c·(x - xᵢ)² + d·(x - xᵢ)³`
#[derive(Debug, Clone, Serialize)]
struct SplineCoeff {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
}

/// Natural cubic spline through `(x, y)` knots.
///
/// A single knot yields a constant function; two knots yield a line.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct CubicSpline {
    x: Vec<f64>,
    y: Vec<f64>,
    coeffs: Vec<SplineCoeff>,
}

impl CubicSpline {
    /// # Errors
    /// [`VolSurfError::InvalidInput`] if the knots are empty, of mismatched
    /// length, non-finite, or not strictly increasing in `x`.
    pub(crate) fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self> {
        if x.is_empty() || x.len() != y.len() {
            return Err(VolSurfError::InvalidInput {
                message: format!(
                    "spline needs matching non-empty knots, got {} x and {} y",
                    x.len(),
                    y.len()
                ),
            });
        }
        if let Some(bad) = x.iter().chain(y.iter()).find(|v| !v.is_finite()) {
            return Err(VolSurfError::InvalidInput {
                message: format!("spline knots must be finite, got {bad}"),
            });
        }
        for (i, w) in x.windows(2).enumerate() {
            if w[1] <= w[0] {
                return Err(VolSurfError::InvalidInput {
                    message: format!(
                        "spline abscissae must be strictly increasing, but x[{}]={} >= x[{}]={}",
                        i,
                        w[0],
                        i + 1,
                        w[1]
                    ),
                });
            }
        }
        let coeffs = build_spline_coefficients(&x, &y);
        Ok(Self { x, y, coeffs })
    }

    pub(crate) fn knots(&self) -> (&[f64], &[f64]) {
        (&self.x, &self.y)
    }

    pub(crate) fn eval(&self, t: f64) -> f64 {
        match self.locate(t) {
            Located::Below => self.y[0],
            Located::Above => self.y[self.y.len() - 1],
            Located::Inside(i, dx) => {
                let c = &self.coeffs[i];
                c.a + dx * (c.b + dx * (c.c + dx * c.d))
            }
        }
    }

    /// First derivative; zero in the flat extrapolation regions.
    pub(crate) fn derivative(&self, t: f64) -> f64 {
        match self.locate(t) {
            Located::Below | Located::Above => 0.0,
            Located::Inside(i, dx) => {
                let c = &self.coeffs[i];
                c.b + dx * (2.0 * c.c + 3.0 * dx * c.d)
            }
        }
    }

    fn locate(&self, t: f64) -> Located {
        let n = self.x.len();
        if t <= self.x[0] {
            return Located::Below;
        }
        if t >= self.x[n - 1] {
            return Located::Above;
        }
        let i = self.x.partition_point(|&k| k < t) - 1;
        Located::Inside(i, t - self.x[i])
    }
}

enum Located {
    Below,
    Above,
    Inside(usize, f64),
}

/// Solve the natural cubic spline tridiagonal system and return
/// per-interval coefficients.
fn build_spline_coefficients(x: &[f64], y: &[f64]) -> Vec<SplineCoeff> {
    let n = x.len();
    let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();

    // Second-derivative coefficients with c[0] = c[n-1] = 0.
    let mut c = vec![0.0; n];

    if n > 2 {
        let m = n - 2;
        let mut diag = vec![0.0; m];
        let mut rhs = vec![0.0; m];

        for j in 0..m {
            let i = j + 1;
            diag[j] = 2.0 * (h[i - 1] + h[i]);
            rhs[j] = 3.0 * ((y[i + 1] - y[i]) / h[i] - (y[i] - y[i - 1]) / h[i - 1]);
        }

        // Forward sweep
        for j in 1..m {
            let w = h[j] / diag[j - 1];
            diag[j] -= w * h[j];
            rhs[j] -= w * rhs[j - 1];
        }

        // Back substitution
        c[m] = rhs[m - 1] / diag[m - 1];
        for j in (0..m - 1).rev() {
            let i = j + 1;
            c[i] = (rhs[j] - h[j + 1] * c[i + 1]) / diag[j];
        }
    }

    (0..n.saturating_sub(1))
        .map(|i| SplineCoeff {
            a: y[i],
            b: (y[i + 1] - y[i]) / h[i] - h[i] * (2.0 * c[i] + c[i + 1]) / 3.0,
            c: c[i],
            d: (c[i + 1] - c[i]) / (3.0 * h[i]),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn smile_knots() -> CubicSpline {
        CubicSpline::new(
            vec![0.10, 0.25, 0.50, 0.75, 0.90],
            vec![0.118, 0.106, 0.100, 0.112, 0.132],
        )
        .unwrap()
    }

    #[test]
    fn passes_through_knots() {
        let s = smile_knots();
        let (xs, ys) = s.knots();
        for (x, y) in xs.iter().zip(ys) {
            assert_abs_diff_eq!(s.eval(*x), *y, epsilon = 1e-15);
        }
    }

    #[test]
    fn flat_outside_knots() {
        let s = smile_knots();
        assert_abs_diff_eq!(s.eval(0.01), 0.118, epsilon = 1e-15);
        assert_abs_diff_eq!(s.eval(0.99), 0.132, epsilon = 1e-15);
        assert_eq!(s.derivative(0.05), 0.0);
        assert_eq!(s.derivative(0.95), 0.0);
    }

    #[test]
    fn recovers_linear_function_exactly() {
        let f = |x: f64| 0.2 - 0.05 * x;
        let xs = vec![0.1, 0.3, 0.5, 0.7, 0.9];
        let ys = xs.iter().map(|&x| f(x)).collect();
        let s = CubicSpline::new(xs, ys).unwrap();
        for x in [0.2, 0.45, 0.8] {
            assert_abs_diff_eq!(s.eval(x), f(x), epsilon = 1e-15);
            assert_abs_diff_eq!(s.derivative(x), -0.05, epsilon = 1e-13);
        }
    }

    #[test]
    fn derivative_matches_finite_difference() {
        let s = smile_knots();
        let h = 1e-6;
        for x in [0.15, 0.4, 0.6, 0.85] {
            let fd = (s.eval(x + h) - s.eval(x - h)) / (2.0 * h);
            assert_abs_diff_eq!(s.derivative(x), fd, epsilon = 1e-6);
        }
    }

    #[test]
    fn single_knot_is_constant() {
        let s = CubicSpline::new(vec![0.5], vec![0.11]).unwrap();
        for x in [0.01, 0.5, 0.99] {
            assert_abs_diff_eq!(s.eval(x), 0.11, epsilon = 1e-15);
            assert_eq!(s.derivative(x), 0.0);
        }
    }

    #[test]
    fn two_knots_are_linear() {
        let s = CubicSpline::new(vec![0.25, 0.75], vec![0.10, 0.12]).unwrap();
        assert_abs_diff_eq!(s.eval(0.5), 0.11, epsilon = 1e-15);
    }

    #[test]
    fn rejects_bad_knots() {
        assert!(CubicSpline::new(vec![], vec![]).is_err());
        assert!(CubicSpline::new(vec![0.1, 0.2], vec![0.1]).is_err());
        assert!(CubicSpline::new(vec![0.2, 0.2], vec![0.1, 0.1]).is_err());
        assert!(CubicSpline::new(vec![0.3, 0.2], vec![0.1, 0.1]).is_err());
        assert!(
            CubicSpline::new(vec![0.1, 0.2], vec![0.1, f64::NAN]).is_err()
        );
    }
}
