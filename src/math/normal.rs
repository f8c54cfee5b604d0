//! Standard normal distribution via `statrs` error functions.

use std::f64::consts::{FRAC_1_SQRT_2, SQRT_2};

use statrs::function::erf::{erfc, erfc_inv};

/// 1/√(2π).
const INV_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

/// Standard normal CDF `N(x)`.
pub(crate) fn norm_cdf(x: f64) -> f64 {
    0.5 * erfc(-x * FRAC_1_SQRT_2)
}

/// Standard normal density `n(x)`.
pub(crate) fn norm_pdf(x: f64) -> f64 {
    INV_SQRT_2PI * (-0.5 * x * x).exp()
}

/// Inverse standard normal CDF for `p ∈ (0, 1)`.
pub(crate) fn norm_inv_cdf(p: f64) -> f64 {
    -SQRT_2 * erfc_inv(2.0 * p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn cdf_reference_values() {
        assert_abs_diff_eq!(norm_cdf(0.0), 0.5, epsilon = 1e-15);
        assert_abs_diff_eq!(norm_cdf(1.0), 0.841_344_746_068_542_9, epsilon = 1e-14);
        assert_abs_diff_eq!(norm_cdf(-1.959_963_984_540_054), 0.025, epsilon = 1e-14);
    }

    #[test]
    fn inverse_round_trips() {
        for p in [0.001, 0.1, 0.25, 0.5, 0.75, 0.9, 0.999] {
            assert_abs_diff_eq!(norm_cdf(norm_inv_cdf(p)), p, epsilon = 1e-13);
        }
    }

    #[test]
    fn pdf_peak() {
        assert_abs_diff_eq!(norm_pdf(0.0), INV_SQRT_2PI, epsilon = 1e-16);
        assert_abs_diff_eq!(norm_pdf(1.5), norm_pdf(-1.5), epsilon = 1e-16);
    }
}
