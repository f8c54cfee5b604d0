//! Butterfly arbitrage reporting for a single smile.
//!
//! Butterfly arbitrage shows up as a negative risk-neutral density, read off
//! undiscounted call prices by Breeden–Litzenberger: `q(K) = ∂²C/∂K²`.

use serde::{Deserialize, Serialize};

use crate::market::Tenor;

/// Density below this is reported as a violation.
pub(crate) const DENSITY_TOLERANCE: f64 = 1e-8;

/// Butterfly scan result for one tenor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArbitrageReport {
    pub tenor: Tenor,
    pub is_free: bool,
    pub butterfly_violations: Vec<ButterflyViolation>,
}

impl ArbitrageReport {
    pub fn clean(tenor: Tenor) -> Self {
        Self {
            tenor,
            is_free: true,
            butterfly_violations: Vec::new(),
        }
    }

    pub(crate) fn from_violations(
        tenor: Tenor,
        butterfly_violations: Vec<ButterflyViolation>,
    ) -> Self {
        Self {
            tenor,
            is_free: butterfly_violations.is_empty(),
            butterfly_violations,
        }
    }

    /// Largest-magnitude violation, if any.
    ///
    /// ```
    /// use fxvolsurf::Tenor;
    /// use fxvolsurf::smile::{ArbitrageReport, ButterflyViolation};
    ///
    /// let mut report = ArbitrageReport::clean(Tenor::Weeks(1));
    /// assert!(report.worst_violation().is_none());
    /// report.is_free = false;
    /// report.butterfly_violations = vec![
    ///     ButterflyViolation { strike: 1.30, density: -0.02, magnitude: 0.02 },
    ///     ButterflyViolation { strike: 1.31, density: -0.05, magnitude: 0.05 },
    /// ];
    /// assert_eq!(report.worst_violation().unwrap().strike, 1.31);
    /// ```
    pub fn worst_violation(&self) -> Option<&ButterflyViolation> {
        self.butterfly_violations
            .iter()
            .max_by(|a, b| a.magnitude.total_cmp(&b.magnitude))
    }
}

/// Negative density at one strike.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ButterflyViolation {
    pub strike: f64,
    pub density: f64,
    pub magnitude: f64,
}

impl ButterflyViolation {
    pub(crate) fn new(strike: f64, density: f64) -> Self {
        Self {
            strike,
            density,
            magnitude: density.abs(),
        }
    }
}
