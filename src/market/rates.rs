use serde::{Deserialize, Serialize};

use crate::conventions::{Compounding, discount_factor};
use crate::error::{Result, VolSurfError};

/// Deposit rates on tenor pillars, linear in time between pillars.
///
/// Only times inside `[first pillar, last pillar]` are covered; there is no
/// extrapolation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateCurve {
    /// `(years, rate)`, strictly increasing in years.
    pillars: Vec<(f64, f64)>,
    compounding: Compounding,
}

/// Tolerance when matching a query time to the curve's first or last pillar.
const COVERAGE_EPS: f64 = 1e-12;

impl RateCurve {
    /// # Errors
    /// [`VolSurfError::InvalidInput`] for non-finite or non-positive times,
    /// non-finite rates or duplicate times.
    pub fn new(mut pillars: Vec<(f64, f64)>, compounding: Compounding) -> Result<Self> {
        for &(t, r) in &pillars {
            if !t.is_finite() || t <= 0.0 || !r.is_finite() {
                return Err(VolSurfError::InvalidInput {
                    message: format!(
                        "rate pillar ({t}, {r}) must have positive time and finite rate"
                    ),
                });
            }
        }
        pillars.sort_by(|a, b| a.0.total_cmp(&b.0));
        if pillars.windows(2).any(|w| w[1].0 - w[0].0 <= COVERAGE_EPS) {
            return Err(VolSurfError::InvalidInput {
                message: "rate curve has duplicate pillar times".into(),
            });
        }
        Ok(Self {
            pillars,
            compounding,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.pillars.is_empty()
    }

    pub fn compounding(&self) -> Compounding {
        self.compounding
    }

    pub fn covers(&self, t: f64) -> bool {
        match (self.pillars.first(), self.pillars.last()) {
            (Some(first), Some(last)) => {
                t >= first.0 - COVERAGE_EPS && t <= last.0 + COVERAGE_EPS
            }
            _ => false,
        }
    }

    /// Deposit rate at `t` years.
    ///
    /// # Errors
    /// [`VolSurfError::InsufficientData`] when `t` is outside the pillars.
    pub fn rate(&self, t: f64) -> Result<f64> {
        if !self.covers(t) {
            let range = match (self.pillars.first(), self.pillars.last()) {
                (Some(a), Some(b)) => format!("[{:.4}, {:.4}]", a.0, b.0),
                _ => "no pillars".to_owned(),
            };
            return Err(VolSurfError::InsufficientData {
                message: format!("no deposit rate coverage at {t:.4}y, curve spans {range}"),
            });
        }
        let i = self.pillars.partition_point(|p| p.0 < t);
        if i == 0 {
            return Ok(self.pillars[0].1);
        }
        if i == self.pillars.len() {
            return Ok(self.pillars[i - 1].1);
        }
        let (t0, r0) = self.pillars[i - 1];
        let (t1, r1) = self.pillars[i];
        let w = (t - t0) / (t1 - t0);
        Ok(r0 + w * (r1 - r0))
    }

    /// Discount factor at `t` years under the curve's compounding.
    pub fn discount_factor(&self, t: f64) -> Result<f64> {
        Ok(discount_factor(self.rate(t)?, t, self.compounding))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn curve() -> RateCurve {
        let pillars = vec![(0.25, 0.0065), (7.0 / 365.0, 0.0040), (1.0 / 12.0, 0.0045)];
        RateCurve::new(pillars, Compounding::Continuous).unwrap()
    }

    #[test]
    fn exact_and_interpolated_rates() {
        let c = curve();
        assert_abs_diff_eq!(c.rate(1.0 / 12.0).unwrap(), 0.0045, epsilon = 1e-15);
        let mid = 0.5 * (1.0 / 12.0 + 0.25);
        assert_abs_diff_eq!(c.rate(mid).unwrap(), 0.0055, epsilon = 1e-12);
    }

    #[test]
    fn outside_pillars_is_insufficient_data() {
        let c = curve();
        assert!(matches!(
            c.rate(1.0 / 365.0),
            Err(VolSurfError::InsufficientData { .. })
        ));
        assert!(matches!(
            c.rate(0.5),
            Err(VolSurfError::InsufficientData { .. })
        ));
        let empty = RateCurve::new(vec![], Compounding::Simple).unwrap();
        assert!(empty.is_empty());
        assert!(empty.rate(0.1).is_err());
    }

    #[test]
    fn single_pillar_covers_its_own_tenor() {
        let c = RateCurve::new(vec![(0.5, 0.02)], Compounding::Simple).unwrap();
        assert_abs_diff_eq!(c.discount_factor(0.5).unwrap(), 1.0 / 1.01, epsilon = 1e-15);
        assert!(!c.covers(0.25));
    }

    #[test]
    fn rejects_bad_pillars() {
        let c = Compounding::Continuous;
        assert!(RateCurve::new(vec![(0.0, 0.01)], c).is_err());
        assert!(RateCurve::new(vec![(0.5, f64::NAN)], c).is_err());
        assert!(RateCurve::new(vec![(0.5, 0.01), (0.5, 0.02)], c).is_err());
    }
}
