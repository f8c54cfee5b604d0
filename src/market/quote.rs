//! Implied-volatility and forward quotes for a single tenor.

use serde::{Deserialize, Serialize};

use crate::error::{Result, VolSurfError};
use crate::validate::{validate_finite, validate_positive};

/// Risk reversal and butterfly quoted at one delta pillar (e.g. 25D).
///
/// Under the smile-strangle convention the pillar vols are
/// `σ_call = ATM + BF + RR/2` and `σ_put = ATM + BF − RR/2`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RrBfPillar {
    /// Unsigned pillar delta, e.g. 0.25.
    pub delta: f64,
    pub risk_reversal: f64,
    pub butterfly: f64,
}

impl RrBfPillar {
    pub fn new(delta: f64, risk_reversal: f64, butterfly: f64) -> Self {
        Self {
            delta,
            risk_reversal,
            butterfly,
        }
    }

    /// `(σ_call, σ_put)` at this pillar given the ATM vol.
    pub fn wing_vols(&self, atm: f64) -> (f64, f64) {
        let half_rr = 0.5 * self.risk_reversal;
        (atm + self.butterfly + half_rr, atm + self.butterfly - half_rr)
    }
}

/// Raw vol quoted at a signed delta (calls positive, puts negative).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeltaVol {
    pub delta: f64,
    pub vol: f64,
}

/// Raw vol quoted at an absolute strike.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrikeVol {
    pub strike: f64,
    pub vol: f64,
}

/// Vol quotes for one tenor, in one of the market quoting conventions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SmileQuote {
    /// ATM straddle plus risk reversals and butterflies at delta pillars.
    Strategies { atm: f64, pillars: Vec<RrBfPillar> },
    /// Vols at signed deltas, with an optional ATM straddle vol.
    Deltas {
        atm: Option<f64>,
        points: Vec<DeltaVol>,
    },
    /// Vols at absolute strikes.
    Strikes { points: Vec<StrikeVol> },
}

impl SmileQuote {
    /// ATM-only smile.
    pub fn atm(vol: f64) -> Self {
        SmileQuote::Strategies {
            atm: vol,
            pillars: Vec::new(),
        }
    }

    /// Number of anchors this quote produces.
    pub fn anchor_count(&self) -> usize {
        match self {
            SmileQuote::Strategies { pillars, .. } => 1 + 2 * pillars.len(),
            SmileQuote::Deltas { atm, points } => usize::from(atm.is_some()) + points.len(),
            SmileQuote::Strikes { points } => points.len(),
        }
    }

    /// Check that every number is usable.
    ///
    /// # Errors
    /// [`VolSurfError::InvalidInput`] for non-finite values, non-positive
    /// vols, pillar deltas outside `(0, 0.5)` and non-positive strikes.
    /// [`VolSurfError::InsufficientData`] if the quote yields no anchor.
    pub fn validate(&self) -> Result<()> {
        if self.anchor_count() == 0 {
            return Err(VolSurfError::InsufficientData {
                message: "smile quote has no points".into(),
            });
        }
        match self {
            SmileQuote::Strategies { atm, pillars } => {
                validate_positive(*atm, "ATM vol")?;
                for p in pillars {
                    if !(p.delta > 0.0 && p.delta < 0.5) {
                        return Err(VolSurfError::InvalidInput {
                            message: format!("pillar delta must lie in (0, 0.5), got {}", p.delta),
                        });
                    }
                    validate_finite(p.risk_reversal, "risk reversal")?;
                    validate_finite(p.butterfly, "butterfly")?;
                    let (call, put) = p.wing_vols(*atm);
                    if call <= 0.0 || put <= 0.0 {
                        return Err(VolSurfError::InvalidInput {
                            message: format!(
                                "{}D pillar implies non-positive wing vol (call {call}, put {put})",
                                p.delta * 100.0
                            ),
                        });
                    }
                }
            }
            SmileQuote::Deltas { atm, points } => {
                if let Some(atm) = atm {
                    validate_positive(*atm, "ATM vol")?;
                }
                for p in points {
                    validate_finite(p.delta, "quoted delta")?;
                    validate_positive(p.vol, "vol")?;
                }
            }
            SmileQuote::Strikes { points } => {
                for p in points {
                    validate_positive(p.strike, "strike")?;
                    validate_positive(p.vol, "vol")?;
                }
            }
        }
        Ok(())
    }
}

/// Forward quote for one tenor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ForwardQuote {
    /// Outright forward rate.
    Outright(f64),
    /// Forward points in pips, added to spot times the pair's pip size.
    Points(f64),
}

impl ForwardQuote {
    pub fn outright(&self, spot: f64, pip_size: f64) -> f64 {
        match *self {
            ForwardQuote::Outright(f) => f,
            ForwardQuote::Points(points) => spot + points * pip_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn smile_strangle_wings() {
        let p = RrBfPillar::new(0.25, -0.02, 0.004);
        let (call, put) = p.wing_vols(0.10);
        assert_abs_diff_eq!(call, 0.094, epsilon = 1e-15);
        assert_abs_diff_eq!(put, 0.114, epsilon = 1e-15);
    }

    #[test]
    fn forward_points_use_pip_size() {
        assert_abs_diff_eq!(
            ForwardQuote::Points(-12.5).outright(1.30, 0.0001),
            1.29875,
            epsilon = 1e-14
        );
        assert_abs_diff_eq!(ForwardQuote::Outright(1.2).outright(1.30, 0.0001), 1.2);
    }

    #[test]
    fn validation() {
        assert!(SmileQuote::atm(0.1).validate().is_ok());
        assert!(SmileQuote::atm(0.0).validate().is_err());
        let bad_pillar = SmileQuote::Strategies {
            atm: 0.1,
            pillars: vec![RrBfPillar::new(0.6, 0.0, 0.0)],
        };
        assert!(bad_pillar.validate().is_err());
        let negative_wing = SmileQuote::Strategies {
            atm: 0.05,
            pillars: vec![RrBfPillar::new(0.25, -0.2, 0.0)],
        };
        assert!(matches!(
            negative_wing.validate(),
            Err(VolSurfError::InvalidInput { .. })
        ));
        let empty = SmileQuote::Strikes { points: vec![] };
        assert!(matches!(
            empty.validate(),
            Err(VolSurfError::InsufficientData { .. })
        ));
    }

    #[test]
    fn anchor_counts() {
        let q = SmileQuote::Strategies {
            atm: 0.1,
            pillars: vec![
                RrBfPillar::new(0.25, 0.0, 0.0),
                RrBfPillar::new(0.1, 0.0, 0.0),
            ],
        };
        assert_eq!(q.anchor_count(), 5);
        let q = SmileQuote::Deltas {
            atm: Some(0.1),
            points: vec![DeltaVol {
                delta: 0.25,
                vol: 0.1,
            }],
        };
        assert_eq!(q.anchor_count(), 2);
    }

    #[test]
    fn serde_tagged_representation() {
        let q = SmileQuote::atm(0.1);
        let json = serde_json::to_string(&q).unwrap();
        assert!(json.contains("\"kind\":\"strategies\""));
        let back: SmileQuote = serde_json::from_str(&json).unwrap();
        assert_eq!(back, q);
    }
}
