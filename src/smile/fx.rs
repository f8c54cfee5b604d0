//! Calibrated FX smile for one tenor.
//!
//! # Parameterization
//!
//! The smile is a natural cubic spline of implied vol against the forward
//! call delta `x = N(d1)`, through the quoted anchors, flat outside the
//! outermost anchors. Working in `x` makes the delta→strike map explicit:
//!
//! ```text
//! K(x) = F · exp(−N⁻¹(x)·σ(x)·√T + ½σ(x)²T)
//! ```
//!
//! The reverse map needs a root-find, because the vol used to compute the
//! delta depends on the delta itself. For a strike `K` we solve
//!
//! ```text
//! g(x) = x − N(d1(K, σ(x))) = 0
//! ```
//!
//! by safeguarded Newton on `(0, 1)`, seeded with the delta of `K` at the
//! delta-neutral vol.
//!
//! # Calibration checks
//!
//! Anchors must be strictly ordered in delta and in strike, the spline must
//! stay positive between them, and every anchor's strike must solve back to
//! its quoted vol within the calibration tolerance.

use serde::Serialize;

use crate::config::{CalibrationConfig, ConventionConfig};
use crate::conventions::{
    AtmConvention, DeltaConvention, from_call_delta, log_moneyness, to_call_delta,
};
use crate::error::{Result, VolSurfError};
use crate::market::{SmileQuote, Tenor, TenorMarket};
use crate::math::{CubicSpline, RootConfig, bracketed_newton, d1, norm_cdf, norm_inv_cdf, norm_pdf};
use crate::smile::SmileSection;
use crate::smile::arbitrage::{ArbitrageReport, ButterflyViolation, DENSITY_TOLERANCE};
use crate::types::{Delta, OptionType, Strike, Vol};
use crate::validate::{validate_open_unit, validate_positive};

/// Samples used when checking the spline stays positive between anchors.
const POSITIVITY_SAMPLES: usize = 400;

/// Strikes scanned by the butterfly check.
const BUTTERFLY_SAMPLES: usize = 200;

/// One calibration point of a smile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SmileAnchor {
    /// Market name of the point: `ATM`, `25DC`, `10DP`, `K=1.4`.
    pub label: String,
    /// Forward call delta `N(d1)`.
    pub call_delta: f64,
    pub strike: f64,
    pub vol: f64,
}

/// Outcome of a strike→delta solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrikeSolution {
    pub call_delta: f64,
    pub vol: f64,
    pub iterations: usize,
}

/// Calibrated smile at one tenor.
#[derive(Debug, Clone, Serialize)]
pub struct FxSmile {
    tenor: Tenor,
    market: TenorMarket,
    delta_convention: DeltaConvention,
    atm_convention: AtmConvention,
    anchors: Vec<SmileAnchor>,
    spline: CubicSpline,
    #[serde(skip)]
    solver: RootConfig,
}

impl FxSmile {
    /// Fit the smile through `quote` and verify every anchor round-trips.
    ///
    /// # Errors
    /// - [`VolSurfError::InvalidInput`] for malformed quotes or anchors that
    ///   collide or cross in delta or strike.
    /// - [`VolSurfError::CalibrationFailure`] when a strike solve does not
    ///   converge, the spline turns non-positive, or an anchor misses its
    ///   quoted vol by more than the tolerance.
    pub fn calibrate(
        tenor: Tenor,
        market: TenorMarket,
        quote: &SmileQuote,
        conventions: ConventionConfig,
        calibration: CalibrationConfig,
    ) -> Result<Self> {
        validate_positive(market.years, "expiry")?;
        validate_positive(market.forward, "forward")?;
        quote.validate()?;
        let label = tenor.label();

        let mut points = quote_points(quote, &market, conventions)?;
        points.sort_by(|a, b| a.1.total_cmp(&b.1));
        for w in points.windows(2) {
            if w[1].1 - w[0].1 <= f64::EPSILON {
                return Err(VolSurfError::InvalidInput {
                    message: format!(
                        "{label}: anchors {} and {} share forward call delta {:.6}",
                        w[0].0, w[1].0, w[0].1
                    ),
                });
            }
        }

        let spline = CubicSpline::new(
            points.iter().map(|p| p.1).collect(),
            points.iter().map(|p| p.2).collect(),
        )?;
        let mut smile = Self {
            tenor,
            market,
            delta_convention: conventions.delta,
            atm_convention: conventions.atm,
            anchors: Vec::with_capacity(points.len()),
            spline,
            solver: RootConfig {
                tolerance: calibration.solver_tolerance(),
                max_iterations: calibration.max_iterations,
            },
        };

        for (name, x, vol, strike) in points {
            let strike = match strike {
                Some(k) => k,
                None => smile.strike_from_delta_and_vol(x, vol),
            };
            smile.anchors.push(SmileAnchor {
                label: name,
                call_delta: x,
                strike,
                vol,
            });
        }
        for w in smile.anchors.windows(2) {
            if w[1].strike >= w[0].strike {
                return Err(VolSurfError::InvalidInput {
                    message: format!(
                        "{label}: anchor strikes cross ({} at {:.6} vs {} at {:.6})",
                        w[0].label, w[0].strike, w[1].label, w[1].strike
                    ),
                });
            }
        }

        smile.check_positive()?;
        smile.check_fidelity(calibration.tolerance)?;

        #[cfg(feature = "logging")]
        tracing::trace!(tenor = %label, anchors = smile.anchors.len(), "smile calibrated");

        Ok(smile)
    }

    pub fn tenor(&self) -> Tenor {
        self.tenor
    }

    pub fn years(&self) -> f64 {
        self.market.years
    }

    pub fn market(&self) -> &TenorMarket {
        &self.market
    }

    pub fn delta_convention(&self) -> DeltaConvention {
        self.delta_convention
    }

    pub fn atm_convention(&self) -> AtmConvention {
        self.atm_convention
    }

    /// Calibration anchors, ascending in call delta (descending in strike).
    pub fn anchors(&self) -> &[SmileAnchor] {
        &self.anchors
    }

    /// Strike range spanned by the anchors, `(low, high)`.
    pub fn strike_range(&self) -> (f64, f64) {
        let first = self.anchors.first().map_or(self.market.forward, |a| a.strike);
        let last = self.anchors.last().map_or(self.market.forward, |a| a.strike);
        (last, first)
    }

    /// ATM vol under the configured ATM convention.
    pub fn atm_vol(&self) -> Result<Vol> {
        match self.atm_convention {
            AtmConvention::DeltaNeutral => Ok(Vol(self.spline.eval(0.5))),
            AtmConvention::Forward => self.vol_at_strike(self.market.forward),
        }
    }

    /// Vol at forward call delta `x`.
    pub fn vol_at_delta(&self, call_delta: f64) -> Result<Vol> {
        validate_open_unit(call_delta, "call delta")?;
        Ok(Vol(self.spline.eval(call_delta)))
    }

    /// Strike whose forward call delta is `x`.
    pub fn strike_at_delta(&self, call_delta: f64) -> Result<Strike> {
        validate_open_unit(call_delta, "call delta")?;
        Ok(Strike(
            self.strike_from_delta_and_vol(call_delta, self.spline.eval(call_delta)),
        ))
    }

    /// Quoted (signed) delta of an option at forward call delta `x` under
    /// the smile's delta convention.
    pub fn quoted_delta(&self, call_delta: f64, option_type: OptionType) -> f64 {
        from_call_delta(
            call_delta,
            option_type,
            self.delta_convention,
            self.market.df_foreign,
        )
    }

    /// Vol at `strike`, solving for its forward call delta.
    ///
    /// # Errors
    /// [`VolSurfError::CalibrationFailure`] if the solve does not converge.
    pub fn vol_at_strike(&self, strike: f64) -> Result<Vol> {
        Ok(Vol(self.solve_strike(strike)?.vol))
    }

    /// Forward call delta of `strike` on this smile.
    pub fn delta_at_strike(&self, strike: f64) -> Result<Delta> {
        Ok(Delta(self.solve_strike(strike)?.call_delta))
    }

    /// Solve `x − N(d1(K, σ(x))) = 0` for the strike's forward call delta.
    pub fn solve_strike(&self, strike: f64) -> Result<StrikeSolution> {
        validate_positive(strike, "strike")?;
        let t = self.market.years;
        let sqrt_t = t.sqrt();
        let log_fk = -log_moneyness(strike, self.market.forward);
        let seed = norm_cdf(d1(log_fk, self.spline.eval(0.5), t));

        let outcome = bracketed_newton(
            |x| {
                let vol = self.spline.eval(x);
                let d = d1(log_fk, vol, t);
                let residual = x - norm_cdf(d);
                let dd1_dvol = -log_fk / (vol * vol * sqrt_t) + 0.5 * sqrt_t;
                let slope = 1.0 - norm_pdf(d) * dd1_dvol * self.spline.derivative(x);
                (residual, slope)
            },
            seed,
            0.0,
            1.0,
            self.solver,
        )?;

        if !outcome.converged {
            return Err(VolSurfError::calibration(
                format!(
                    "delta solve for strike {strike} did not converge in {} iterations",
                    outcome.iterations
                ),
                Some(&self.tenor.label()),
                Some(outcome.residual),
            ));
        }
        Ok(StrikeSolution {
            call_delta: outcome.root,
            vol: self.spline.eval(outcome.root),
            iterations: outcome.iterations,
        })
    }

    fn strike_from_delta_and_vol(&self, x: f64, vol: f64) -> f64 {
        let t = self.market.years;
        let std_dev = vol * t.sqrt();
        self.market.forward * (-norm_inv_cdf(x) * std_dev + 0.5 * std_dev * std_dev).exp()
    }

    fn check_positive(&self) -> Result<()> {
        let (xs, _) = self.spline.knots();
        let (lo, hi) = (xs[0], xs[xs.len() - 1]);
        for i in 0..=POSITIVITY_SAMPLES {
            let x = lo + (hi - lo) * i as f64 / POSITIVITY_SAMPLES as f64;
            let vol = self.spline.eval(x);
            if !(vol > 0.0) {
                return Err(VolSurfError::calibration(
                    format!(
                        "interpolated vol {vol} is not positive at call delta {x:.4}"
                    ),
                    Some(&self.tenor.label()),
                    None,
                ));
            }
        }
        Ok(())
    }

    fn check_fidelity(&self, tolerance: f64) -> Result<()> {
        for anchor in &self.anchors {
            let solved = self.solve_strike(anchor.strike)?;
            let miss = (solved.vol - anchor.vol).abs();
            if !(miss <= tolerance) {
                return Err(VolSurfError::calibration(
                    format!(
                        "{} anchor at strike {:.6} reproduces vol {:.8} instead of {:.8}",
                        anchor.label, anchor.strike, solved.vol, anchor.vol
                    ),
                    Some(&self.tenor.label()),
                    Some(miss),
                ));
            }
        }
        Ok(())
    }
}

/// `(label, call delta, vol, strike if quoted)` for each quoted point.
fn quote_points(
    quote: &SmileQuote,
    market: &TenorMarket,
    conventions: ConventionConfig,
) -> Result<Vec<(String, f64, f64, Option<f64>)>> {
    let atm_point = |vol: f64| {
        let x = match conventions.atm {
            AtmConvention::DeltaNeutral => 0.5,
            AtmConvention::Forward => norm_cdf(0.5 * vol * market.years.sqrt()),
        };
        ("ATM".to_owned(), x, vol, None)
    };
    let to_x = |signed: f64| to_call_delta(signed, conventions.delta, market.df_foreign);

    let mut points = Vec::with_capacity(quote.anchor_count());
    match quote {
        SmileQuote::Strategies { atm, pillars } => {
            points.push(atm_point(*atm));
            for p in pillars {
                let (call_vol, put_vol) = p.wing_vols(*atm);
                let call_label = delta_label(p.delta, OptionType::Call);
                let put_label = delta_label(p.delta, OptionType::Put);
                points.push((call_label, to_x(p.delta)?, call_vol, None));
                points.push((put_label, to_x(-p.delta)?, put_vol, None));
            }
        }
        SmileQuote::Deltas { atm, points: quoted } => {
            if let Some(atm) = atm {
                points.push(atm_point(*atm));
            }
            for q in quoted {
                let option_type = OptionType::from_signed_delta(q.delta);
                let label = delta_label(q.delta.abs(), option_type);
                points.push((label, to_x(q.delta)?, q.vol, None));
            }
        }
        SmileQuote::Strikes { points: quoted } => {
            for q in quoted {
                let log_fk = -log_moneyness(q.strike, market.forward);
                let x = norm_cdf(d1(log_fk, q.vol, market.years));
                validate_open_unit(x, "strike quote call delta").map_err(|_| {
                    VolSurfError::InvalidInput {
                        message: format!("strike quote {} lies too far from the forward", q.strike),
                    }
                })?;
                points.push((format!("K={}", q.strike), x, q.vol, Some(q.strike)));
            }
        }
    }
    Ok(points)
}

fn delta_label(delta: f64, option_type: OptionType) -> String {
    let pts = (delta * 1e6).round() / 1e4;
    let side = match option_type {
        OptionType::Call => 'C',
        OptionType::Put => 'P',
    };
    format!("{pts}D{side}")
}

impl SmileSection for FxSmile {
    fn vol(&self, strike: f64) -> Result<Vol> {
        self.vol_at_strike(strike)
    }

    fn forward(&self) -> f64 {
        self.market.forward
    }

    fn expiry(&self) -> f64 {
        self.market.years
    }

    /// Scan the anchor strike range for negative density.
    fn is_arbitrage_free(&self) -> Result<ArbitrageReport> {
        let (lo, hi) = self.strike_range();
        if hi <= lo {
            return Ok(ArbitrageReport::clean(self.tenor));
        }
        let step = (hi - lo) / BUTTERFLY_SAMPLES as f64;
        let mut violations = Vec::new();
        for i in 1..BUTTERFLY_SAMPLES {
            let k = lo + step * i as f64;
            let q = self.density(k)?;
            if q < -DENSITY_TOLERANCE {
                violations.push(ButterflyViolation::new(k, q));
            }
        }
        Ok(ArbitrageReport::from_violations(self.tenor, violations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conventions::{Compounding, discount_factor};
    use crate::market::quote::{DeltaVol, RrBfPillar, StrikeVol};
    use approx::assert_abs_diff_eq;

    const SPOT: f64 = 1.4684;

    fn market(years: f64, rd: f64, rf: f64) -> TenorMarket {
        let df_domestic = discount_factor(rd, years, Compounding::Continuous);
        let df_foreign = discount_factor(rf, years, Compounding::Continuous);
        TenorMarket {
            years,
            forward: SPOT * df_foreign / df_domestic,
            df_domestic,
            df_foreign,
        }
    }

    fn one_week_quote() -> SmileQuote {
        SmileQuote::Strategies {
            atm: 0.38,
            pillars: vec![
                RrBfPillar::new(0.25, -0.09, 0.015),
                RrBfPillar::new(0.10, -0.17, 0.05),
            ],
        }
    }

    fn one_week() -> FxSmile {
        FxSmile::calibrate(
            Tenor::Weeks(1),
            market(7.0 / 365.0, 0.0040, 0.0045),
            &one_week_quote(),
            ConventionConfig::default(),
            CalibrationConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn anchors_ordered_and_labelled() {
        let smile = one_week();
        let labels: Vec<&str> = smile.anchors().iter().map(|a| a.label.as_str()).collect();
        assert_eq!(labels, ["10DC", "25DC", "ATM", "25DP", "10DP"]);
        for w in smile.anchors().windows(2) {
            assert!(w[0].call_delta < w[1].call_delta);
            assert!(w[0].strike > w[1].strike);
        }
        assert_abs_diff_eq!(smile.anchors()[2].call_delta, 0.5);
        assert_abs_diff_eq!(smile.anchors()[2].vol, 0.38);
        // 25D put under smile strangle: 0.38 + 0.015 + 0.045
        assert_abs_diff_eq!(smile.anchors()[3].vol, 0.44, epsilon = 1e-15);
    }

    #[test]
    fn anchors_round_trip_through_strike_solve() {
        let smile = one_week();
        for a in smile.anchors() {
            let vol = smile.vol_at_strike(a.strike).unwrap();
            assert_abs_diff_eq!(vol.0, a.vol, epsilon = 1e-8);
        }
    }

    #[test]
    fn delta_neutral_strike_closed_form() {
        let smile = one_week();
        let f = smile.market().forward;
        let k = smile.strike_at_delta(0.5).unwrap().0;
        assert_abs_diff_eq!(
            k,
            f * (0.5 * 0.38_f64 * 0.38 * 7.0 / 365.0).exp(),
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(smile.atm_vol().unwrap().0, 0.38, epsilon = 1e-15);
    }

    #[test]
    fn strike_solve_inverts_delta_to_strike() {
        let smile = one_week();
        for x in [0.07, 0.2, 0.42, 0.66, 0.93] {
            let k = smile.strike_at_delta(x).unwrap().0;
            let sol = smile.solve_strike(k).unwrap();
            assert_abs_diff_eq!(sol.call_delta, x, epsilon = 1e-9);
            assert!(sol.iterations <= 10);
            assert_eq!(smile.delta_at_strike(k).unwrap(), Delta(sol.call_delta));
        }
    }

    #[test]
    fn flat_beyond_outer_anchors() {
        let smile = one_week();
        let outer_put = smile.anchors().last().unwrap().vol;
        assert_abs_diff_eq!(smile.vol_at_delta(0.99).unwrap().0, outer_put);
        let outer_call = smile.anchors()[0].vol;
        assert_abs_diff_eq!(smile.vol_at_delta(0.01).unwrap().0, outer_call);
    }

    #[test]
    fn single_anchor_is_flat() {
        let smile = FxSmile::calibrate(
            Tenor::Months(1),
            market(1.0 / 12.0, 0.0045, 0.0050),
            &SmileQuote::atm(0.22),
            ConventionConfig::default(),
            CalibrationConfig::default(),
        )
        .unwrap();
        for k in [1.30, 1.45, 1.60] {
            assert_abs_diff_eq!(smile.vol_at_strike(k).unwrap().0, 0.22, epsilon = 1e-15);
        }
        assert!(smile.is_arbitrage_free().unwrap().is_free);
    }

    #[test]
    fn forward_atm_anchors_at_forward() {
        let conventions = ConventionConfig {
            atm: AtmConvention::Forward,
            ..ConventionConfig::default()
        };
        let m = market(0.25, 0.0065, 0.0055);
        let smile = FxSmile::calibrate(
            Tenor::Months(3),
            m,
            &SmileQuote::atm(0.16),
            conventions,
            CalibrationConfig::default(),
        )
        .unwrap();
        assert_abs_diff_eq!(smile.anchors()[0].strike, m.forward, epsilon = 1e-12);
        assert_abs_diff_eq!(smile.atm_vol().unwrap().0, 0.16, epsilon = 1e-12);
    }

    #[test]
    fn spot_and_forward_delta_conventions_differ() {
        let forward_conv = ConventionConfig {
            delta: DeltaConvention::Forward,
            ..ConventionConfig::default()
        };
        let m = market(1.0, 0.02, 0.05);
        let quote = SmileQuote::Strategies {
            atm: 0.10,
            pillars: vec![RrBfPillar::new(0.25, 0.01, 0.003)],
        };
        let calibrate = |conventions| {
            let calibration = CalibrationConfig::default();
            FxSmile::calibrate(Tenor::Years(1), m, &quote, conventions, calibration)
        };
        let spot = calibrate(ConventionConfig::default()).unwrap();
        let fwd = calibrate(forward_conv).unwrap();
        assert_abs_diff_eq!(fwd.anchors()[0].call_delta, 0.25);
        let x = spot.anchors()[0].call_delta;
        assert_abs_diff_eq!(x, 0.25 / m.df_foreign, epsilon = 1e-15);
        assert_abs_diff_eq!(
            spot.quoted_delta(x, OptionType::Call),
            0.25,
            epsilon = 1e-15
        );
    }

    #[test]
    fn raw_delta_and_strike_quotes() {
        let m = market(1.0 / 12.0, 0.0045, 0.0050);
        let calibrate = |quote: &SmileQuote| {
            FxSmile::calibrate(
                Tenor::Months(1),
                m,
                quote,
                ConventionConfig::default(),
                CalibrationConfig::default(),
            )
        };
        let deltas = SmileQuote::Deltas {
            atm: Some(0.22),
            points: vec![
                DeltaVol {
                    delta: 0.25,
                    vol: 0.21,
                },
                DeltaVol {
                    delta: -0.25,
                    vol: 0.24,
                },
            ],
        };
        let smile = calibrate(&deltas).unwrap();
        assert_eq!(smile.anchors().len(), 3);

        let strikes = SmileQuote::Strikes {
            points: vec![
                StrikeVol {
                    strike: 1.40,
                    vol: 0.26,
                },
                StrikeVol {
                    strike: 1.47,
                    vol: 0.22,
                },
                StrikeVol {
                    strike: 1.53,
                    vol: 0.21,
                },
            ],
        };
        let smile = calibrate(&strikes).unwrap();
        assert_eq!(smile.anchors()[0].label, "K=1.53");
        assert_abs_diff_eq!(smile.vol_at_strike(1.40).unwrap().0, 0.26, epsilon = 1e-8);
    }

    #[test]
    fn duplicate_deltas_rejected() {
        let m = market(1.0 / 12.0, 0.0045, 0.0050);
        let quote = SmileQuote::Deltas {
            atm: None,
            points: vec![
                DeltaVol {
                    delta: 0.25,
                    vol: 0.21,
                },
                DeltaVol {
                    delta: 0.25,
                    vol: 0.22,
                },
            ],
        };
        let result = FxSmile::calibrate(
            Tenor::Months(1),
            m,
            &quote,
            ConventionConfig::default(),
            CalibrationConfig::default(),
        );
        assert!(matches!(result, Err(VolSurfError::InvalidInput { .. })));
    }

    #[test]
    fn tiny_iteration_budget_fails_with_residual() {
        let calibration = CalibrationConfig {
            tolerance: 1e-8,
            max_iterations: 0,
        };
        let result = FxSmile::calibrate(
            Tenor::Weeks(1),
            market(7.0 / 365.0, 0.0040, 0.0045),
            &one_week_quote(),
            ConventionConfig::default(),
            calibration,
        );
        match result {
            Err(VolSurfError::CalibrationFailure { tenor, residual, .. }) => {
                assert_eq!(tenor.as_deref(), Some("1W"));
                assert!(residual.unwrap().abs() > 1e-10);
            }
            other => panic!("expected CalibrationFailure, got {other:?}"),
        }
    }

    #[test]
    fn market_smiles_have_positive_density() {
        let report = one_week().is_arbitrage_free().unwrap();
        assert!(report.is_free, "{:?}", report.worst_violation());
    }

    #[test]
    fn invalid_queries() {
        let smile = one_week();
        assert!(smile.vol_at_delta(0.0).is_err());
        assert!(smile.vol_at_delta(1.0).is_err());
        assert!(smile.vol_at_strike(-1.0).is_err());
        assert!(smile.strike_at_delta(f64::NAN).is_err());
    }
}
