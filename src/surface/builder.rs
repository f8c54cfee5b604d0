//! Surface calibration from a market observation set.
//!
//! ```
//! use chrono::NaiveDate;
//! use fxvolsurf::surface::SurfaceBuilder;
//! use fxvolsurf::{EngineConfig, MarketObservationSet, RrBfPillar, SmileQuote, Tenor};
//!
//! let (one_month, three_month) = (Tenor::Months(1), Tenor::Months(3));
//! let obs = MarketObservationSet::builder(
//!     "EURUSD".parse()?,
//!     NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
//!     1.0850,
//! )
//! .domestic_rate(one_month, 0.053)
//! .domestic_rate(three_month, 0.054)
//! .foreign_rate(one_month, 0.039)
//! .foreign_rate(three_month, 0.039)
//! .smile(one_month, SmileQuote::Strategies {
//!     atm: 0.065,
//!     pillars: vec![RrBfPillar::new(0.25, -0.004, 0.0015)],
//! })
//! .smile(three_month, SmileQuote::atm(0.068))
//! .build()?;
//!
//! let config = EngineConfig::default();
//! let surface = SurfaceBuilder::new(&config).build(&obs)?;
//! assert_eq!(surface.tenors(), vec![one_month, three_month]);
//! # Ok::<(), fxvolsurf::VolSurfError>(())
//! ```

use crate::config::EngineConfig;
use crate::conventions::{AtmConvention, to_call_delta};
use crate::error::{Result, VolSurfError};
use crate::market::MarketObservationSet;
use crate::smile::FxSmile;
use crate::surface::VolSurface;
use crate::surface::views::{DeltaStrikeTable, GridAxis, QuotedPoint, SurfaceViews, VolGrid};

/// Rows of the delta→strike table: `(label, signed quoted delta)`, with
/// `None` for ATM.
const STANDARD_DELTAS: [(&str, Option<f64>); 5] = [
    ("10DP", Some(-0.10)),
    ("25DP", Some(-0.25)),
    ("ATM", None),
    ("25DC", Some(0.25)),
    ("10DC", Some(0.10)),
];

/// Calibrates [`VolSurface`]s under one configuration.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceBuilder<'a> {
    config: &'a EngineConfig,
}

impl<'a> SurfaceBuilder<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// Calibrate one smile per quoted tenor, then precompute the dense views.
    ///
    /// # Errors
    /// - [`VolSurfError::InsufficientData`] when quotes or rate coverage are
    ///   missing.
    /// - [`VolSurfError::CalibrationFailure`] when a smile cannot be fitted
    ///   within tolerance, tagged with the failing tenor.
    pub fn build(&self, obs: &MarketObservationSet) -> Result<VolSurface> {
        #[cfg(feature = "logging")]
        tracing::debug!(
            pair = %obs.pair(),
            date = %obs.date(),
            tenors = obs.smiles().len(),
            "building vol surface"
        );

        obs.validate()?;
        let conventions = self.config.conventions;
        let (domestic, foreign) = obs.rate_curves(conventions.rate_compounding)?;

        let mut smiles: Vec<FxSmile> = Vec::with_capacity(obs.smiles().len());
        for (tenor, quote) in obs.smiles() {
            if let Some(prev) = smiles.last() {
                if tenor.years() - prev.years() <= f64::EPSILON {
                    return Err(VolSurfError::InvalidInput {
                        message: format!(
                            "tenors {} and {tenor} have the same expiry",
                            prev.tenor()
                        ),
                    });
                }
            }
            let market = obs.tenor_market(tenor, &domestic, &foreign)?;
            let calibration = self.config.calibration;
            let smile = FxSmile::calibrate(*tenor, market, quote, conventions, calibration)
                .map_err(|e| e.with_tenor(&tenor.label()))?;
            smiles.push(smile);
        }

        let views = self.views(&smiles)?;
        let surface = VolSurface::from_parts(
            obs.pair().clone(),
            obs.date(),
            obs.spot(),
            smiles,
            self.config.extrapolation,
            views,
        );

        #[cfg(feature = "logging")]
        tracing::debug!(
            pair = %surface.pair(),
            date = %surface.date(),
            anchors = surface.views().quoted_points.len(),
            "vol surface built"
        );

        Ok(surface)
    }

    fn views(&self, smiles: &[FxSmile]) -> Result<SurfaceViews> {
        let grid = &self.config.grid;
        let tenors: Vec<_> = smiles.iter().map(FxSmile::tenor).collect();

        let (k_lo, k_hi) = smiles
            .iter()
            .map(FxSmile::strike_range)
            .fold(
                (f64::INFINITY, f64::NEG_INFINITY),
                |(lo, hi), (a, b)| (lo.min(a), hi.max(b)),
            );
        let strikes = linspace(k_lo, k_hi, grid.strike_points);
        let strike_values = strikes
            .iter()
            .map(|&k| {
                smiles
                    .iter()
                    .map(|s| Ok(s.solve_strike(k)?.vol))
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        let deltas = linspace(grid.delta_min, grid.delta_max, grid.delta_points);
        let delta_values = deltas
            .iter()
            .map(|&x| {
                smiles
                    .iter()
                    .map(|s| Ok(s.vol_at_delta(x)?.0))
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        let conventions = self.config.conventions;
        let table = STANDARD_DELTAS
            .iter()
            .map(|&(_, signed)| {
                smiles
                    .iter()
                    .map(|s| match (signed, conventions.atm) {
                        (Some(delta), _) => {
                            let x = to_call_delta(delta, conventions.delta, s.market().df_foreign)?;
                            Ok(s.strike_at_delta(x)?.0)
                        }
                        (None, AtmConvention::DeltaNeutral) => Ok(s.strike_at_delta(0.5)?.0),
                        (None, AtmConvention::Forward) => Ok(s.market().forward),
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        let quoted_points = smiles
            .iter()
            .flat_map(|s| {
                s.anchors().iter().map(|a| QuotedPoint {
                    tenor: s.tenor(),
                    label: a.label.clone(),
                    call_delta: a.call_delta,
                    strike: a.strike,
                    vol: a.vol,
                })
            })
            .collect();

        Ok(SurfaceViews {
            strike_space: VolGrid {
                axis: GridAxis::Strike,
                rows: strikes,
                tenors: tenors.clone(),
                values: strike_values,
            },
            delta_space: VolGrid {
                axis: GridAxis::CallDelta,
                rows: deltas,
                tenors: tenors.clone(),
                values: delta_values,
            },
            deltas_vs_strikes: DeltaStrikeTable {
                labels: STANDARD_DELTAS.iter().map(|(l, _)| (*l).to_owned()).collect(),
                tenors,
                strikes: table,
            },
            quoted_points,
        })
    }
}

/// `n` evenly spaced points from `lo` to `hi` inclusive.
pub(crate) fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    if n < 2 {
        return vec![lo];
    }
    let step = (hi - lo) / (n - 1) as f64;
    (0..n)
        .map(|i| if i == n - 1 { hi } else { lo + step * i as f64 })
        .collect()
}
