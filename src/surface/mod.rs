//! Calibrated multi-tenor FX volatility surface.
//!
//! A [`VolSurface`] holds one [`FxSmile`] per quoted tenor. Queries at a
//! quoted tenor go straight to its smile; other expiries interpolate total
//! variance linearly in time, at fixed strike for strike queries and at fixed
//! forward call delta for delta queries. Vol is held flat before the first
//! and after the last tenor.
//!
//! # Extrapolation band
//!
//! A strike query is refused with [`VolSurfError::OutOfDomain`] when its
//! solved forward call delta falls outside `[min_call_delta, 1 − min_call_delta]`
//! at any smile it reads, or when the expiry exceeds
//! `max_expiry_ratio × last tenor`. Inside the band, extrapolation is flat.

pub mod arbitrage;
pub mod builder;
pub(crate) mod interp;
pub mod views;

pub use arbitrage::{CalendarViolation, SurfaceDiagnostics};
pub use builder::SurfaceBuilder;
pub use views::{DeltaStrikeTable, GridAxis, QuotedPoint, SurfaceView, SurfaceViews, VolGrid};

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::ExtrapolationConfig;
use crate::conventions::AtmConvention;
use crate::error::{Result, VolSurfError};
use crate::market::{CurrencyPair, Tenor};
use crate::math::norm_inv_cdf;
use crate::smile::{FxSmile, SmileSection};
use crate::types::{Strike, Variance, Vol};
use crate::validate::{validate_open_unit, validate_positive};
use interp::{bracketing_nodes, interpolate_total_variance};

/// Calendar checks tolerate this much variance decrease.
const CALENDAR_TOLERANCE: f64 = 1e-12;

/// Immutable calibrated surface for one currency pair and date.
#[derive(Debug, Clone, Serialize)]
pub struct VolSurface {
    pair: CurrencyPair,
    date: NaiveDate,
    spot: f64,
    smiles: Vec<FxSmile>,
    extrapolation: ExtrapolationConfig,
    views: SurfaceViews,
}

impl VolSurface {
    pub(crate) fn from_parts(
        pair: CurrencyPair,
        date: NaiveDate,
        spot: f64,
        smiles: Vec<FxSmile>,
        extrapolation: ExtrapolationConfig,
        views: SurfaceViews,
    ) -> Self {
        Self {
            pair,
            date,
            spot,
            smiles,
            extrapolation,
            views,
        }
    }

    pub fn pair(&self) -> &CurrencyPair {
        &self.pair
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn spot(&self) -> f64 {
        self.spot
    }

    /// Quoted tenors, shortest first.
    pub fn tenors(&self) -> Vec<Tenor> {
        self.smiles.iter().map(FxSmile::tenor).collect()
    }

    pub fn smiles(&self) -> &[FxSmile] {
        &self.smiles
    }

    pub fn smile(&self, tenor: &Tenor) -> Option<&FxSmile> {
        self.smiles.iter().find(|s| s.tenor() == *tenor)
    }

    /// Precomputed dense views.
    pub fn views(&self) -> &SurfaceViews {
        &self.views
    }

    /// Vol at `strike` for `tenor`, quoted or not.
    pub fn vol_at_strike(&self, strike: f64, tenor: &Tenor) -> Result<Vol> {
        self.vol_at_expiry(strike, tenor.years())
    }

    /// Vol at `strike` for an expiry given in years.
    ///
    /// # Errors
    /// - [`VolSurfError::OutOfDomain`] beyond the extrapolation band.
    /// - [`VolSurfError::CalibrationFailure`] if a strike solve fails.
    pub fn vol_at_expiry(&self, strike: f64, expiry: f64) -> Result<Vol> {
        validate_positive(strike, "strike")?;
        let (left, right) = self.bracket(expiry)?;
        let vol_left = self.banded_vol(left, strike)?;
        if left == right {
            return Ok(vol_left);
        }
        let vol_right = self.banded_vol(right, strike)?;
        Ok(self.blend(left, vol_left, right, vol_right, expiry))
    }

    /// Total variance σ²T at `strike` and `expiry`.
    pub fn variance_at_expiry(&self, strike: f64, expiry: f64) -> Result<Variance> {
        let vol = self.vol_at_expiry(strike, expiry)?;
        Ok(Variance(vol.0 * vol.0 * expiry))
    }

    /// Vol at forward call delta `x` for `tenor`.
    pub fn vol_at_delta(&self, call_delta: f64, tenor: &Tenor) -> Result<Vol> {
        self.vol_at_delta_expiry(call_delta, tenor.years())
    }

    fn vol_at_delta_expiry(&self, call_delta: f64, expiry: f64) -> Result<Vol> {
        validate_open_unit(call_delta, "call delta")?;
        self.check_delta_band(call_delta)?;
        let (left, right) = self.bracket(expiry)?;
        let vol_left = self.smiles[left].vol_at_delta(call_delta)?;
        if left == right {
            return Ok(vol_left);
        }
        let vol_right = self.smiles[right].vol_at_delta(call_delta)?;
        Ok(self.blend(left, vol_left, right, vol_right, expiry))
    }

    /// Strike whose forward call delta is `x` at `tenor`.
    ///
    /// Non-quoted tenors use the interpolated vol and a forward interpolated
    /// log-linearly in time (nearest forward outside the quoted range).
    pub fn strike_for_delta(&self, call_delta: f64, tenor: &Tenor) -> Result<Strike> {
        if let Some(smile) = self.smile(tenor) {
            return smile.strike_at_delta(call_delta);
        }
        let expiry = tenor.years();
        let vol = self.vol_at_delta_expiry(call_delta, expiry)?.0;
        let std_dev = vol * expiry.sqrt();
        let forward = self.forward_at(expiry)?;
        Ok(Strike(
            forward * (-norm_inv_cdf(call_delta) * std_dev + 0.5 * std_dev * std_dev).exp(),
        ))
    }

    /// ATM vol at `tenor` under the surface's ATM convention.
    pub fn atm_vol(&self, tenor: &Tenor) -> Result<Vol> {
        if let Some(smile) = self.smile(tenor) {
            return smile.atm_vol();
        }
        let expiry = tenor.years();
        let convention = self
            .smiles
            .first()
            .map_or(AtmConvention::default(), FxSmile::atm_convention);
        match convention {
            AtmConvention::DeltaNeutral => self.vol_at_delta_expiry(0.5, expiry),
            AtmConvention::Forward => self.vol_at_expiry(self.forward_at(expiry)?, expiry),
        }
    }

    /// Butterfly reports per tenor and calendar checks on the delta grid.
    pub fn diagnostics(&self) -> Result<SurfaceDiagnostics> {
        let smile_reports = self
            .smiles
            .iter()
            .map(SmileSection::is_arbitrage_free)
            .collect::<Result<Vec<_>>>()?;

        let mut calendar_violations = Vec::new();
        for pair in self.smiles.windows(2) {
            let (short, long) = (&pair[0], &pair[1]);
            for &x in &self.views.delta_space.rows {
                let w_short = short.vol_at_delta(x)?.0.powi(2) * short.years();
                let w_long = long.vol_at_delta(x)?.0.powi(2) * long.years();
                if w_long < w_short - CALENDAR_TOLERANCE {
                    calendar_violations.push(CalendarViolation {
                        call_delta: x,
                        tenor_short: short.tenor(),
                        tenor_long: long.tenor(),
                        variance_short: w_short,
                        variance_long: w_long,
                    });
                }
            }
        }
        Ok(SurfaceDiagnostics::new(smile_reports, calendar_violations))
    }

    fn bracket(&self, expiry: f64) -> Result<(usize, usize)> {
        validate_positive(expiry, "expiry")?;
        let last = self.smiles.last().ok_or_else(|| VolSurfError::InsufficientData {
            message: "surface has no smiles".into(),
        })?;
        let limit = self.extrapolation.max_expiry_ratio * last.years();
        if expiry > limit {
            return Err(VolSurfError::OutOfDomain {
                message: format!(
                    "expiry {expiry:.4}y is beyond {limit:.4}y ({}× the last tenor {})",
                    self.extrapolation.max_expiry_ratio,
                    last.tenor()
                ),
            });
        }
        let years: Vec<f64> = self.smiles.iter().map(FxSmile::years).collect();
        Ok(bracketing_nodes(&years, expiry))
    }

    fn banded_vol(&self, index: usize, strike: f64) -> Result<Vol> {
        let smile = &self.smiles[index];
        let solution = smile.solve_strike(strike)?;
        self.check_delta_band(solution.call_delta).map_err(|_| VolSurfError::OutOfDomain {
            message: format!(
                "strike {strike} sits at call delta {:.2e} on the {} smile, \
                 outside the band [{}, {}]",
                solution.call_delta,
                smile.tenor(),
                self.extrapolation.min_call_delta,
                1.0 - self.extrapolation.min_call_delta
            ),
        })?;
        Ok(Vol(solution.vol))
    }

    fn check_delta_band(&self, call_delta: f64) -> Result<()> {
        let min = self.extrapolation.min_call_delta;
        if call_delta < min || call_delta > 1.0 - min {
            return Err(VolSurfError::OutOfDomain {
                message: format!(
                    "call delta {call_delta} outside the band [{min}, {}]",
                    1.0 - min
                ),
            });
        }
        Ok(())
    }

    fn blend(&self, left: usize, vol_left: Vol, right: usize, vol_right: Vol, expiry: f64) -> Vol {
        let nodes = [
            (self.smiles[left].years(), vol_left.0.powi(2) * self.smiles[left].years()),
            (self.smiles[right].years(), vol_right.0.powi(2) * self.smiles[right].years()),
        ];
        Vol((interpolate_total_variance(&nodes, expiry) / expiry).sqrt())
    }

    fn forward_at(&self, expiry: f64) -> Result<f64> {
        let (left, right) = self.bracket(expiry)?;
        let (a, b) = (self.smiles[left].market(), self.smiles[right].market());
        if left == right {
            return Ok(a.forward);
        }
        let alpha = (expiry - a.years) / (b.years - a.years);
        let log_forward = a.forward.ln() * (1.0 - alpha) + b.forward.ln() * alpha;
        Ok(log_forward.exp())
    }
}
