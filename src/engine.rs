//! Engine facade: calibration, point queries, dense views and batches under
//! one validated configuration.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::market::{CurrencyPair, MarketFrame, MarketObservationSet, Tenor, TickerSchema};
use crate::series::{self, SurfaceSeries};
use crate::surface::{SurfaceBuilder, SurfaceView, SurfaceViews, VolSurface};
use crate::types::Vol;

/// FX volatility surface engine.
///
/// Holds no state beyond its configuration; every operation is a pure
/// function of its inputs, so one engine can be shared across threads.
///
/// ```
/// use chrono::NaiveDate;
/// use fxvolsurf::{MarketObservationSet, RrBfPillar, SmileQuote, Tenor, VolSurfaceEngine};
///
/// let one_week = Tenor::Weeks(1);
/// let obs = MarketObservationSet::builder(
///     "GBPUSD".parse()?,
///     NaiveDate::from_ymd_opt(2016, 6, 20).unwrap(),
///     1.4684,
/// )
/// .domestic_rate(one_week, 0.0040)
/// .foreign_rate(one_week, 0.0045)
/// .smile(one_week, SmileQuote::Strategies {
///     atm: 0.38,
///     pillars: vec![
///         RrBfPillar::new(0.25, -0.09, 0.015),
///         RrBfPillar::new(0.10, -0.17, 0.05),
///     ],
/// })
/// .build()?;
///
/// let engine = VolSurfaceEngine::with_defaults();
/// let surface = engine.build_surface(&obs)?;
/// let vol = engine.query_vol(&surface, 1.4000, &one_week)?;
/// assert!(vol.0 > 0.38 && vol.0 < 0.515);
/// # Ok::<(), fxvolsurf::VolSurfError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct VolSurfaceEngine {
    config: EngineConfig,
}

impl VolSurfaceEngine {
    /// # Errors
    /// [`VolSurfError::InvalidConfig`](crate::VolSurfError::InvalidConfig)
    /// if the configuration does not validate.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn with_defaults() -> Self {
        Self::default()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Calibrate the surface for one observation set.
    pub fn build_surface(&self, obs: &MarketObservationSet) -> Result<VolSurface> {
        SurfaceBuilder::new(&self.config).build(obs)
    }

    /// Implied vol at `(strike, tenor)`.
    pub fn query_vol(&self, surface: &VolSurface, strike: f64, tenor: &Tenor) -> Result<Vol> {
        surface.vol_at_strike(strike, tenor)
    }

    /// Implied vol at forward call delta `call_delta` and `tenor`.
    pub fn query_vol_at_delta(
        &self,
        surface: &VolSurface,
        call_delta: f64,
        tenor: &Tenor,
    ) -> Result<Vol> {
        surface.vol_at_delta(call_delta, tenor)
    }

    /// Strike-space, delta-space, delta→strike and quoted-point views.
    pub fn extract_surface(&self, surface: &VolSurface) -> SurfaceViews {
        surface.views().clone()
    }

    /// Calibrate every date and summarize `view` vol ranges.
    ///
    /// # Errors
    /// Per-date failures are recorded in the series unless the failure
    /// policy is fail-fast.
    pub fn build_series(
        &self,
        sets: &BTreeMap<NaiveDate, MarketObservationSet>,
        pair: &CurrencyPair,
        view: SurfaceView,
    ) -> Result<SurfaceSeries> {
        let inputs = sets.iter().map(|(date, obs)| (*date, Ok(obs))).collect();
        series::build_series(inputs, pair, view, &self.config)
    }

    /// Build observation sets for every date in `frame`, then the series.
    /// Dates whose data is incomplete become failed entries.
    pub fn build_series_from_frame(
        &self,
        frame: &MarketFrame,
        pair: &CurrencyPair,
        schema: &TickerSchema,
        view: SurfaceView,
    ) -> Result<SurfaceSeries> {
        let sets: Vec<(NaiveDate, Result<MarketObservationSet>)> = frame
            .dates()
            .map(|date| (date, frame.observation_set(date, pair, schema)))
            .collect();
        let inputs = sets
            .iter()
            .map(|(date, set)| (*date, set.as_ref().map_err(Clone::clone)))
            .collect();
        series::build_series(inputs, pair, view, &self.config)
    }
}
