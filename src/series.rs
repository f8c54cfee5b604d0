//! Surfaces over a range of dates.
//!
//! Each date is calibrated independently. With the `parallel` feature the
//! dates run on a rayon pool, bounded by `batch.max_concurrency` when set.
//! Results always come back in ascending date order. Under
//! [`FailurePolicy::Isolate`] a failing date is recorded as
//! [`DateOutcome::Failed`] and the others are unaffected; under
//! [`FailurePolicy::FailFast`] the earliest failing date's error is returned.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::{EngineConfig, FailurePolicy};
use crate::error::{Result, VolSurfError};
use crate::market::{CurrencyPair, MarketObservationSet};
use crate::surface::{SurfaceBuilder, SurfaceView, VolSurface};

/// Animation-title style label for a date, e.g. `20 Jun 2016`.
pub fn date_label(date: NaiveDate) -> String {
    date.format("%d %b %Y").to_string()
}

/// Calibration result for one date.
#[derive(Debug, Clone)]
pub enum DateOutcome {
    Built(Box<VolSurface>),
    Failed(VolSurfError),
}

impl DateOutcome {
    pub fn surface(&self) -> Option<&VolSurface> {
        match self {
            DateOutcome::Built(s) => Some(s),
            DateOutcome::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&VolSurfError> {
        match self {
            DateOutcome::Built(_) => None,
            DateOutcome::Failed(e) => Some(e),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SeriesEntry {
    pub date: NaiveDate,
    pub outcome: DateOutcome,
}

/// Lowest and highest vol on one grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolRange {
    pub min: f64,
    pub max: f64,
}

impl VolRange {
    fn widen(self, other: VolRange) -> VolRange {
        VolRange {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

/// Per-date and overall vol ranges over the successfully built dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesExtremes {
    pub view: SurfaceView,
    pub per_date: BTreeMap<NaiveDate, VolRange>,
    /// `None` when no date was built.
    pub overall: Option<VolRange>,
}

impl SeriesExtremes {
    fn collect(entries: &[SeriesEntry], view: SurfaceView) -> Self {
        let per_date: BTreeMap<NaiveDate, VolRange> = entries
            .iter()
            .filter_map(|e| {
                let (min, max) = e.outcome.surface()?.views().grid(view).range()?;
                Some((e.date, VolRange { min, max }))
            })
            .collect();
        let overall = per_date.values().copied().reduce(VolRange::widen);
        Self {
            view,
            per_date,
            overall,
        }
    }
}

/// Surfaces for one currency pair over many dates, ascending by date.
#[derive(Debug, Clone)]
pub struct SurfaceSeries {
    pair: CurrencyPair,
    entries: Vec<SeriesEntry>,
    extremes: SeriesExtremes,
}

impl SurfaceSeries {
    pub fn pair(&self) -> &CurrencyPair {
        &self.pair
    }

    /// One entry per input date.
    pub fn entries(&self) -> &[SeriesEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, date: NaiveDate) -> Option<&DateOutcome> {
        self.entries
            .binary_search_by_key(&date, |e| e.date)
            .ok()
            .map(|i| &self.entries[i].outcome)
    }

    pub fn succeeded(&self) -> impl Iterator<Item = (NaiveDate, &VolSurface)> {
        self.entries
            .iter()
            .filter_map(|e| e.outcome.surface().map(|s| (e.date, s)))
    }

    pub fn failed(&self) -> impl Iterator<Item = (NaiveDate, &VolSurfError)> {
        self.entries
            .iter()
            .filter_map(|e| e.outcome.error().map(|err| (e.date, err)))
    }

    pub fn extremes(&self) -> &SeriesExtremes {
        &self.extremes
    }

    /// Date labels of the built surfaces, in order.
    pub fn labels(&self) -> Vec<String> {
        self.succeeded().map(|(d, _)| date_label(d)).collect()
    }
}

/// A date to calibrate, or the reason its inputs are unavailable.
pub(crate) type SeriesInput<'a> = (NaiveDate, Result<&'a MarketObservationSet>);

/// Calibrate every input and assemble the series.
pub(crate) fn build_series(
    inputs: Vec<SeriesInput<'_>>,
    pair: &CurrencyPair,
    view: SurfaceView,
    config: &EngineConfig,
) -> Result<SurfaceSeries> {
    let mut inputs = inputs;
    inputs.sort_by_key(|(date, _)| *date);

    #[cfg(feature = "logging")]
    tracing::info!(pair = %pair, dates = inputs.len(), "building surface series");

    let outcomes = calibrate_all(&inputs, pair, config)?;
    let mut entries = Vec::with_capacity(outcomes.len());
    for ((date, _), outcome) in inputs.iter().zip(outcomes) {
        let outcome = match outcome {
            Ok(surface) => DateOutcome::Built(Box::new(surface)),
            Err(err) => {
                if config.batch.failure_policy == FailurePolicy::FailFast {
                    return Err(err);
                }
                #[cfg(feature = "logging")]
                tracing::warn!(
                    pair = %pair,
                    date = %date,
                    error = %err,
                    "surface calibration failed"
                );
                DateOutcome::Failed(err)
            }
        };
        entries.push(SeriesEntry {
            date: *date,
            outcome,
        });
    }

    let extremes = SeriesExtremes::collect(&entries, view);
    let series = SurfaceSeries {
        pair: pair.clone(),
        entries,
        extremes,
    };

    #[cfg(feature = "logging")]
    tracing::info!(
        pair = %pair,
        built = series.succeeded().count(),
        failed = series.failed().count(),
        "surface series complete"
    );

    Ok(series)
}

fn calibrate_one(
    date: NaiveDate,
    input: &Result<&MarketObservationSet>,
    pair: &CurrencyPair,
    config: &EngineConfig,
) -> Result<VolSurface> {
    let obs = input.as_ref().map_err(Clone::clone)?;
    if obs.pair() != pair {
        return Err(VolSurfError::InvalidInput {
            message: format!(
                "observation set for {date} is for {}, expected {pair}",
                obs.pair()
            ),
        });
    }
    if obs.date() != date {
        return Err(VolSurfError::InvalidInput {
            message: format!("observation set dated {} filed under {date}", obs.date()),
        });
    }
    SurfaceBuilder::new(config).build(obs)
}

#[cfg(feature = "parallel")]
fn calibrate_all(
    inputs: &[SeriesInput<'_>],
    pair: &CurrencyPair,
    config: &EngineConfig,
) -> Result<Vec<Result<VolSurface>>> {
    let run = || {
        inputs
            .par_iter()
            .map(|(date, input)| calibrate_one(*date, input, pair, config))
            .collect::<Vec<_>>()
    };
    match config.batch.max_concurrency {
        Some(threads) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| VolSurfError::InvalidConfig {
                    message: format!("cannot start {threads} calibration workers: {e}"),
                })?;
            Ok(pool.install(run))
        }
        None => Ok(run()),
    }
}

#[cfg(not(feature = "parallel"))]
fn calibrate_all(
    inputs: &[SeriesInput<'_>],
    pair: &CurrencyPair,
    config: &EngineConfig,
) -> Result<Vec<Result<VolSurface>>> {
    Ok(inputs
        .iter()
        .map(|(date, input)| calibrate_one(*date, input, pair, config))
        .collect())
}
