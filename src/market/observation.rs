use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::conventions::{Compounding, forward_price};
use crate::error::{Result, VolSurfError};
use crate::market::pair::CurrencyPair;
use crate::market::quote::{ForwardQuote, SmileQuote};
use crate::market::rates::RateCurve;
use crate::market::tenor::Tenor;
use crate::validate::{validate_finite, validate_positive};

/// Market snapshot for one currency pair on one date.
///
/// Domestic rates belong to the quote currency (USD in GBPUSD), foreign rates
/// to the base currency. Every tenor with a smile quote must be priced: the
/// domestic deposit curve has to span it, and either the foreign curve spans
/// it too or a forward is quoted at that tenor (the foreign rate is then
/// implied from the forward).
///
/// ```
/// use chrono::NaiveDate;
/// use fxvolsurf::{ForwardQuote, MarketObservationSet, SmileQuote, Tenor};
///
/// let one_month: Tenor = "1M".parse().unwrap();
/// let obs = MarketObservationSet::builder(
///     "EURUSD".parse().unwrap(),
///     NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
///     1.0850,
/// )
/// .domestic_rate(one_month, 0.053)
/// .forward(one_month, ForwardQuote::Points(28.0))
/// .smile(one_month, SmileQuote::atm(0.065))
/// .build()
/// .unwrap();
/// assert_eq!(obs.smile_tenors().count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketObservationSet {
    pair: CurrencyPair,
    date: NaiveDate,
    spot: f64,
    #[serde(default)]
    forwards: BTreeMap<Tenor, ForwardQuote>,
    smiles: BTreeMap<Tenor, SmileQuote>,
    #[serde(default)]
    domestic_rates: BTreeMap<Tenor, f64>,
    #[serde(default)]
    foreign_rates: BTreeMap<Tenor, f64>,
}

/// Forward and discounting inputs resolved for one tenor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TenorMarket {
    pub years: f64,
    pub forward: f64,
    pub df_domestic: f64,
    pub df_foreign: f64,
}

impl MarketObservationSet {
    pub fn builder(pair: CurrencyPair, date: NaiveDate, spot: f64) -> MarketObservationSetBuilder {
        MarketObservationSetBuilder {
            set: MarketObservationSet {
                pair,
                date,
                spot,
                forwards: BTreeMap::new(),
                smiles: BTreeMap::new(),
                domestic_rates: BTreeMap::new(),
                foreign_rates: BTreeMap::new(),
            },
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

    /// Quoted smile tenors, shortest first.
    pub fn smile_tenors(&self) -> impl Iterator<Item = &Tenor> {
        self.smiles.keys()
    }

    pub fn smile(&self, tenor: &Tenor) -> Option<&SmileQuote> {
        self.smiles.get(tenor)
    }

    pub fn smiles(&self) -> &BTreeMap<Tenor, SmileQuote> {
        &self.smiles
    }

    pub fn forward_quote(&self, tenor: &Tenor) -> Option<&ForwardQuote> {
        self.forwards.get(tenor)
    }

    pub fn domestic_rates(&self) -> &BTreeMap<Tenor, f64> {
        &self.domestic_rates
    }

    pub fn foreign_rates(&self) -> &BTreeMap<Tenor, f64> {
        &self.foreign_rates
    }

    /// Deposit curves `(domestic, foreign)` under the given compounding.
    pub fn rate_curves(&self, compounding: Compounding) -> Result<(RateCurve, RateCurve)> {
        let to_curve = |rates: &BTreeMap<Tenor, f64>| {
            RateCurve::new(
                rates.iter().map(|(t, r)| (t.years(), *r)).collect(),
                compounding,
            )
        };
        let domestic = to_curve(&self.domestic_rates)?;
        let foreign = to_curve(&self.foreign_rates)?;
        Ok((domestic, foreign))
    }

    /// Resolve forward and discount factors at `tenor`.
    ///
    /// # Errors
    /// [`VolSurfError::InsufficientData`] when the deposit curves and forward
    /// quotes do not cover the tenor.
    pub fn tenor_market(
        &self,
        tenor: &Tenor,
        domestic: &RateCurve,
        foreign: &RateCurve,
    ) -> Result<TenorMarket> {
        let years = tenor.years();
        let df_domestic = domestic
            .discount_factor(years)
            .map_err(|e| self.coverage_error(tenor, self.pair.quote(), e))?;
        let quoted = self
            .forwards
            .get(tenor)
            .map(|q| q.outright(self.spot, self.pair.pip_size()));
        let df_foreign = if foreign.covers(years) {
            foreign.discount_factor(years)?
        } else if let Some(forward) = quoted {
            forward * df_domestic / self.spot
        } else {
            return Err(VolSurfError::InsufficientData {
                message: format!(
                    "{} {}: no {} deposit rate or forward quote covering {}",
                    self.pair, self.date, self.pair.base(), tenor
                ),
            });
        };
        let forward = quoted.unwrap_or_else(|| forward_price(self.spot, df_domestic, df_foreign));
        if !forward.is_finite() || forward <= 0.0 || !df_foreign.is_finite() || df_foreign <= 0.0 {
            return Err(VolSurfError::InvalidInput {
                message: format!(
                    "{} {}: unusable forward {forward} at {tenor}",
                    self.pair, self.date
                ),
            });
        }
        Ok(TenorMarket {
            years,
            forward,
            df_domestic,
            df_foreign,
        })
    }

    fn coverage_error(&self, tenor: &Tenor, currency: &str, err: VolSurfError) -> VolSurfError {
        match err {
            VolSurfError::InsufficientData { message } => VolSurfError::InsufficientData {
                message: format!(
                    "{} {}: {currency} deposits for {tenor}: {message}",
                    self.pair, self.date
                ),
            },
            other => other,
        }
    }

    /// Check values and tenor coverage.
    ///
    /// # Errors
    /// [`VolSurfError::InvalidInput`] for malformed numbers and
    /// [`VolSurfError::InsufficientData`] when no smile is quoted or a smile
    /// tenor cannot be priced.
    pub fn validate(&self) -> Result<()> {
        validate_positive(self.spot, "spot")?;
        for rate in self.domestic_rates.values().chain(self.foreign_rates.values()) {
            validate_finite(*rate, "deposit rate")?;
        }
        for (tenor, quote) in &self.forwards {
            let outright = quote.outright(self.spot, self.pair.pip_size());
            if !outright.is_finite() || outright <= 0.0 {
                return Err(VolSurfError::InvalidInput {
                    message: format!(
                        "forward at {tenor} must be positive and finite, got {outright}"
                    ),
                });
            }
        }
        if self.smiles.is_empty() {
            return Err(VolSurfError::InsufficientData {
                message: format!("{} {}: no vol quotes", self.pair, self.date),
            });
        }
        let (domestic, foreign) = self.rate_curves(Compounding::default())?;
        for (tenor, quote) in &self.smiles {
            quote.validate().map_err(|e| match e {
                VolSurfError::InvalidInput { message } => VolSurfError::InvalidInput {
                    message: format!("{tenor} smile: {message}"),
                },
                VolSurfError::InsufficientData { message } => VolSurfError::InsufficientData {
                    message: format!("{tenor} smile: {message}"),
                },
                other => other,
            })?;
            self.tenor_market(tenor, &domestic, &foreign)?;
        }
        Ok(())
    }
}

/// Builder for [`MarketObservationSet`]. Later entries for the same tenor
/// replace earlier ones.
#[derive(Debug, Clone)]
pub struct MarketObservationSetBuilder {
    set: MarketObservationSet,
}

impl MarketObservationSetBuilder {
    pub fn domestic_rate(mut self, tenor: Tenor, rate: f64) -> Self {
        self.set.domestic_rates.insert(tenor, rate);
        self
    }

    pub fn foreign_rate(mut self, tenor: Tenor, rate: f64) -> Self {
        self.set.foreign_rates.insert(tenor, rate);
        self
    }

    pub fn forward(mut self, tenor: Tenor, quote: ForwardQuote) -> Self {
        self.set.forwards.insert(tenor, quote);
        self
    }

    pub fn smile(mut self, tenor: Tenor, quote: SmileQuote) -> Self {
        self.set.smiles.insert(tenor, quote);
        self
    }

    /// # Errors
    /// See [`MarketObservationSet::validate`].
    pub fn build(self) -> Result<MarketObservationSet> {
        self.set.validate()?;
        Ok(self.set)
    }
}
