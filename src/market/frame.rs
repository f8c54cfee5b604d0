//! Time-indexed market data table keyed by `<ticker>.<field>` columns.

use std::collections::BTreeMap;
use std::io;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VolSurfError};
use crate::market::observation::MarketObservationSet;
use crate::market::pair::CurrencyPair;
use crate::market::quote::{ForwardQuote, RrBfPillar, SmileQuote};
use crate::market::tenor::Tenor;

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d %b %Y", "%d/%m/%Y"];

/// Column naming and unit conventions of a vendor dataset.
///
/// With the defaults, a GBPUSD frame is read through columns such as
/// `GBPUSD.close` (spot), `GBPUSDV1M.close` (ATM vol), `GBPUSD25R1M.close`
/// and `GBPUSD25B1M.close` (25D risk reversal and butterfly),
/// `GBPUSD1M.close` (forward points) and `GBP1M.close` / `USD1M.close`
/// (deposit rates). Vols and rates are quoted in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickerSchema {
    pub field: String,
    pub tenors: Vec<Tenor>,
    /// Pillar deltas in delta points, e.g. `[25, 10]`.
    pub pillar_deltas: Vec<u32>,
    /// Multiplier from quoted vol units to decimals.
    pub vol_scale: f64,
    /// Multiplier from quoted deposit units to decimals.
    pub rate_scale: f64,
}

impl Default for TickerSchema {
    fn default() -> Self {
        let tenors = [
            Tenor::Overnight,
            Tenor::Weeks(1),
            Tenor::Weeks(2),
            Tenor::Weeks(3),
            Tenor::Months(1),
            Tenor::Months(2),
            Tenor::Months(3),
            Tenor::Months(4),
            Tenor::Months(6),
            Tenor::Months(9),
            Tenor::Years(1),
            Tenor::Years(2),
            Tenor::Years(3),
            Tenor::Years(5),
        ];
        Self {
            field: "close".to_owned(),
            tenors: tenors.to_vec(),
            pillar_deltas: vec![25, 10],
            vol_scale: 0.01,
            rate_scale: 0.01,
        }
    }
}

impl TickerSchema {
    pub fn spot_column(&self, pair: &CurrencyPair) -> String {
        format!("{pair}.{}", self.field)
    }

    pub fn atm_column(&self, pair: &CurrencyPair, tenor: &Tenor) -> String {
        format!("{pair}V{tenor}.{}", self.field)
    }

    pub fn risk_reversal_column(&self, pair: &CurrencyPair, delta: u32, tenor: &Tenor) -> String {
        format!("{pair}{delta}R{tenor}.{}", self.field)
    }

    pub fn butterfly_column(&self, pair: &CurrencyPair, delta: u32, tenor: &Tenor) -> String {
        format!("{pair}{delta}B{tenor}.{}", self.field)
    }

    pub fn forward_points_column(&self, pair: &CurrencyPair, tenor: &Tenor) -> String {
        format!("{pair}{tenor}.{}", self.field)
    }

    pub fn deposit_column(&self, currency: &str, tenor: &Tenor) -> String {
        format!("{currency}{tenor}.{}", self.field)
    }
}

/// Daily market data for one or more instruments.
///
/// Missing cells are simply absent; non-finite values are never stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketFrame {
    rows: BTreeMap<NaiveDate, BTreeMap<String, f64>>,
}

impl MarketFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one cell. Non-finite values clear the cell.
    pub fn insert(&mut self, date: NaiveDate, column: impl Into<String>, value: f64) {
        let row = self.rows.entry(date).or_default();
        let column = column.into();
        if value.is_finite() {
            row.insert(column, value);
        } else {
            row.remove(&column);
        }
    }

    /// Read a CSV whose first column holds dates and whose remaining columns
    /// are tickers. Empty and `NaN` cells are treated as missing.
    ///
    /// # Errors
    /// [`VolSurfError::DataSource`] for malformed CSV, and
    /// [`VolSurfError::InvalidInput`] for unparseable dates or numbers.
    pub fn from_csv<R: io::Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = rdr.headers()?.clone();
        if headers.len() < 2 {
            return Err(VolSurfError::DataSource {
                message: "market frame CSV needs a date column and at least one ticker column"
                    .into(),
            });
        }

        let mut frame = Self::new();
        for record in rdr.records() {
            let record = record?;
            let date = parse_date(record.get(0).unwrap_or_default())?;
            frame.rows.entry(date).or_default();
            for (column, cell) in headers.iter().zip(record.iter()).skip(1) {
                if cell.is_empty() || cell.eq_ignore_ascii_case("nan") {
                    continue;
                }
                let value: f64 = cell.parse().map_err(|_| VolSurfError::InvalidInput {
                    message: format!("{date} {column}: cannot parse {cell:?} as a number"),
                })?;
                frame.insert(date, column, value);
            }
        }
        Ok(frame)
    }

    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_csv(io::BufReader::new(file))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Dates in ascending order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.rows.keys().copied()
    }

    pub fn value(&self, date: NaiveDate, column: &str) -> Option<f64> {
        self.rows.get(&date).and_then(|row| row.get(column)).copied()
    }

    /// Assemble the observation set for `pair` on `date`.
    ///
    /// A tenor is quoted when its ATM column is present; a delta pillar is
    /// used only when both its risk reversal and butterfly are present.
    ///
    /// # Errors
    /// [`VolSurfError::InsufficientData`] when the date, the spot or every
    /// ATM quote is missing, or a quoted tenor lacks rate coverage.
    pub fn observation_set(
        &self,
        date: NaiveDate,
        pair: &CurrencyPair,
        schema: &TickerSchema,
    ) -> Result<MarketObservationSet> {
        if !self.rows.contains_key(&date) {
            return Err(VolSurfError::InsufficientData {
                message: format!("no market data for {date}"),
            });
        }
        let spot_column = schema.spot_column(pair);
        let spot = self
            .value(date, &spot_column)
            .ok_or_else(|| VolSurfError::InsufficientData {
                message: format!("{pair} {date}: missing spot column {spot_column}"),
            })?;

        let mut builder = MarketObservationSet::builder(pair.clone(), date, spot);
        for tenor in &schema.tenors {
            if let Some(rate) = self.value(date, &schema.deposit_column(pair.quote(), tenor)) {
                builder = builder.domestic_rate(*tenor, rate * schema.rate_scale);
            }
            if let Some(rate) = self.value(date, &schema.deposit_column(pair.base(), tenor)) {
                builder = builder.foreign_rate(*tenor, rate * schema.rate_scale);
            }
            if let Some(points) = self.value(date, &schema.forward_points_column(pair, tenor)) {
                builder = builder.forward(*tenor, ForwardQuote::Points(points));
            }
            let Some(atm) = self.value(date, &schema.atm_column(pair, tenor)) else {
                continue;
            };
            let pillars = schema
                .pillar_deltas
                .iter()
                .filter_map(|&d| {
                    let rr = self.value(date, &schema.risk_reversal_column(pair, d, tenor))?;
                    let bf = self.value(date, &schema.butterfly_column(pair, d, tenor))?;
                    Some(RrBfPillar::new(
                        f64::from(d) / 100.0,
                        rr * schema.vol_scale,
                        bf * schema.vol_scale,
                    ))
                })
                .collect();
            builder = builder.smile(
                *tenor,
                SmileQuote::Strategies {
                    atm: atm * schema.vol_scale,
                    pillars,
                },
            );
        }
        builder.build()
    }
}

fn parse_date(cell: &str) -> Result<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(cell, fmt).ok())
        .ok_or_else(|| VolSurfError::InvalidInput {
            message: format!("cannot parse {cell:?} as a date"),
        })
}
