use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VolSurfError};

/// An FX currency pair such as `GBPUSD`.
///
/// The base currency is the asset (foreign), the quote currency is the
/// numeraire (domestic). Spot, forwards and strikes are in quote currency per
/// unit of base currency.
///
/// # Examples
/// ```
/// use fxvolsurf::CurrencyPair;
/// let pair: CurrencyPair = "GBPUSD".parse().unwrap();
/// assert_eq!(pair.base(), "GBP");
/// assert_eq!(pair.quote(), "USD");
/// assert_eq!(pair.pip_size(), 0.0001);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyPair {
    base: String,
    quote: String,
}

impl CurrencyPair {
    /// # Errors
    /// [`VolSurfError::InvalidInput`] unless both codes are three ASCII
    /// letters and differ from each other.
    pub fn new(base: &str, quote: &str) -> Result<Self> {
        let base = normalize_code(base)?;
        let quote = normalize_code(quote)?;
        if base == quote {
            return Err(VolSurfError::InvalidInput {
                message: format!(
                    "currency pair needs two distinct currencies, got {base}{quote}"
                ),
            });
        }
        Ok(Self { base, quote })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn quote(&self) -> &str {
        &self.quote
    }

    /// Size of one forward point: 0.01 for JPY-quoted pairs, 0.0001 otherwise.
    pub fn pip_size(&self) -> f64 {
        if self.quote == "JPY" { 0.01 } else { 0.0001 }
    }
}

fn normalize_code(code: &str) -> Result<String> {
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(VolSurfError::InvalidInput {
            message: format!("currency code must be three letters, got {code:?}"),
        });
    }
    Ok(code.to_ascii_uppercase())
}

impl FromStr for CurrencyPair {
    type Err = VolSurfError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.len() != 6 || !s.is_ascii() {
            return Err(VolSurfError::InvalidInput {
                message: format!("currency pair must be six letters like GBPUSD, got {s:?}"),
            });
        }
        let (base, quote) = s.split_at(3);
        Self::new(base, quote)
    }
}

impl TryFrom<String> for CurrencyPair {
    type Error = VolSurfError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<CurrencyPair> for String {
    fn from(pair: CurrencyPair) -> Self {
        pair.to_string()
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.base, self.quote)
    }
}
