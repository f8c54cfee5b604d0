use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VolSurfError};

const DAYS_PER_YEAR: f64 = 365.0;

/// Standard FX market tenor.
///
/// Year fractions come straight from the code: `ON`, `TN` and `SN` count one
/// day, `nD` is `n/365`, `nW` is `7n/365`, `nM` is `n/12` and `nY` is `n`.
/// No holiday calendar or business-day roll is applied.
///
/// Tenors order by year fraction, with the label breaking ties (`1W` and
/// `7D` are distinct but equally long).
///
/// # Examples
/// ```
/// use fxvolsurf::Tenor;
/// let t: Tenor = "3M".parse().unwrap();
/// assert_eq!(t.years(), 0.25);
/// assert_eq!(t.label(), "3M");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Tenor {
    Overnight,
    TomNext,
    SpotNext,
    Days(u32),
    Weeks(u32),
    Months(u32),
    Years(u32),
}

impl Tenor {
    /// Time to expiry in years.
    pub fn years(&self) -> f64 {
        match *self {
            // Short dates end one, two and three days out.
            Tenor::Overnight => 1.0 / DAYS_PER_YEAR,
            Tenor::TomNext => 2.0 / DAYS_PER_YEAR,
            Tenor::SpotNext => 3.0 / DAYS_PER_YEAR,
            Tenor::Days(n) => f64::from(n) / DAYS_PER_YEAR,
            Tenor::Weeks(n) => 7.0 * f64::from(n) / DAYS_PER_YEAR,
            Tenor::Months(n) => f64::from(n) / 12.0,
            Tenor::Years(n) => f64::from(n),
        }
    }

    /// Market code, e.g. `"1W"`.
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Tenor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tenor::Overnight => f.write_str("ON"),
            Tenor::TomNext => f.write_str("TN"),
            Tenor::SpotNext => f.write_str("SN"),
            Tenor::Days(n) => write!(f, "{n}D"),
            Tenor::Weeks(n) => write!(f, "{n}W"),
            Tenor::Months(n) => write!(f, "{n}M"),
            Tenor::Years(n) => write!(f, "{n}Y"),
        }
    }
}

impl FromStr for Tenor {
    type Err = VolSurfError;

    fn from_str(s: &str) -> Result<Self> {
        let code = s.trim().to_ascii_uppercase();
        match code.as_str() {
            "ON" => return Ok(Tenor::Overnight),
            "TN" => return Ok(Tenor::TomNext),
            "SN" => return Ok(Tenor::SpotNext),
            _ => {}
        }
        let invalid = || VolSurfError::InvalidInput {
            message: format!("unrecognized tenor code {s:?}"),
        };
        let unit = code.chars().last().ok_or_else(invalid)?;
        let count: u32 = code[..code.len() - unit.len_utf8()]
            .parse()
            .map_err(|_| invalid())?;
        if count == 0 {
            return Err(invalid());
        }
        match unit {
            'D' => Ok(Tenor::Days(count)),
            'W' => Ok(Tenor::Weeks(count)),
            'M' => Ok(Tenor::Months(count)),
            'Y' => Ok(Tenor::Years(count)),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for Tenor {
    type Error = VolSurfError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Tenor> for String {
    fn from(tenor: Tenor) -> Self {
        tenor.to_string()
    }
}

impl Ord for Tenor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.years()
            .total_cmp(&other.years())
            .then_with(|| self.label().cmp(&other.label()))
    }
}

impl PartialOrd for Tenor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn year_fractions() {
        let cases = [
            ("ON", 1.0 / 365.0),
            ("TN", 2.0 / 365.0),
            ("SN", 3.0 / 365.0),
            ("1W", 7.0 / 365.0),
            ("2W", 14.0 / 365.0),
            ("10D", 10.0 / 365.0),
            ("1M", 1.0 / 12.0),
            ("6M", 0.5),
            ("2Y", 2.0),
        ];
        for (code, years) in cases {
            let tenor: Tenor = code.parse().unwrap();
            assert_abs_diff_eq!(tenor.years(), years, epsilon = 1e-15);
            assert_eq!(tenor.label(), code);
        }
    }

    #[test]
    fn lowercase_codes_accepted() {
        assert_eq!("1w".parse::<Tenor>().unwrap(), Tenor::Weeks(1));
        assert_eq!("tn".parse::<Tenor>().unwrap(), Tenor::TomNext);
    }

    #[test]
    fn rejects_unknown_codes() {
        for bad in ["", "M", "0M", "1Q", "-1W", "1.5M", "W1"] {
            assert!(bad.parse::<Tenor>().is_err(), "{bad}");
        }
    }

    #[test]
    fn orders_by_length() {
        let mut tenors: Vec<Tenor> = ["3M", "1W", "1Y", "ON", "1M", "2W"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        tenors.sort();
        let labels: Vec<String> = tenors.iter().map(Tenor::label).collect();
        assert_eq!(labels, ["ON", "1W", "2W", "1M", "3M", "1Y"]);
        assert!(Tenor::Weeks(1) != Tenor::Days(7));
    }

    #[test]
    fn short_dates_have_distinct_expiries() {
        let (on, tn, sn) = (Tenor::Overnight, Tenor::TomNext, Tenor::SpotNext);
        assert!(on.years() < tn.years() && tn.years() < sn.years());
        assert_eq!(sn.years(), Tenor::Days(3).years());
        let mut tenors = vec![sn, Tenor::Weeks(1), on, tn];
        tenors.sort();
        assert_eq!(tenors, [on, tn, sn, Tenor::Weeks(1)]);
    }
}
