//! Core domain types for FX volatility surfaces.
//!
//! These newtypes wrap `f64` to keep a volatility from being passed where a
//! variance or a strike is expected.
//!
//! **Outputs use newtypes** — [`Vol`], [`Variance`], [`Strike`], [`Delta`]
//! wrap return values. **Inputs use bare `f64`**: `vol_at_strike(1.40, ..)`
//! reads better than `vol_at_strike(Strike(1.40), ..)` and the parameter name
//! already says what it is.
//!
//! # Why no `Eq` or `Ord`?
//! These types wrap `f64`, which does not implement `Eq` or `Ord` because `NaN`
//! breaks total ordering. We derive `PartialEq` and `PartialOrd` only.

use serde::{Deserialize, Serialize};

/// Strike `K` of an FX option, in quote currency per unit of base currency.
///
/// # Examples
/// ```
/// use fxvolsurf::types::Strike;
/// let strike = Strike(1.4000);
/// assert_eq!(strike.0, 1.4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Strike(pub f64);

/// Implied volatility `σ`, measured as annualized standard deviation.
///
/// A vol of 0.10 represents 10% (quoted as "10.0" by FX brokers).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Vol(pub f64);

/// Total implied variance `σ²T`.
///
/// Cross-tenor interpolation is performed on total variance because it must
/// be non-decreasing in time for a calendar-arbitrage-free surface.
///
/// # Examples
/// ```
/// use fxvolsurf::types::{Variance, Vol};
/// let vol = Vol(0.20);
/// let var = Variance(vol.0 * vol.0 * 0.25);
/// assert!((var.0 - 0.01).abs() < 1e-15);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Variance(pub f64);

/// Undiscounted forward call delta `N(d1)`, in `(0, 1)`.
///
/// This is the single coordinate every smile in the crate is parameterized
/// by. A 25-delta call sits near 0.25, a 25-delta put near 0.75 and the
/// delta-neutral straddle exactly at 0.5.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Delta(pub f64);

/// Option type: call or put on the base currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionType {
    /// Right to buy the base currency at the strike.
    Call,
    /// Right to sell the base currency at the strike.
    Put,
}

impl OptionType {
    /// Option type implied by the sign of a quoted delta (`+` call, `-` put).
    pub fn from_signed_delta(delta: f64) -> Self {
        if delta < 0.0 {
            OptionType::Put
        } else {
            OptionType::Call
        }
    }
}
