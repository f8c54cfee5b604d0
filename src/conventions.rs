//! FX market conventions.
//!
//! Delta and ATM quoting conventions, deposit-rate compounding, and the
//! forward/discount arithmetic that maps quoted deltas onto the forward call
//! delta coordinate `x = N(d1)` used by every smile in the crate.

use serde::{Deserialize, Serialize};

use crate::error::{Result, VolSurfError};
use crate::types::OptionType;

/// How quoted deltas are expressed.
///
/// Premium-adjusted deltas are not supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaConvention {
    /// Spot delta: `e^{-r_f T} N(d1)` for calls. Standard for G10 pairs up to 1Y.
    #[default]
    Spot,
    /// Forward delta: `N(d1)` for calls.
    Forward,
}

/// Which strike the ATM quote refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AtmConvention {
    /// Delta-neutral straddle: `K = F e^{σ²T/2}`, forward call delta 0.5.
    #[default]
    DeltaNeutral,
    /// ATM forward: `K = F`.
    Forward,
}

/// Compounding of quoted deposit rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Compounding {
    /// `DF = e^{-rT}`.
    #[default]
    Continuous,
    /// Money-market style: `DF = 1 / (1 + rT)`.
    Simple,
}

/// Discount factor for a rate over `t` years.
pub fn discount_factor(rate: f64, t: f64, compounding: Compounding) -> f64 {
    match compounding {
        Compounding::Continuous => (-rate * t).exp(),
        Compounding::Simple => 1.0 / (1.0 + rate * t),
    }
}

/// Outright forward from spot and the two discount factors: `F = S · DF_f / DF_d`.
pub fn forward_price(spot: f64, df_domestic: f64, df_foreign: f64) -> f64 {
    spot * df_foreign / df_domestic
}

/// `ln(K / F)`. Negative for strikes below the forward.
pub fn log_moneyness(strike: f64, forward: f64) -> f64 {
    (strike / forward).ln()
}

/// Map a quoted signed delta (calls positive, puts negative) onto the forward
/// call delta coordinate `N(d1)`.
///
/// `df_foreign` is `e^{-r_f T}` and is only used for spot deltas.
///
/// # Errors
/// Returns [`VolSurfError::InvalidInput`] if the delta is zero, non-finite, or
/// maps outside `(0, 1)` under the convention.
pub fn to_call_delta(
    signed_delta: f64,
    convention: DeltaConvention,
    df_foreign: f64,
) -> Result<f64> {
    if !signed_delta.is_finite() || signed_delta == 0.0 || signed_delta.abs() >= 1.0 {
        return Err(VolSurfError::InvalidInput {
            message: format!(
                "quoted delta must be finite, non-zero and inside (-1, 1), got {signed_delta}"
            ),
        });
    }
    let scale = match convention {
        DeltaConvention::Spot => 1.0 / df_foreign,
        DeltaConvention::Forward => 1.0,
    };
    let x = match OptionType::from_signed_delta(signed_delta) {
        OptionType::Call => signed_delta * scale,
        OptionType::Put => 1.0 + signed_delta * scale,
    };
    if !(x > 0.0 && x < 1.0) {
        return Err(VolSurfError::InvalidInput {
            message: format!(
                "delta {signed_delta} maps to forward call delta {x}, \
                 outside (0, 1) under {convention:?} convention"
            ),
        });
    }
    Ok(x)
}

/// Inverse of [`to_call_delta`]: quoted signed delta of a `option_type` option
/// whose forward call delta is `x`.
pub fn from_call_delta(
    x: f64,
    option_type: OptionType,
    convention: DeltaConvention,
    df_foreign: f64,
) -> f64 {
    let scale = match convention {
        DeltaConvention::Spot => df_foreign,
        DeltaConvention::Forward => 1.0,
    };
    match option_type {
        OptionType::Call => x * scale,
        OptionType::Put => (x - 1.0) * scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn forward_delta_maps_directly() {
        assert_abs_diff_eq!(
            to_call_delta(0.25, DeltaConvention::Forward, 0.99).unwrap(),
            0.25,
            epsilon = 1e-15
        );
        assert_abs_diff_eq!(
            to_call_delta(-0.25, DeltaConvention::Forward, 0.99).unwrap(),
            0.75,
            epsilon = 1e-15
        );
    }

    #[test]
    fn spot_delta_undoes_foreign_discounting() {
        let df_f = (-0.02_f64 * 0.5).exp();
        let x = to_call_delta(0.25, DeltaConvention::Spot, df_f).unwrap();
        assert_abs_diff_eq!(x, 0.25 / df_f, epsilon = 1e-15);
        let back = from_call_delta(x, OptionType::Call, DeltaConvention::Spot, df_f);
        assert_abs_diff_eq!(back, 0.25, epsilon = 1e-15);

        let xp = to_call_delta(-0.10, DeltaConvention::Spot, df_f).unwrap();
        let back = from_call_delta(xp, OptionType::Put, DeltaConvention::Spot, df_f);
        assert_abs_diff_eq!(back, -0.10, epsilon = 1e-15);
    }

    #[test]
    fn rejects_zero_and_out_of_range_delta() {
        assert!(to_call_delta(0.0, DeltaConvention::Forward, 1.0).is_err());
        assert!(
            to_call_delta(f64::NAN, DeltaConvention::Forward, 1.0).is_err()
        );
        assert!(to_call_delta(1.2, DeltaConvention::Forward, 1.0).is_err());
        // A 0.999 spot call delta with a large foreign rate overshoots N(d1) = 1.
        assert!(to_call_delta(0.999, DeltaConvention::Spot, 0.9).is_err());
    }

    #[test]
    fn simple_and_continuous_discounting() {
        assert_abs_diff_eq!(
            discount_factor(0.05, 0.5, Compounding::Simple),
            1.0 / 1.025,
            epsilon = 1e-15
        );
        assert_abs_diff_eq!(
            discount_factor(0.05, 0.5, Compounding::Continuous),
            (-0.025_f64).exp(),
            epsilon = 1e-15
        );
    }

    #[test]
    fn forward_from_discount_factors() {
        // GBP (foreign) rates above USD (domestic) rates → GBPUSD forward below spot.
        let f = forward_price(1.30, (-0.01_f64).exp(), (-0.02_f64).exp());
        assert!(f < 1.30);
        assert_abs_diff_eq!(log_moneyness(f, 1.30), -0.01, epsilon = 1e-12);
    }
}
