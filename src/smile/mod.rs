//! Single-tenor FX smiles.
//!
//! A smile maps strike to implied volatility at one expiry. The calibrated
//! [`FxSmile`] is parameterized in forward call delta and implements
//! [`SmileSection`] for strike-space consumers.

pub mod arbitrage;
pub mod fx;

pub use arbitrage::{ArbitrageReport, ButterflyViolation};
pub use fx::{FxSmile, SmileAnchor, StrikeSolution};

use crate::error;
use crate::math::black_call;
use crate::types::{Variance, Vol};
use crate::validate::validate_positive;

/// Relative bump for the Breeden–Litzenberger second difference.
const DENSITY_BUMP: f64 = 1e-4;

/// A single-tenor volatility smile in strike space.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` so surfaces can be shared across
/// the batch workers.
pub trait SmileSection: Send + Sync {
    /// Implied Black volatility σ at the given strike.
    fn vol(&self, strike: f64) -> error::Result<Vol>;

    /// Total Black variance σ²T at the given strike.
    fn variance(&self, strike: f64) -> error::Result<Variance> {
        let v = self.vol(strike)?;
        Ok(Variance(v.0 * v.0 * self.expiry()))
    }

    /// Risk-neutral density q(K) via Breeden–Litzenberger, as a central
    /// second difference of undiscounted Black calls with a bump of
    /// `1e-4 × F`.
    fn density(&self, strike: f64) -> error::Result<f64> {
        validate_positive(strike, "strike")?;
        let (f, t) = (self.forward(), self.expiry());
        let h = DENSITY_BUMP * f;
        if strike <= h {
            return Err(error::VolSurfError::InvalidInput {
                message: format!("strike {strike} too small for density bump {h}"),
            });
        }
        let call = |k: f64| -> error::Result<f64> { Ok(black_call(f, k, self.vol(k)?.0, t)) };
        let (down, mid, up) = (call(strike - h)?, call(strike)?, call(strike + h)?);
        Ok((down - 2.0 * mid + up) / (h * h))
    }

    /// Forward price F at this tenor.
    fn forward(&self) -> f64;

    /// Time to expiry T in years.
    fn expiry(&self) -> f64;

    /// Scan for butterfly arbitrage.
    fn is_arbitrage_free(&self) -> error::Result<ArbitrageReport>;
}
