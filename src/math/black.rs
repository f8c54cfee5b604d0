//! Black (1976) formulas on the forward.

use super::normal::norm_cdf;
use crate::conventions::log_moneyness;

/// `d1 = (ln(F/K) + ½σ²T) / (σ√T)` given the log ratio `ln(F/K)`.
pub(crate) fn d1(log_forward_over_strike: f64, vol: f64, expiry: f64) -> f64 {
    let std_dev = vol * expiry.sqrt();
    (log_forward_over_strike + 0.5 * std_dev * std_dev) / std_dev
}

/// Undiscounted Black call price.
pub(crate) fn black_call(forward: f64, strike: f64, vol: f64, expiry: f64) -> f64 {
    let std_dev = vol * expiry.sqrt();
    let d1 = d1(-log_moneyness(strike, forward), vol, expiry);
    forward * norm_cdf(d1) - strike * norm_cdf(d1 - std_dev)
}
