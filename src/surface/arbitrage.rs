//! Surface-level arbitrage diagnostics.
//!
//! Extends the per-smile butterfly checks with a calendar check: at fixed
//! forward call delta, total variance must not decrease with tenor.

use serde::{Deserialize, Serialize};

use crate::market::Tenor;
use crate::smile::ArbitrageReport;

/// Diagnostics for one surface. Reports only; the surface is unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceDiagnostics {
    /// Butterfly reports, one per quoted tenor.
    pub smile_reports: Vec<ArbitrageReport>,
    pub calendar_violations: Vec<CalendarViolation>,
    pub is_free: bool,
}

impl SurfaceDiagnostics {
    pub(crate) fn new(
        smile_reports: Vec<ArbitrageReport>,
        calendar_violations: Vec<CalendarViolation>,
    ) -> Self {
        let is_free = calendar_violations.is_empty() && smile_reports.iter().all(|r| r.is_free);
        Self {
            smile_reports,
            calendar_violations,
            is_free,
        }
    }
}

/// Total variance falling between two adjacent tenors at one call delta.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalendarViolation {
    pub call_delta: f64,
    pub tenor_short: Tenor,
    pub tenor_long: Tenor,
    pub variance_short: f64,
    pub variance_long: f64,
}
