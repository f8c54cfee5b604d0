//! Error types for the fxvolsurf library.
//!
//! All fallible operations return `Result<T, VolSurfError>` rather than panicking.
//! The three errors a caller has to tell apart when driving a batch of dates are
//! [`InsufficientData`](VolSurfError::InsufficientData),
//! [`CalibrationFailure`](VolSurfError::CalibrationFailure) and
//! [`OutOfDomain`](VolSurfError::OutOfDomain). Only calibration failures are
//! worth retrying, typically with a looser tolerance.

use thiserror::Error;

/// Convenience type alias for results in this crate.
pub type Result<T> = std::result::Result<T, VolSurfError>;

/// Errors that can occur during FX volatility surface construction and queries.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum VolSurfError {
    /// Required quotes, tenors or deposit rates are missing for the pair/date.
    #[error("insufficient market data: {message}")]
    InsufficientData { message: String },

    /// A strike→delta root-find or the anchor fidelity check did not converge.
    #[error("calibration failed: {message}")]
    CalibrationFailure {
        message: String,
        /// Tenor label of the smile being solved, if known (e.g. "1W").
        tenor: Option<String>,
        /// Last residual seen by the solver or the fidelity check.
        residual: Option<f64>,
    },

    /// Query point lies beyond the extrapolation band.
    #[error("query out of domain: {message}")]
    OutOfDomain { message: String },

    /// Input data is invalid (e.g. NaN quote, non-positive spot, unknown tenor code).
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// Engine configuration failed to parse or validate.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Numerical computation produced a non-finite or otherwise unusable value.
    #[error("numerical error: {message}")]
    NumericalError { message: String },

    /// Reading a tabular market data source failed.
    #[error("data source error: {message}")]
    DataSource { message: String },
}

impl VolSurfError {
    /// Whether retrying with a relaxed calibration configuration can help.
    pub fn is_retryable(&self) -> bool {
        matches!(self, VolSurfError::CalibrationFailure { .. })
    }

    pub(crate) fn calibration(
        message: impl Into<String>,
        tenor: Option<&str>,
        residual: Option<f64>,
    ) -> Self {
        VolSurfError::CalibrationFailure {
            message: message.into(),
            tenor: tenor.map(str::to_owned),
            residual,
        }
    }

    /// Attach a tenor label to a calibration failure raised below the smile level.
    pub(crate) fn with_tenor(self, label: &str) -> Self {
        match self {
            VolSurfError::CalibrationFailure {
                message,
                tenor: None,
                residual,
            } => VolSurfError::CalibrationFailure {
                message,
                tenor: Some(label.to_owned()),
                residual,
            },
            other => other,
        }
    }
}

impl From<csv::Error> for VolSurfError {
    fn from(err: csv::Error) -> Self {
        VolSurfError::DataSource {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for VolSurfError {
    fn from(err: std::io::Error) -> Self {
        VolSurfError::DataSource {
            message: err.to_string(),
        }
    }
}
