//! Engine configuration.
//!
//! Every section has defaults, so an empty TOML document is a valid
//! configuration. Values are checked by [`EngineConfig::validate`], which the
//! engine runs on construction.
//!
//! ```
//! use fxvolsurf::EngineConfig;
//!
//! let config = EngineConfig::from_toml_str(
//!     r#"
//!     [calibration]
//!     tolerance = 1e-4
//!
//!     [batch]
//!     max_concurrency = 4
//!     failure_policy = "fail_fast"
//!     "#,
//! )
//! .unwrap();
//! assert_eq!(config.calibration.tolerance, 1e-4);
//! assert_eq!(config.calibration.max_iterations, 50);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::conventions::{AtmConvention, Compounding, DeltaConvention};
use crate::error::{Result, VolSurfError};

/// Top-level configuration for [`VolSurfaceEngine`](crate::VolSurfaceEngine).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub calibration: CalibrationConfig,
    pub conventions: ConventionConfig,
    pub grid: GridConfig,
    pub extrapolation: ExtrapolationConfig,
    pub batch: BatchConfig,
}

/// Fidelity tolerance and iteration budget of the strike→delta solves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Largest accepted gap between a quoted vol and the surface vol at the
    /// anchor's strike. Delta solves stop at `tolerance / 100`.
    pub tolerance: f64,
    /// Newton steps allowed per strike→delta solve.
    pub max_iterations: usize,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-8,
            max_iterations: 50,
        }
    }
}

impl CalibrationConfig {
    /// Residual target for a delta solve.
    pub fn solver_tolerance(&self) -> f64 {
        self.tolerance * 0.01
    }
}

/// Quoting conventions of the input data.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConventionConfig {
    pub delta: DeltaConvention,
    pub atm: AtmConvention,
    pub rate_compounding: Compounding,
}

/// Shape of the dense views produced by `extract_surface`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub strike_points: usize,
    /// Lowest call delta on the delta axis.
    pub delta_min: f64,
    /// Highest call delta on the delta axis.
    pub delta_max: f64,
    pub delta_points: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            strike_points: 41,
            delta_min: 0.10,
            delta_max: 0.90,
            delta_points: 17,
        }
    }
}

/// Band beyond which point queries are refused.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtrapolationConfig {
    /// Strikes whose forward call delta falls outside `[min, 1 - min]` are
    /// out of domain.
    pub min_call_delta: f64,
    /// Expiries longer than `ratio × last quoted tenor` are out of domain.
    pub max_expiry_ratio: f64,
}

impl Default for ExtrapolationConfig {
    fn default() -> Self {
        Self {
            min_call_delta: 0.001,
            max_expiry_ratio: 2.0,
        }
    }
}

/// What a batch does when one date fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Record the failure against its date and keep going.
    #[default]
    Isolate,
    /// Return the earliest failing date's error.
    FailFast,
}

/// Batch (`build_series`) settings.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Worker threads for per-date calibration. `None` uses the global pool.
    pub max_concurrency: Option<usize>,
    pub failure_policy: FailurePolicy,
}

impl EngineConfig {
    /// Parse and validate a TOML document.
    ///
    /// # Errors
    /// [`VolSurfError::InvalidConfig`] on parse or validation failure.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| VolSurfError::InvalidConfig {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| VolSurfError::InvalidConfig {
            message: format!("{}: {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| VolSurfError::InvalidConfig {
            message: e.to_string(),
        })
    }

    /// # Errors
    /// [`VolSurfError::InvalidConfig`] listing every offending field.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        let tol = self.calibration.tolerance;
        if !tol.is_finite() || tol <= 0.0 {
            errors.push(format!("calibration.tolerance must be positive, got {tol}"));
        }

        let grid = &self.grid;
        if grid.strike_points < 2 {
            errors.push(format!(
                "grid.strike_points must be at least 2, got {}",
                grid.strike_points
            ));
        }
        if grid.delta_points < 2 {
            errors.push(format!(
                "grid.delta_points must be at least 2, got {}",
                grid.delta_points
            ));
        }
        if !(grid.delta_min > 0.0 && grid.delta_min < grid.delta_max && grid.delta_max < 1.0) {
            errors.push(format!(
                "grid deltas must satisfy 0 < delta_min < delta_max < 1, got {} and {}",
                grid.delta_min, grid.delta_max
            ));
        }

        let band = &self.extrapolation;
        if !(band.min_call_delta > 0.0 && band.min_call_delta < 0.5) {
            errors.push(format!(
                "extrapolation.min_call_delta must lie in (0, 0.5), got {}",
                band.min_call_delta
            ));
        }
        if !band.max_expiry_ratio.is_finite() || band.max_expiry_ratio < 1.0 {
            errors.push(format!(
                "extrapolation.max_expiry_ratio must be at least 1, got {}",
                band.max_expiry_ratio
            ));
        }

        if self.batch.max_concurrency == Some(0) {
            errors.push("batch.max_concurrency must be greater than 0".to_owned());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(VolSurfError::InvalidConfig {
                message: errors.join("; "),
            })
        }
    }
}
