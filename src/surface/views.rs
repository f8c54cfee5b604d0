//! Dense tabular views of a calibrated surface.

use std::io;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::market::Tenor;

/// Row axis of a [`VolGrid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridAxis {
    Strike,
    CallDelta,
}

impl GridAxis {
    fn header(self) -> &'static str {
        match self {
            GridAxis::Strike => "strike",
            GridAxis::CallDelta => "call_delta",
        }
    }
}

/// Vols on a `row × tenor` grid; `values[row][column]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolGrid {
    pub axis: GridAxis,
    pub rows: Vec<f64>,
    pub tenors: Vec<Tenor>,
    pub values: Vec<Vec<f64>>,
}

impl VolGrid {
    pub fn value(&self, row: usize, column: usize) -> Option<f64> {
        self.values.get(row).and_then(|r| r.get(column)).copied()
    }

    /// Column of vols for one tenor.
    pub fn column(&self, tenor: &Tenor) -> Option<Vec<f64>> {
        let j = self.tenors.iter().position(|t| t == tenor)?;
        Some(self.values.iter().map(|r| r[j]).collect())
    }

    /// `(min, max)` over every cell, `None` for an empty grid.
    pub fn range(&self) -> Option<(f64, f64)> {
        self.values.iter().flatten().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }

    /// Write the grid as CSV: an axis column followed by one column per tenor.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        let mut header = vec![self.axis.header().to_owned()];
        header.extend(self.tenors.iter().map(Tenor::label));
        wtr.write_record(&header)?;
        for (axis_value, row) in self.rows.iter().zip(&self.values) {
            let mut record = vec![axis_value.to_string()];
            record.extend(row.iter().map(f64::to_string));
            wtr.write_record(&record)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

/// Strikes of the standard market deltas per tenor; `strikes[row][column]`.
///
/// Rows are `10DP`, `25DP`, `ATM`, `25DC`, `10DC`, with deltas read under the
/// surface's delta and ATM conventions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeltaStrikeTable {
    pub labels: Vec<String>,
    pub tenors: Vec<Tenor>,
    pub strikes: Vec<Vec<f64>>,
}

impl DeltaStrikeTable {
    pub fn strike(&self, label: &str, tenor: &Tenor) -> Option<f64> {
        let i = self.labels.iter().position(|l| l == label)?;
        let j = self.tenors.iter().position(|t| t == tenor)?;
        Some(self.strikes[i][j])
    }
}

/// An anchor the surface was calibrated to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotedPoint {
    pub tenor: Tenor,
    pub label: String,
    pub call_delta: f64,
    pub strike: f64,
    pub vol: f64,
}

/// Which dense grid a batch summarizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceView {
    #[default]
    StrikeSpace,
    DeltaSpace,
}

/// The four views returned by `extract_surface`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceViews {
    pub strike_space: VolGrid,
    pub delta_space: VolGrid,
    pub deltas_vs_strikes: DeltaStrikeTable,
    pub quoted_points: Vec<QuotedPoint>,
}

impl SurfaceViews {
    pub fn grid(&self, view: SurfaceView) -> &VolGrid {
        match view {
            SurfaceView::StrikeSpace => &self.strike_space,
            SurfaceView::DeltaSpace => &self.delta_space,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> VolGrid {
        VolGrid {
            axis: GridAxis::Strike,
            rows: vec![1.3, 1.4],
            tenors: vec![Tenor::Weeks(1), Tenor::Months(1)],
            values: vec![vec![0.30, 0.20], vec![0.25, 0.18]],
        }
    }

    #[test]
    fn range_and_column() {
        let g = grid();
        assert_eq!(g.range(), Some((0.18, 0.30)));
        assert_eq!(g.column(&Tenor::Months(1)), Some(vec![0.20, 0.18]));
        assert_eq!(g.column(&Tenor::Years(1)), None);
        assert_eq!(g.value(1, 0), Some(0.25));
        assert_eq!(g.value(2, 0), None);
    }

    #[test]
    fn csv_layout() {
        let mut out = Vec::new();
        grid().write_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, ["strike,1W,1M", "1.3,0.3,0.2", "1.4,0.25,0.18"]);
    }
}
