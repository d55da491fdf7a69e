use crate::error::{HeatmapError, Result};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// One evaluated grid cell, in the shape it is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSample {
    pub spot: f64,
    pub volatility: f64,
    pub call_price: f64,
    pub put_price: f64,
}

/// Closed interval `[min, max]` swept along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceRange {
    pub min: f64,
    pub max: f64,
}

impl SurfaceRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Both bounds strictly positive and `max > min`.
    pub fn validate(&self, field: &'static str) -> Result<()> {
        if !(self.min > 0.0) || !self.min.is_finite() {
            return Err(HeatmapError::domain(field, self.min, "range minimum must be > 0"));
        }
        if !(self.max > 0.0) || !self.max.is_finite() {
            return Err(HeatmapError::domain(field, self.max, "range maximum must be > 0"));
        }
        if self.max <= self.min {
            return Err(HeatmapError::domain(
                field,
                self.max,
                "range maximum must be greater than range minimum",
            ));
        }
        Ok(())
    }

    /// `n` uniformly spaced points from `min` to `max` inclusive.
    ///
    /// The last point is pinned to `max`. Fails when the range is too narrow
    /// for the points to be strictly increasing.
    pub fn linspace(&self, field: &'static str, n: usize) -> Result<Vec<f64>> {
        if n < 2 {
            return Err(HeatmapError::domain("resolution", n as f64, "must be at least 2"));
        }
        self.validate(field)?;

        let step = (self.max - self.min) / (n - 1) as f64;
        let mut axis: Vec<f64> = (0..n).map(|i| self.min + i as f64 * step).collect();
        axis[n - 1] = self.max;

        if axis.windows(2).any(|w| w[1] <= w[0]) {
            return Err(HeatmapError::domain(
                field,
                self.max - self.min,
                "range too narrow for the requested resolution",
            ));
        }
        Ok(axis)
    }
}

/// Dense row-major matrix of prices indexed `[vol_index][spot_index]`.
///
/// `None` marks a cell with no value (only possible after reconstructing
/// sparse samples).
#[derive(Debug, Clone, PartialEq)]
pub struct PriceGrid {
    rows: usize,
    cols: usize,
    cells: Vec<Option<f64>>,
}

impl PriceGrid {
    /// A `rows x cols` grid with every cell missing.
    pub fn missing(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![None; rows * cols],
        }
    }

    /// Build a fully populated grid from row vectors of equal length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, Vec::len);
        if let Some(bad) = rows.iter().find(|r| r.len() != n_cols) {
            return Err(HeatmapError::domain(
                "grid",
                bad.len() as f64,
                "rows must all have the same length",
            ));
        }
        Ok(Self {
            rows: n_rows,
            cols: n_cols,
            cells: rows.into_iter().flatten().map(Some).collect(),
        })
    }

    /// `(rows, cols)`, i.e. `(vol axis length, spot axis length)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.cells[row * self.cols + col]
    }

    pub(crate) fn set(&mut self, row: usize, col: usize, value: f64) {
        self.cells[row * self.cols + col] = Some(value);
    }

    /// One volatility row, spot ascending.
    pub fn row(&self, row: usize) -> &[Option<f64>] {
        &self.cells[row * self.cols..(row + 1) * self.cols]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Option<f64>]> {
        self.cells.chunks(self.cols.max(1)).take(self.rows)
    }

    pub fn missing_cells(&self) -> usize {
        self.cells.iter().filter(|c| c.is_none()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_cells() == 0
    }

    /// Finite min and max over present cells, `None` if there are none.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let values: Vec<f64> = self
            .cells
            .iter()
            .flatten()
            .copied()
            .filter(|v| v.is_finite())
            .collect();
        if values.is_empty() {
            return None;
        }
        Some((Statistics::min(values.iter()), Statistics::max(values.iter())))
    }
}

/// Call and put price matrices together with the axes that index them.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    /// Strictly increasing spot values (columns).
    pub spot_axis: Vec<f64>,
    /// Strictly increasing volatility values (rows).
    pub vol_axis: Vec<f64>,
    pub call_prices: PriceGrid,
    pub put_prices: PriceGrid,
}

impl Surface {
    /// `(rows, cols)` of both matrices.
    pub fn shape(&self) -> (usize, usize) {
        (self.vol_axis.len(), self.spot_axis.len())
    }

    pub fn is_complete(&self) -> bool {
        self.call_prices.is_complete() && self.put_prices.is_complete()
    }
}
