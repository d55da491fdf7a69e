//! Spot × volatility sweep of a pricing model.
//!
//! Rows are volatility, columns are spot. Cells are evaluated row by row, spot
//! ascending within a row, and [`SurfaceSweep::samples`] keeps exactly that
//! order for persistence.

use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info};
use serde::Deserialize;

use crate::error::{HeatmapError, Result};
use crate::models::bs::{BlackScholes, PricingInputs, PricingResult};
use crate::models::traits::PricingModel;
use crate::surface::types::{PriceGrid, Surface, SurfaceRange, SurfaceSample};

/// Default risk-sensitivity window used when the caller gives no ranges.
///
/// Spot spans `[spot_lower, spot_upper] × base.spot`; volatility spans
/// `[vol_lower, vol_upper] × base.volatility` clamped to
/// `[vol_floor, vol_cap]`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RangePolicy {
    #[serde(default = "default_spot_lower")]
    pub spot_lower: f64,
    #[serde(default = "default_spot_upper")]
    pub spot_upper: f64,
    #[serde(default = "default_vol_lower")]
    pub vol_lower: f64,
    #[serde(default = "default_vol_upper")]
    pub vol_upper: f64,
    #[serde(default = "default_vol_floor")]
    pub vol_floor: f64,
    #[serde(default = "default_vol_cap")]
    pub vol_cap: f64,
}

impl Default for RangePolicy {
    fn default() -> Self {
        Self {
            spot_lower: default_spot_lower(),
            spot_upper: default_spot_upper(),
            vol_lower: default_vol_lower(),
            vol_upper: default_vol_upper(),
            vol_floor: default_vol_floor(),
            vol_cap: default_vol_cap(),
        }
    }
}

impl RangePolicy {
    pub fn spot_range(&self, base: &PricingInputs) -> SurfaceRange {
        SurfaceRange::new(base.spot() * self.spot_lower, base.spot() * self.spot_upper)
    }

    pub fn vol_range(&self, base: &PricingInputs) -> SurfaceRange {
        SurfaceRange::new(
            (base.volatility() * self.vol_lower).max(self.vol_floor),
            (base.volatility() * self.vol_upper).min(self.vol_cap),
        )
    }
}

fn default_spot_lower() -> f64 {
    0.8
}

fn default_spot_upper() -> f64 {
    1.2
}

fn default_vol_lower() -> f64 {
    0.5
}

fn default_vol_upper() -> f64 {
    1.5
}

fn default_vol_floor() -> f64 {
    0.01
}

fn default_vol_cap() -> f64 {
    5.0
}

/// A sweep request whose missing ranges fall back to a [`RangePolicy`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceRequest {
    pub resolution: usize,
    pub spot_range: Option<SurfaceRange>,
    pub vol_range: Option<SurfaceRange>,
}

impl SurfaceRequest {
    pub fn new(resolution: usize) -> Self {
        Self {
            resolution,
            spot_range: None,
            vol_range: None,
        }
    }

    pub fn with_spot_range(mut self, min: f64, max: f64) -> Self {
        self.spot_range = Some(SurfaceRange::new(min, max));
        self
    }

    pub fn with_vol_range(mut self, min: f64, max: f64) -> Self {
        self.vol_range = Some(SurfaceRange::new(min, max));
        self
    }

    /// Concrete `(spot_range, vol_range)` for `base`.
    pub fn resolve(&self, base: &PricingInputs, policy: &RangePolicy) -> (SurfaceRange, SurfaceRange) {
        (
            self.spot_range.unwrap_or_else(|| policy.spot_range(base)),
            self.vol_range.unwrap_or_else(|| policy.vol_range(base)),
        )
    }

    /// Run every precondition [`generate`] checks for this request around
    /// `base`, without pricing anything.
    pub fn validate(&self, base: &PricingInputs, policy: &RangePolicy) -> Result<()> {
        let (spot_range, vol_range) = self.resolve(base, policy);
        build_axes(base, spot_range, vol_range, self.resolution).map(|_| ())
    }
}

/// Output of a sweep: the dense surface plus the per-cell samples in
/// evaluation order.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceSweep {
    pub surface: Surface,
    pub samples: Vec<SurfaceSample>,
}

/// Validated axes for a sweep. All precondition checks happen here, before
/// any cell is priced.
fn build_axes(
    base: &PricingInputs,
    spot_range: SurfaceRange,
    vol_range: SurfaceRange,
    resolution: usize,
) -> Result<(Vec<f64>, Vec<f64>)> {
    if resolution < 2 {
        return Err(HeatmapError::domain(
            "resolution",
            resolution as f64,
            "must be at least 2",
        ));
    }
    base.validate()?;
    let spot_axis = spot_range.linspace("spot_range", resolution)?;
    let vol_axis = vol_range.linspace("vol_range", resolution)?;
    Ok((spot_axis, vol_axis))
}

fn price_row<M: PricingModel + ?Sized>(
    model: &M,
    base: &PricingInputs,
    spot_axis: &[f64],
    vol: f64,
) -> Result<Vec<PricingResult>> {
    spot_axis
        .iter()
        .map(|&spot| model.price(&base.with_spot_and_volatility(spot, vol)?))
        .collect()
}

fn assemble(spot_axis: Vec<f64>, vol_axis: Vec<f64>, rows: Vec<Vec<PricingResult>>) -> SurfaceSweep {
    let n_rows = vol_axis.len();
    let n_cols = spot_axis.len();
    let mut call_prices = PriceGrid::missing(n_rows, n_cols);
    let mut put_prices = PriceGrid::missing(n_rows, n_cols);
    let mut samples = Vec::with_capacity(n_rows * n_cols);

    for (i, (vol, row)) in vol_axis.iter().zip(&rows).enumerate() {
        for (j, (spot, res)) in spot_axis.iter().zip(row).enumerate() {
            call_prices.set(i, j, res.call_price);
            put_prices.set(i, j, res.put_price);
            samples.push(SurfaceSample {
                spot: *spot,
                volatility: *vol,
                call_price: res.call_price,
                put_price: res.put_price,
            });
        }
    }

    SurfaceSweep {
        surface: Surface {
            spot_axis,
            vol_axis,
            call_prices,
            put_prices,
        },
        samples,
    }
}

/// Sweep the Black-Scholes model over a `resolution × resolution` grid.
///
/// `base` supplies strike, maturity and rate; spot and volatility come from
/// the grid. Fails atomically: on any error no partial surface is returned.
pub fn generate(
    base: &PricingInputs,
    spot_range: SurfaceRange,
    vol_range: SurfaceRange,
    resolution: usize,
) -> Result<SurfaceSweep> {
    generate_with(&BlackScholes, base, spot_range, vol_range, resolution, None)
}

/// Like [`generate`], checking `cancel` before each volatility row.
pub fn generate_cancellable(
    base: &PricingInputs,
    spot_range: SurfaceRange,
    vol_range: SurfaceRange,
    resolution: usize,
    cancel: &AtomicBool,
) -> Result<SurfaceSweep> {
    generate_with(&BlackScholes, base, spot_range, vol_range, resolution, Some(cancel))
}

/// Sweep an arbitrary [`PricingModel`].
pub fn generate_with<M: PricingModel + ?Sized>(
    model: &M,
    base: &PricingInputs,
    spot_range: SurfaceRange,
    vol_range: SurfaceRange,
    resolution: usize,
    cancel: Option<&AtomicBool>,
) -> Result<SurfaceSweep> {
    let (spot_axis, vol_axis) = build_axes(base, spot_range, vol_range, resolution)?;
    debug!(
        "{} sweep: spot [{:.4}, {:.4}], vol [{:.4}, {:.4}], resolution {}",
        model.name(),
        spot_range.min,
        spot_range.max,
        vol_range.min,
        vol_range.max,
        resolution
    );

    let mut rows = Vec::with_capacity(vol_axis.len());
    for &vol in &vol_axis {
        if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
            debug!("sweep cancelled after {} of {} rows", rows.len(), vol_axis.len());
            return Err(HeatmapError::Cancelled);
        }
        rows.push(price_row(model, base, &spot_axis, vol)?);
    }

    let sweep = assemble(spot_axis, vol_axis, rows);
    info!("generated {} surface cells", sweep.samples.len());
    Ok(sweep)
}

/// Evaluate volatility rows in parallel with rayon.
///
/// Rows are collected back in axis order, so the result (including sample
/// order) is identical to [`generate`].
#[cfg(feature = "parallel")]
pub fn generate_parallel(
    base: &PricingInputs,
    spot_range: SurfaceRange,
    vol_range: SurfaceRange,
    resolution: usize,
) -> Result<SurfaceSweep> {
    use rayon::prelude::*;

    let (spot_axis, vol_axis) = build_axes(base, spot_range, vol_range, resolution)?;
    let rows = vol_axis
        .par_iter()
        .map(|&vol| price_row(&BlackScholes, base, &spot_axis, vol))
        .collect::<Result<Vec<_>>>()?;

    let sweep = assemble(spot_axis, vol_axis, rows);
    info!(
        "generated {} surface cells on {} threads",
        sweep.samples.len(),
        rayon::current_num_threads()
    );
    Ok(sweep)
}
