//! # option-heatmap: Black-Scholes Pricing and Price Surfaces
//!
//! `option-heatmap` prices European options with the closed-form
//! Black-Scholes-Merton model, sweeps that model over a spot × volatility
//! grid to build call/put price heatmaps, and keeps a history of every
//! calculation and its heatmap in a pluggable store.
//!
//! ## Core Features
//!
//! - **Pricing**: call/put prices, call/put delta and gamma from one call
//! - **Surfaces**: `n × n` spot/volatility sweeps with a documented default window
//! - **Persistence**: a narrow [`CalculationStore`] contract with in-memory and CSV stores
//! - **Reconstruction**: dense matrices rebuilt from stored samples in any order
//! - **Rendering**: side-by-side SVG heatmaps
//!
//! ## Quick Start
//!
//! ```rust
//! use option_heatmap::{price_option, generate_heatmap, PricingInputs, SurfaceRequest};
//!
//! let inputs = PricingInputs::new(100.0, 100.0, 1.0, 0.2, 0.05)?;
//! let result = price_option(&inputs)?;
//! assert!((result.call_price - 10.4506).abs() < 1e-4);
//!
//! let sweep = generate_heatmap(&inputs, SurfaceRequest::new(10))?;
//! assert_eq!(sweep.surface.shape(), (10, 10));
//! # Ok::<(), option_heatmap::HeatmapError>(())
//! ```
//!
//! ## Axis Convention
//!
//! Matrices are indexed `[vol_index][spot_index]`: rows are volatility,
//! columns are spot, both ascending.

// ================================================================================================
// MODULES
// ================================================================================================

pub mod config;
pub mod error;
pub mod models;
pub mod render;
pub mod session;
pub mod storage;
pub mod surface;

// ================================================================================================
// PUBLIC RE-EXPORTS
// ================================================================================================

pub use config::{AppConfig, HeatmapConfig, StorageBackend, StorageConfig};
pub use error::{HeatmapError, Result};
pub use models::bs::{BlackScholes, PricingInputs, PricingResult};
pub use models::traits::PricingModel;
pub use render::{render_surface_svg, write_surface_svg, RenderOptions};
pub use session::{Calculation, Heatmap, PricingSession};
pub use storage::{
    open_store, CalcId, CalculationRecord, CalculationStore, CsvStore, InMemoryStore,
};
pub use surface::{
    PriceGrid, RangePolicy, Surface, SurfaceRange, SurfaceRequest, SurfaceSample, SurfaceSweep,
};

// ================================================================================================
// DEFAULT CONFIGURATIONS
// ================================================================================================

/// Pre-configured application settings.
///
/// - [`standard()`]: 10×10 grid, in-memory store
/// - [`coarse()`]: 5×5 grid for quick looks
/// - [`fine()`]: 25×25 grid for detailed sensitivity views
pub mod default_configs {
    use crate::config::AppConfig;

    /// 10×10 grid with the default risk-sensitivity window.
    ///
    /// ```rust
    /// let config = option_heatmap::default_configs::standard();
    /// assert_eq!(config.heatmap.resolution, 10);
    /// ```
    pub fn standard() -> AppConfig {
        AppConfig::standard()
    }

    /// 5×5 grid.
    pub fn coarse() -> AppConfig {
        AppConfig::coarse()
    }

    /// 25×25 grid. Cell annotations get small at this size.
    pub fn fine() -> AppConfig {
        AppConfig::fine()
    }
}

// ================================================================================================
// TOP-LEVEL API
// ================================================================================================

/// Price one European call/put pair with Black-Scholes.
///
/// Re-validates every input invariant; see [`models::bs::price`].
pub fn price_option(inputs: &PricingInputs) -> Result<PricingResult> {
    models::bs::price(inputs)
}

/// Sweep Black-Scholes around `base`.
///
/// Ranges missing from `request` fall back to [`RangePolicy::default`]:
/// spot in `[0.8, 1.2] × base.spot`, volatility in
/// `[max(0.01, 0.5 × base.vol), min(5.0, 1.5 × base.vol)]`.
///
/// # Errors
///
/// [`HeatmapError::Domain`] when `resolution < 2`, a range is non-positive
/// or inverted, or `base` is invalid. Nothing is computed in that case.
pub fn generate_heatmap(base: &PricingInputs, request: SurfaceRequest) -> Result<SurfaceSweep> {
    let (spot_range, vol_range) = request.resolve(base, &RangePolicy::default());
    surface::generate(base, spot_range, vol_range, request.resolution)
}

/// Rebuild a surface from stored samples; order does not matter.
pub fn reconstruct_heatmap(samples: &[SurfaceSample]) -> Result<Surface> {
    surface::reconstruct(samples)
}
