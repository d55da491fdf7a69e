#![allow(dead_code)] // Each test binary uses a different subset of helpers

use option_heatmap::{PricingInputs, SurfaceSample};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// The at-the-money one-year textbook case.
pub fn atm_inputs() -> PricingInputs {
    PricingInputs::new(100.0, 100.0, 1.0, 0.2, 0.05).expect("valid ATM inputs")
}

/// Shorthand for building validated inputs in tests.
pub fn inputs(spot: f64, strike: f64, ttm: f64, vol: f64, rate: f64) -> PricingInputs {
    PricingInputs::new(spot, strike, ttm, vol, rate).expect("valid test inputs")
}

/// Deterministically shuffled copy of `samples`.
pub fn shuffled(samples: &[SurfaceSample], seed: u64) -> Vec<SurfaceSample> {
    let mut out = samples.to_vec();
    out.shuffle(&mut StdRng::seed_from_u64(seed));
    out
}

/// Relative closeness with an absolute floor for values near zero.
pub fn close(a: f64, b: f64, rel: f64) -> bool {
    (a - b).abs() <= rel * a.abs().max(b.abs()).max(1.0)
}
