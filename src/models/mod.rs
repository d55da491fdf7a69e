pub mod bs;

/// Common traits used by pricing models
pub mod traits {
    use crate::error::Result;
    use crate::models::bs::{PricingInputs, PricingResult};

    /// A single-point option pricer that the surface sweep can evaluate per cell.
    pub trait PricingModel: Send + Sync {
        /// Short identifier used in log output.
        fn name(&self) -> &str;

        /// Price one set of inputs. Must be deterministic and side-effect free.
        fn price(&self, inputs: &PricingInputs) -> Result<PricingResult>;
    }
}

/// Standard normal helpers shared by the models
pub mod utils {
    use std::f64::consts::{PI, SQRT_2};

    /// Standard normal cumulative distribution function.
    ///
    /// Uses `erfc` so the lower tail keeps full relative precision.
    pub fn normal_cdf(x: f64) -> f64 {
        0.5 * libm::erfc(-x / SQRT_2)
    }

    /// Standard normal probability density function.
    pub fn normal_pdf(x: f64) -> f64 {
        (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
    }

}
