// Closed-form Black-Scholes-Merton pricing of European options (no dividend
// yield, no early exercise). Prices and Greeks come out of a single call so a
// result is always fully populated.

use crate::error::{HeatmapError, Result};
use crate::models::traits::PricingModel;
use crate::models::utils::{normal_cdf, normal_pdf};
use serde::Serialize;

/// Market and contract parameters for one pricing call.
///
/// Construction validates `spot`, `strike`, `time_to_maturity` and
/// `volatility` as strictly positive and `rate` as finite. Values are never
/// clamped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PricingInputs {
    spot: f64,
    strike: f64,
    time_to_maturity: f64,
    volatility: f64,
    rate: f64,
}

impl PricingInputs {
    pub fn new(
        spot: f64,
        strike: f64,
        time_to_maturity: f64,
        volatility: f64,
        rate: f64,
    ) -> Result<Self> {
        let inputs = Self {
            spot,
            strike,
            time_to_maturity,
            volatility,
            rate,
        };
        inputs.validate()?;
        Ok(inputs)
    }

    /// Re-check every invariant.
    pub fn validate(&self) -> Result<()> {
        ensure_positive("spot", self.spot)?;
        ensure_positive("strike", self.strike)?;
        ensure_positive("time_to_maturity", self.time_to_maturity)?;
        ensure_positive("volatility", self.volatility)?;
        if !self.rate.is_finite() {
            return Err(HeatmapError::domain("rate", self.rate, "must be finite"));
        }
        Ok(())
    }

    /// Same contract, evaluated at another spot and volatility.
    pub fn with_spot_and_volatility(&self, spot: f64, volatility: f64) -> Result<Self> {
        Self::new(
            spot,
            self.strike,
            self.time_to_maturity,
            volatility,
            self.rate,
        )
    }

    pub fn spot(&self) -> f64 {
        self.spot
    }

    pub fn strike(&self) -> f64 {
        self.strike
    }

    pub fn time_to_maturity(&self) -> f64 {
        self.time_to_maturity
    }

    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }
}

fn ensure_positive(field: &'static str, value: f64) -> Result<()> {
    // Written as a negated comparison so NaN is rejected too.
    if !(value > 0.0) || value.is_infinite() {
        return Err(HeatmapError::domain(field, value, "must be a finite value > 0"));
    }
    Ok(())
}

/// Prices and Greeks for one set of inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PricingResult {
    pub call_price: f64,
    pub put_price: f64,
    /// In [0, 1].
    pub call_delta: f64,
    /// Always `call_delta - 1`.
    pub put_delta: f64,
    /// Shared by call and put.
    pub gamma: f64,
}

impl PricingResult {
    pub fn call_gamma(&self) -> f64 {
        self.gamma
    }

    pub fn put_gamma(&self) -> f64 {
        self.gamma
    }
}

/// The Black-Scholes-Merton closed form.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlackScholes;

impl PricingModel for BlackScholes {
    fn name(&self) -> &str {
        "black-scholes"
    }

    fn price(&self, inputs: &PricingInputs) -> Result<PricingResult> {
        price(inputs)
    }
}

/// Price a European call and put and compute delta and gamma.
///
/// ```text
/// d1 = (ln(S/K) + (r + σ²/2)·T) / (σ·√T)
/// d2 = d1 − σ·√T
/// C  = S·N(d1) − K·e^(−rT)·N(d2)
/// P  = K·e^(−rT)·N(−d2) − S·N(−d1)
/// Γ  = n(d1) / (S·σ·√T)
/// ```
///
/// # Errors
///
/// [`HeatmapError::Domain`] if an input invariant is violated or an
/// intermediate value overflows to a non-finite number.
#[allow(non_snake_case)]
pub fn price(inputs: &PricingInputs) -> Result<PricingResult> {
    inputs.validate()?;

    let S = inputs.spot;
    let K = inputs.strike;
    let T = inputs.time_to_maturity;
    let sigma = inputs.volatility;
    let r = inputs.rate;

    let sig_sqrt_t = sigma * T.sqrt();
    if !(sig_sqrt_t > 0.0) {
        return Err(HeatmapError::domain(
            "volatility",
            sigma,
            "volatility * sqrt(time_to_maturity) underflows to zero",
        ));
    }

    let d1 = ((S / K).ln() + (r + 0.5 * sigma * sigma) * T) / sig_sqrt_t;
    if !d1.is_finite() {
        return Err(HeatmapError::domain("d1", d1, "non-finite intermediate"));
    }
    let d2 = d1 - sig_sqrt_t;
    let discounted_strike = K * (-r * T).exp();

    let call_price = S * normal_cdf(d1) - discounted_strike * normal_cdf(d2);
    let put_price = discounted_strike * normal_cdf(-d2) - S * normal_cdf(-d1);
    let call_delta = normal_cdf(d1);
    let put_delta = call_delta - 1.0;
    let gamma = normal_pdf(d1) / (S * sig_sqrt_t);

    for (field, value) in [("call_price", call_price), ("put_price", put_price), ("gamma", gamma)] {
        if !value.is_finite() {
            return Err(HeatmapError::domain(field, value, "non-finite result"));
        }
    }

    // Deep OTM, cancellation can round a price a few ulps below zero. Prices
    // are floored at zero, so parity there holds to rounding, not exactly.
    Ok(PricingResult {
        call_price: call_price.max(0.0),
        put_price: put_price.max(0.0),
        call_delta,
        put_delta,
        gamma,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn atm() -> PricingInputs {
        PricingInputs::new(100.0, 100.0, 1.0, 0.2, 0.05).unwrap()
    }

    #[test]
    fn atm_one_year_reference_values() {
        let res = price(&atm()).unwrap();
        assert_abs_diff_eq!(res.call_price, 10.4506, epsilon = 1e-4);
        assert_abs_diff_eq!(res.put_price, 5.5735, epsilon = 1e-4);
        assert_abs_diff_eq!(res.call_delta, 0.6368, epsilon = 1e-4);
        assert_abs_diff_eq!(res.gamma, 0.0188, epsilon = 1e-4);
    }

    #[test]
    fn put_delta_is_call_delta_minus_one() {
        let res = price(&atm()).unwrap();
        assert_eq!(res.put_delta, res.call_delta - 1.0);
        assert_eq!(res.call_gamma(), res.put_gamma());
    }

    #[test]
    fn rejects_non_positive_fields() {
        for (field, inputs) in [
            ("spot", PricingInputs::new(0.0, 100.0, 1.0, 0.2, 0.05)),
            ("strike", PricingInputs::new(100.0, -1.0, 1.0, 0.2, 0.05)),
            ("time_to_maturity", PricingInputs::new(100.0, 100.0, 0.0, 0.2, 0.05)),
            ("volatility", PricingInputs::new(100.0, 100.0, 1.0, f64::NAN, 0.05)),
        ] {
            let err = inputs.unwrap_err();
            assert_eq!(err.field(), Some(field));
        }
    }

    #[test]
    fn rejects_non_finite_rate() {
        let err = PricingInputs::new(100.0, 100.0, 1.0, 0.2, f64::INFINITY).unwrap_err();
        assert_eq!(err.field(), Some("rate"));
    }

    #[test]
    fn negative_rate_is_allowed() {
        let inputs = PricingInputs::new(100.0, 100.0, 1.0, 0.2, -0.01).unwrap();
        assert!(price(&inputs).is_ok());
    }

    #[test]
    fn deep_otm_prices_are_non_negative_and_keep_parity() {
        for (spot, strike) in [(1.0, 400.0), (400.0, 1.0), (50.0, 150.0)] {
            let inputs = PricingInputs::new(spot, strike, 0.1, 0.05, 0.02).unwrap();
            let res = price(&inputs).unwrap();
            assert!(res.call_price >= 0.0 && res.put_price >= 0.0);
            let forward_gap = spot - strike * (-0.02_f64 * 0.1).exp();
            assert_abs_diff_eq!(res.call_price - res.put_price, forward_gap, epsilon = 1e-12);
        }
    }

    #[test]
    fn model_trait_delegates_to_closed_form() {
        let via_trait = BlackScholes.price(&atm()).unwrap();
        assert_eq!(via_trait, price(&atm()).unwrap());
    }
}
