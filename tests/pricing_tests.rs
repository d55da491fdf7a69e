mod test_utils;

use approx::assert_abs_diff_eq;
use option_heatmap::{price_option, BlackScholes, HeatmapError, PricingInputs, PricingModel};
use test_utils::{atm_inputs, close, inputs};

/// Standard reference values for an at-the-money one-year option.
#[test]
fn test_atm_reference_values() {
    let res = price_option(&atm_inputs()).expect("pricing failed");
    println!(
        "call={:.6} put={:.6} delta={:.6} gamma={:.6}",
        res.call_price, res.put_price, res.call_delta, res.gamma
    );
    assert_abs_diff_eq!(res.call_price, 10.4506, epsilon = 1e-4);
    assert_abs_diff_eq!(res.put_price, 5.5735, epsilon = 1e-4);
    assert_abs_diff_eq!(res.call_delta, 0.6368, epsilon = 1e-4);
    assert_abs_diff_eq!(res.put_delta, -0.3632, epsilon = 1e-4);
    assert_abs_diff_eq!(res.gamma, 0.0188, epsilon = 1e-4);
}

/// call − put = S − K·e^(−rT) across moneyness, maturities and rates.
#[test]
fn test_put_call_parity_grid() {
    for &spot in &[50.0, 90.0, 100.0, 130.0, 400.0] {
        for &ttm in &[0.01, 0.25, 1.0, 5.0] {
            for &rate in &[-0.01, 0.0, 0.05, 0.12] {
                let inp = inputs(spot, 100.0, ttm, 0.3, rate);
                let res = price_option(&inp).unwrap();
                let lhs = res.call_price - res.put_price;
                let rhs = spot - 100.0 * (-rate * ttm).exp();
                assert!(
                    close(lhs, rhs, 1e-9),
                    "parity broken at S={} T={} r={}: {} vs {}",
                    spot,
                    ttm,
                    rate,
                    lhs,
                    rhs
                );
            }
        }
    }
}

/// Deltas stay in their ranges and gamma is non-negative.
#[test]
fn test_greek_ranges() {
    for &spot in &[1.0, 60.0, 100.0, 160.0, 1000.0] {
        for &vol in &[0.01, 0.2, 1.0, 3.0] {
            let res = price_option(&inputs(spot, 100.0, 0.5, vol, 0.03)).unwrap();
            assert!((0.0..=1.0).contains(&res.call_delta));
            assert!((-1.0..=0.0).contains(&res.put_delta));
            assert_eq!(res.put_delta, res.call_delta - 1.0);
            assert!(res.gamma >= 0.0);
            assert!(res.call_price >= 0.0 && res.put_price >= 0.0);
        }
    }
}

/// Call is non-decreasing in spot and non-increasing in strike.
#[test]
fn test_call_monotonicity() {
    let mut prev = 0.0;
    for i in 1..=200 {
        let spot = i as f64;
        let price = price_option(&inputs(spot, 100.0, 1.0, 0.25, 0.02)).unwrap().call_price;
        assert!(price >= prev - 1e-12, "call decreased at spot {}", spot);
        prev = price;
    }

    let mut prev = f64::INFINITY;
    for i in 1..=200 {
        let strike = i as f64;
        let price = price_option(&inputs(100.0, strike, 1.0, 0.25, 0.02)).unwrap().call_price;
        assert!(price <= prev + 1e-12, "call increased at strike {}", strike);
        prev = price;
    }
}

/// Every invariant violation names its field and value.
#[test]
fn test_domain_errors_are_field_specific() {
    let cases: [(&str, f64, Result<PricingInputs, HeatmapError>); 4] = [
        ("spot", -5.0, PricingInputs::new(-5.0, 100.0, 1.0, 0.2, 0.05)),
        ("strike", 0.0, PricingInputs::new(100.0, 0.0, 1.0, 0.2, 0.05)),
        ("time_to_maturity", -1.0, PricingInputs::new(100.0, 100.0, -1.0, 0.2, 0.05)),
        ("volatility", 0.0, PricingInputs::new(100.0, 100.0, 1.0, 0.0, 0.05)),
    ];
    for (field, value, result) in cases {
        match result {
            Err(HeatmapError::Domain { field: f, value: v, .. }) => {
                assert_eq!(f, field);
                assert_eq!(v, value);
            }
            other => panic!("expected domain error for {}, got {:?}", field, other),
        }
    }
}

/// Extreme but valid inputs produce finite numbers, never NaN.
#[test]
fn test_extreme_inputs_stay_finite() {
    for inp in [
        inputs(100.0, 100.0, 1e-8, 0.2, 0.05),
        inputs(100.0, 100.0, 50.0, 4.9, 0.05),
        inputs(1e-6, 1e6, 1.0, 0.2, 0.0),
        inputs(1e6, 1e-6, 1.0, 0.2, 0.0),
    ] {
        let res = price_option(&inp).unwrap();
        assert!(res.call_price.is_finite() && res.put_price.is_finite());
        assert!(res.call_delta.is_finite() && res.gamma.is_finite());
    }
}

/// Model trait and free function agree.
#[test]
fn test_model_trait() {
    let model = BlackScholes;
    assert_eq!(model.name(), "black-scholes");
    assert_eq!(model.price(&atm_inputs()).unwrap(), price_option(&atm_inputs()).unwrap());
}
