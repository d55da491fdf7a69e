//! Property-based tests using proptest.
//!
//! Pricing identities and surface shape/reconstruction over random inputs.

mod test_utils;

use option_heatmap::surface::{generate, reconstruct};
use option_heatmap::{price_option, PricingInputs, SurfaceRange};
use proptest::prelude::*;
use test_utils::{close, shuffled};

fn valid_inputs() -> impl Strategy<Value = PricingInputs> {
    (
        1.0_f64..500.0,
        1.0_f64..500.0,
        0.01_f64..5.0,
        0.01_f64..2.0,
        -0.02_f64..0.15,
    )
        .prop_map(|(s, k, t, v, r)| PricingInputs::new(s, k, t, v, r).unwrap())
}

// --- Pricing identities ---

proptest! {
    /// call − put = S − K·e^(−rT)
    #[test]
    fn put_call_parity_holds(inp in valid_inputs()) {
        let res = price_option(&inp).unwrap();
        let lhs = res.call_price - res.put_price;
        let rhs = inp.spot() - inp.strike() * (-inp.rate() * inp.time_to_maturity()).exp();
        prop_assert!(close(lhs, rhs, 1e-9), "{} vs {} for {:?}", lhs, rhs, inp);
    }

    /// put delta = call delta − 1, both bounded; gamma is shared and non-negative.
    #[test]
    fn greeks_are_consistent(inp in valid_inputs()) {
        let res = price_option(&inp).unwrap();
        prop_assert_eq!(res.put_delta, res.call_delta - 1.0);
        prop_assert!((0.0..=1.0).contains(&res.call_delta));
        prop_assert!(res.gamma >= 0.0 && res.gamma.is_finite());
        prop_assert_eq!(res.call_gamma(), res.put_gamma());
    }

    /// Raising spot never lowers the call or raises the put.
    #[test]
    fn prices_monotone_in_spot(inp in valid_inputs(), bump in 0.01_f64..50.0) {
        let up = inp.with_spot_and_volatility(inp.spot() + bump, inp.volatility()).unwrap();
        let lo = price_option(&inp).unwrap();
        let hi = price_option(&up).unwrap();
        prop_assert!(hi.call_price >= lo.call_price - 1e-9);
        prop_assert!(hi.put_price <= lo.put_price + 1e-9);
    }
}

// --- Surfaces ---

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Any resolution ≥ 2 gives n×n complete matrices with increasing axes.
    #[test]
    fn grid_shape_matches_resolution(
        inp in valid_inputs(),
        n in 2_usize..16,
        spot_lo in 1.0_f64..100.0,
        spot_width in 1.0_f64..100.0,
        vol_lo in 0.01_f64..1.0,
        vol_width in 0.05_f64..1.0,
    ) {
        let sweep = generate(
            &inp,
            SurfaceRange::new(spot_lo, spot_lo + spot_width),
            SurfaceRange::new(vol_lo, vol_lo + vol_width),
            n,
        ).unwrap();
        prop_assert_eq!(sweep.surface.shape(), (n, n));
        prop_assert_eq!(sweep.samples.len(), n * n);
        prop_assert!(sweep.surface.is_complete());
        prop_assert!(sweep.surface.spot_axis.windows(2).all(|w| w[1] > w[0]));
        prop_assert!(sweep.surface.vol_axis.windows(2).all(|w| w[1] > w[0]));
    }

    /// Reconstruction ignores sample order.
    #[test]
    fn reconstruction_is_order_independent(inp in valid_inputs(), n in 2_usize..10, seed in any::<u64>()) {
        let sweep = generate(
            &inp,
            SurfaceRange::new(inp.spot() * 0.8, inp.spot() * 1.2),
            SurfaceRange::new(0.1, 0.6),
            n,
        ).unwrap();
        let rebuilt = reconstruct(&shuffled(&sweep.samples, seed)).unwrap();
        prop_assert_eq!(rebuilt, sweep.surface);
    }
}
