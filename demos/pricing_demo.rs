//! Black-Scholes pricing demo
//!
//! Prices a call/put pair, shows the Greeks and checks put-call parity,
//! then walks spot across strike to show how delta and gamma move.

use anyhow::Result;
use option_heatmap::{price_option, BlackScholes, PricingInputs, PricingModel};

fn main() -> Result<()> {
    env_logger::init();

    println!("Black-Scholes Pricing Demo");
    println!("==========================");

    let inputs = PricingInputs::new(100.0, 100.0, 1.0, 0.2, 0.05)?;
    let res = price_option(&inputs)?;

    println!("\nInputs: {:?}", inputs);
    println!("  Call price: ${:.4}", res.call_price);
    println!("  Put price:  ${:.4}", res.put_price);
    println!("  Δ (Call):   {:.4}", res.call_delta);
    println!("  Δ (Put):    {:.4}", res.put_delta);
    println!("  Γ:          {:.4}", res.gamma);

    let parity = inputs.spot() - inputs.strike() * (-inputs.rate() * inputs.time_to_maturity()).exp();
    println!(
        "\nPut-call parity: C - P = {:.6}, S - K·e^(-rT) = {:.6}",
        res.call_price - res.put_price,
        parity
    );

    println!("\nSpot walk ({} model, K=100, T=1, σ=0.2, r=0.05):", BlackScholes.name());
    println!("{:>8} {:>10} {:>10} {:>8} {:>8}", "spot", "call", "put", "Δc", "Γ");
    for spot in (70..=130).step_by(10) {
        let bumped = inputs.with_spot_and_volatility(spot as f64, inputs.volatility())?;
        let r = BlackScholes.price(&bumped)?;
        println!(
            "{:>8} {:>10.4} {:>10.4} {:>8.4} {:>8.4}",
            spot, r.call_price, r.put_price, r.call_delta, r.gamma
        );
    }

    println!("\nInvalid inputs are rejected:");
    if let Err(e) = PricingInputs::new(100.0, 100.0, 1.0, 0.0, 0.05) {
        println!("  {}", e);
    }

    Ok(())
}
