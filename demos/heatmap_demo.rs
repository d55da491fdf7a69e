//! Heatmap demo
//!
//! Runs a full session against a CSV store in a temporary directory:
//! price, sweep, list history, reload the stored heatmap and write it as SVG.
//!
//! Run with `RUST_LOG=info` to see the session log.

use anyhow::Result;
use option_heatmap::{
    default_configs, write_surface_svg, CsvStore, PricingInputs, PricingSession, RenderOptions,
    SurfaceRequest,
};

fn main() -> Result<()> {
    env_logger::init();

    let config = default_configs::coarse();
    let data_dir = std::env::temp_dir().join("option-heatmap-demo");
    let store = CsvStore::open(&data_dir)?;
    let mut session = PricingSession::with_policy(store, config.heatmap.policy);

    let calc = session.calculate(PricingInputs::new(100.0, 105.0, 0.5, 0.25, 0.03)?)?;
    println!(
        "calc_id {}: call ${:.4}, put ${:.4}",
        calc.calc_id, calc.result.call_price, calc.result.put_price
    );

    let heatmap = session.generate_heatmap(SurfaceRequest::new(config.heatmap.resolution))?;
    println!("Stored {} samples", heatmap.stored_samples);

    println!("\nCall prices (rows: volatility, columns: spot)");
    print!("{:>8}", "");
    for spot in &heatmap.surface.spot_axis {
        print!("{:>9.2}", spot);
    }
    println!();
    for (vol, row) in heatmap.surface.vol_axis.iter().zip(heatmap.surface.call_prices.rows()) {
        print!("{:>8.3}", vol);
        for cell in row.iter().flatten() {
            print!("{:>9.3}", cell);
        }
        println!();
    }

    println!("\nHistory in {}:", data_dir.display());
    for record in session.history()? {
        println!(
            "  {}  {}  S={} K={}",
            record.calc_id,
            record.timestamp.to_rfc3339(),
            record.inputs.spot(),
            record.inputs.strike()
        );
    }

    let reloaded = session.load_heatmap(calc.calc_id)?;
    assert_eq!(reloaded, heatmap.surface);

    let svg_path = data_dir.join(format!("heatmap_{}.svg", calc.calc_id));
    let options = RenderOptions {
        label: Some(format!("calc_id={}", calc.calc_id)),
        ..RenderOptions::default()
    };
    write_surface_svg(&svg_path, &reloaded, &options)?;
    println!("\nSVG written to {}", svg_path.display());

    Ok(())
}
