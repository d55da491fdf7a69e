use option_heatmap::{default_configs, AppConfig, PricingInputs};

fn main() -> anyhow::Result<()> {
    let base = PricingInputs::new(100.0, 100.0, 1.0, 0.2, 0.05)?;

    println!("option-heatmap Default Configuration Examples\n");

    for (name, config, use_case) in [
        ("Standard", default_configs::standard(), "Everyday use"),
        ("Coarse", default_configs::coarse(), "Quick looks, terminal output"),
        ("Fine", default_configs::fine(), "Detailed sensitivity views"),
    ] {
        let spot = config.heatmap.policy.spot_range(&base);
        let vol = config.heatmap.policy.vol_range(&base);
        println!("{} Configuration:", name);
        println!("   Resolution: {0}x{0}", config.heatmap.resolution);
        println!("   Spot window for S=100: [{:.2}, {:.2}]", spot.min, spot.max);
        println!("   Vol window for σ=0.20: [{:.3}, {:.3}]", vol.min, vol.max);
        println!("   Store: {:?}", config.storage.backend);
        println!("   Use case: {}\n", use_case);
    }

    println!("Custom configuration from TOML:");
    let custom = AppConfig::from_toml_str(
        r#"
        [heatmap]
        resolution = 15
        [heatmap.policy]
        spot_lower = 0.5
        spot_upper = 1.5

        [storage]
        backend = "csv"
        data_dir = "./heatmaps"
        "#,
    )?;
    let spot = custom.heatmap.policy.spot_range(&base);
    println!("   Resolution: {}", custom.heatmap.resolution);
    println!("   Spot window for S=100: [{:.2}, {:.2}]", spot.min, spot.max);
    println!("   Store: {:?} at {}", custom.storage.backend, custom.storage.data_dir.display());

    Ok(())
}
