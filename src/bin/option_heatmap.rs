//! option-heatmap CLI
//!
//! Command-line front-end: price an option, generate and store its heatmap,
//! browse the calculation history and reload stored heatmaps.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;

use option_heatmap::{
    open_store, write_surface_svg, AppConfig, CalcId, PricingInputs, PricingSession,
    RenderOptions, StorageBackend, Surface, SurfaceRequest,
};

#[derive(Parser, Debug)]
#[command(name = "option-heatmap", about = "Black-Scholes pricing and spot/volatility heatmaps")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Store calculations as CSV in this directory (overrides the config)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Clone, Copy)]
struct InputArgs {
    /// Current price of the underlying
    #[arg(long)]
    spot: f64,
    /// Strike price
    #[arg(long)]
    strike: f64,
    /// Time to maturity in years
    #[arg(long)]
    ttm: f64,
    /// Annualised volatility as a decimal
    #[arg(long)]
    vol: f64,
    /// Risk-free rate as a decimal
    #[arg(long)]
    rate: f64,
}

impl InputArgs {
    fn to_inputs(self) -> Result<PricingInputs> {
        Ok(PricingInputs::new(self.spot, self.strike, self.ttm, self.vol, self.rate)?)
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Price a call/put pair and record the calculation
    Price {
        #[command(flatten)]
        inputs: InputArgs,
    },
    /// Price, then sweep spot × volatility and record every cell
    Heatmap {
        #[command(flatten)]
        inputs: InputArgs,
        /// Grid points per axis (defaults to the configured resolution)
        #[arg(long)]
        resolution: Option<usize>,
        #[arg(long)]
        spot_min: Option<f64>,
        #[arg(long)]
        spot_max: Option<f64>,
        #[arg(long)]
        vol_min: Option<f64>,
        #[arg(long)]
        vol_max: Option<f64>,
        /// Write the heatmap to this SVG file
        #[arg(long)]
        svg: Option<PathBuf>,
    },
    /// List stored calculations, oldest first
    History,
    /// Rebuild a stored heatmap
    Load {
        calc_id: i64,
        #[arg(long)]
        svg: Option<PathBuf>,
    },
    /// Delete a calculation and its heatmap
    Delete { calc_id: i64 },
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.storage.backend = StorageBackend::Csv;
        config.storage.data_dir = dir.clone();
    }
    Ok(config)
}

/// A bound is used only when both ends are given; otherwise the default
/// window applies to that axis.
fn range(min: Option<f64>, max: Option<f64>, name: &str) -> Result<Option<(f64, f64)>> {
    match (min, max) {
        (Some(lo), Some(hi)) => Ok(Some((lo, hi))),
        (None, None) => Ok(None),
        _ => anyhow::bail!("--{0}-min and --{0}-max must be given together", name),
    }
}

fn print_surface(surface: &Surface) {
    println!("Call prices (rows: volatility, columns: spot)");
    print!("{:>10}", "vol\\spot");
    for spot in &surface.spot_axis {
        print!("{:>10.2}", spot);
    }
    println!();
    for (vol, row) in surface.vol_axis.iter().zip(surface.call_prices.rows()) {
        print!("{:>10.4}", vol);
        for cell in row {
            match cell {
                Some(v) => print!("{:>10.4}", v),
                None => print!("{:>10}", "-"),
            }
        }
        println!();
    }
}

fn save_svg(path: &PathBuf, surface: &Surface, calc_id: CalcId) -> Result<()> {
    let options = RenderOptions {
        label: Some(format!("calc_id={}", calc_id)),
        ..RenderOptions::default()
    };
    write_surface_svg(path, surface, &options)?;
    println!("Heatmap written to {}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let store = open_store(&config.storage).context("cannot open calculation store")?;
    info!("using {:?} store", config.storage.backend);
    let mut session = PricingSession::with_policy(store, config.heatmap.policy);

    match cli.command {
        Command::Price { inputs } => {
            let calc = session.calculate(inputs.to_inputs()?)?;
            println!("calc_id:    {}", calc.calc_id);
            println!("Call price: ${:.6}", calc.result.call_price);
            println!("Put price:  ${:.6}", calc.result.put_price);
            println!("Δ (Call):   {:.6}", calc.result.call_delta);
            println!("Δ (Put):    {:.6}", calc.result.put_delta);
            println!("Γ:          {:.6}", calc.result.gamma);
        }
        Command::Heatmap {
            inputs,
            resolution,
            spot_min,
            spot_max,
            vol_min,
            vol_max,
            svg,
        } => {
            let mut request = SurfaceRequest::new(resolution.unwrap_or(config.heatmap.resolution));
            if let Some((lo, hi)) = range(spot_min, spot_max, "spot")? {
                request = request.with_spot_range(lo, hi);
            }
            if let Some((lo, hi)) = range(vol_min, vol_max, "vol")? {
                request = request.with_vol_range(lo, hi);
            }
            let (calc, heatmap) = session.calculate_with_heatmap(inputs.to_inputs()?, request)?;
            println!(
                "calc_id {}: stored {} heatmap cells",
                heatmap.calc_id, heatmap.stored_samples
            );
            print_surface(&heatmap.surface);
            if let Some(path) = svg {
                save_svg(&path, &heatmap.surface, calc.calc_id)?;
            }
        }
        Command::History => {
            println!(
                "{:>8}  {:<10}  {:>12}  {:>12}  {:>8}  {:>8}  {:>8}",
                "calc_id", "created", "spot", "strike", "ttm", "vol", "rate"
            );
            for record in session.history()? {
                let i = &record.inputs;
                println!(
                    "{:>8}  {:<10}  {:>12.4}  {:>12.4}  {:>8.4}  {:>8.4}  {:>8.4}",
                    record.calc_id.0,
                    record.timestamp.format("%Y-%m-%d"),
                    i.spot(),
                    i.strike(),
                    i.time_to_maturity(),
                    i.volatility(),
                    i.rate()
                );
            }
        }
        Command::Load { calc_id, svg } => {
            let calc_id = CalcId(calc_id);
            let surface = session
                .load_heatmap(calc_id)
                .with_context(|| format!("cannot load heatmap for calc_id={}", calc_id))?;
            print_surface(&surface);
            if let Some(path) = svg {
                save_svg(&path, &surface, calc_id)?;
            }
        }
        Command::Delete { calc_id } => {
            let calc_id = CalcId(calc_id);
            if session.delete(calc_id)? {
                println!("Deleted calc_id={}", calc_id);
            } else {
                println!("No calculation with calc_id={}", calc_id);
            }
        }
    }
    Ok(())
}
