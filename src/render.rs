//! SVG rendering of call/put heatmaps.
//!
//! Two panels side by side, spot on x and volatility on y, coloured from red
//! (low) to green (high) on each panel's own price range. Missing cells are
//! grey.

use std::path::Path;

use anyhow::{Context, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::surface::types::{PriceGrid, Surface};

const LOW: RGBColor = RGBColor(0xff, 0x4d, 0x4d);
const HIGH: RGBColor = RGBColor(0x00, 0xb0, 0x50);
const MISSING: RGBColor = RGBColor(0xc8, 0xc8, 0xc8);

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub width: u32,
    pub height: u32,
    /// Print the price in each cell.
    pub annotate: bool,
    /// Appended to each panel title, e.g. `calc_id=3`.
    pub label: Option<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 560,
            annotate: true,
            label: None,
        }
    }
}

/// Linear red→green blend for `value` within `[lo, hi]`.
fn color_for(value: f64, lo: f64, hi: f64) -> RGBColor {
    let t = if hi > lo {
        ((value - lo) / (hi - lo)).clamp(0.0, 1.0)
    } else {
        0.5
    };
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    RGBColor(mix(LOW.0, HIGH.0), mix(LOW.1, HIGH.1), mix(LOW.2, HIGH.2))
}

/// Cell boundaries around each axis point: midpoints inside, half a step
/// beyond the ends.
fn cell_edges(axis: &[f64]) -> Vec<f64> {
    match axis {
        [] => vec![0.0, 1.0],
        [only] => {
            let half = (only.abs() * 0.01).max(0.005);
            vec![only - half, only + half]
        }
        _ => {
            let n = axis.len();
            let mut edges = Vec::with_capacity(n + 1);
            edges.push(axis[0] - (axis[1] - axis[0]) / 2.0);
            edges.extend(axis.windows(2).map(|w| (w[0] + w[1]) / 2.0));
            edges.push(axis[n - 1] + (axis[n - 1] - axis[n - 2]) / 2.0);
            edges
        }
    }
}

fn draw_panel(
    area: &DrawingArea<SVGBackend<'_>, Shift>,
    surface: &Surface,
    grid: &PriceGrid,
    title: &str,
    options: &RenderOptions,
) -> Result<()> {
    let x_edges = cell_edges(&surface.spot_axis);
    let y_edges = cell_edges(&surface.vol_axis);
    let caption = match &options.label {
        Some(label) => format!("{} ({})", title, label),
        None => title.to_string(),
    };

    let mut chart = ChartBuilder::on(area)
        .margin(15)
        .caption(caption, ("sans-serif", 22))
        .x_label_area_size(40)
        .y_label_area_size(55)
        .build_cartesian_2d(
            x_edges[0]..x_edges[x_edges.len() - 1],
            y_edges[0]..y_edges[y_edges.len() - 1],
        )?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("Spot Price")
        .y_desc("Volatility")
        .draw()?;

    let (rows, cols) = grid.shape();
    let (lo, hi) = grid.value_range().unwrap_or((0.0, 1.0));
    let cells = || (0..rows).flat_map(move |i| (0..cols).map(move |j| (i, j)));

    chart.draw_series(cells().map(|(i, j)| {
        let color = grid.get(i, j).map_or(MISSING, |v| color_for(v, lo, hi));
        Rectangle::new(
            [(x_edges[j], y_edges[i]), (x_edges[j + 1], y_edges[i + 1])],
            color.filled(),
        )
    }))?;

    if options.annotate {
        let mid = (lo + hi) / 2.0;
        let font_px = if rows.max(cols) > 15 { 8 } else { 11 };
        chart.draw_series(cells().filter_map(|(i, j)| {
            grid.get(i, j).map(|v| {
                let text_color = if v > mid { &WHITE } else { &BLACK };
                let style = ("sans-serif", font_px)
                    .into_font()
                    .color(text_color)
                    .pos(Pos::new(HPos::Center, VPos::Center));
                let x = (x_edges[j] + x_edges[j + 1]) / 2.0;
                let y = (y_edges[i] + y_edges[i + 1]) / 2.0;
                Text::new(format!("{:.2}", v), (x, y), style)
            })
        }))?;
    }
    Ok(())
}

/// Render the call and put heatmaps of `surface` into an SVG document.
pub fn render_surface_svg(surface: &Surface, options: &RenderOptions) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (options.width, options.height))
            .into_drawing_area();
        root.fill(&WHITE)?;
        let panels = root.split_evenly((1, 2));
        draw_panel(&panels[0], surface, &surface.call_prices, "Call Price", options)?;
        draw_panel(&panels[1], surface, &surface.put_prices, "Put Price", options)?;
        root.present()?;
    }
    Ok(svg)
}

/// Render and write the SVG to `path`.
pub fn write_surface_svg(path: impl AsRef<Path>, surface: &Surface, options: &RenderOptions) -> Result<()> {
    let path = path.as_ref();
    let svg = render_surface_svg(surface, options)?;
    std::fs::write(path, svg).with_context(|| format!("cannot write {}", path.display()))?;
    Ok(())
}
