//! Rebuild dense matrices from stored samples for redisplay without
//! recomputation. Sample order is irrelevant.

use log::warn;

use crate::error::{HeatmapError, Result};
use crate::surface::types::{PriceGrid, Surface, SurfaceSample};

/// `-0.0` and `0.0` are the same coordinate.
fn normalize(value: f64) -> f64 {
    value + 0.0
}

/// Sorted distinct values. Sorting, de-duplication and lookup all use
/// `total_cmp` so they agree on equality.
fn distinct_sorted(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut axis: Vec<f64> = values.map(normalize).collect();
    axis.sort_by(f64::total_cmp);
    axis.dedup_by(|a, b| a.total_cmp(b).is_eq());
    axis
}

fn index_of(axis: &[f64], value: f64) -> Result<usize> {
    let value = normalize(value);
    axis.binary_search_by(|probe| probe.total_cmp(&value))
        .map_err(|_| HeatmapError::domain("axis", value, "coordinate missing from reconstructed axis"))
}

/// Rebuild a [`Surface`] from an unordered set of samples.
///
/// Axes are the sorted distinct spot and volatility values; cells without a
/// sample stay missing. When two samples share coordinates the later one
/// wins.
///
/// # Errors
///
/// * [`HeatmapError::EmptyData`] if `samples` is empty.
/// * [`HeatmapError::Domain`] if a sample has a non-finite coordinate.
pub fn reconstruct(samples: &[SurfaceSample]) -> Result<Surface> {
    if samples.is_empty() {
        return Err(HeatmapError::EmptyData);
    }
    for s in samples {
        if !s.spot.is_finite() {
            return Err(HeatmapError::domain("spot", s.spot, "stored sample coordinate is not finite"));
        }
        if !s.volatility.is_finite() {
            return Err(HeatmapError::domain(
                "volatility",
                s.volatility,
                "stored sample coordinate is not finite",
            ));
        }
    }

    let spot_axis = distinct_sorted(samples.iter().map(|s| s.spot));
    let vol_axis = distinct_sorted(samples.iter().map(|s| s.volatility));

    let mut call_prices = PriceGrid::missing(vol_axis.len(), spot_axis.len());
    let mut put_prices = PriceGrid::missing(vol_axis.len(), spot_axis.len());
    let mut duplicates = 0usize;

    for s in samples {
        let i = index_of(&vol_axis, s.volatility)?;
        let j = index_of(&spot_axis, s.spot)?;
        if call_prices.get(i, j).is_some() {
            duplicates += 1;
        }
        call_prices.set(i, j, s.call_price);
        put_prices.set(i, j, s.put_price);
    }

    if duplicates > 0 {
        warn!("{} samples share coordinates with an earlier sample; kept the last", duplicates);
    }

    Ok(Surface {
        spot_axis,
        vol_axis,
        call_prices,
        put_prices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(spot: f64, volatility: f64, call: f64) -> SurfaceSample {
        SurfaceSample {
            spot,
            volatility,
            call_price: call,
            put_price: call / 2.0,
        }
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(matches!(reconstruct(&[]), Err(HeatmapError::EmptyData)));
    }

    #[test]
    fn sparse_samples_leave_missing_cells() {
        let samples = [sample(110.0, 0.3, 4.0), sample(90.0, 0.1, 1.0), sample(100.0, 0.2, 2.0)];
        let surface = reconstruct(&samples).unwrap();
        assert_eq!(surface.spot_axis, vec![90.0, 100.0, 110.0]);
        assert_eq!(surface.vol_axis, vec![0.1, 0.2, 0.3]);
        assert_eq!(surface.call_prices.get(0, 0), Some(1.0));
        assert_eq!(surface.call_prices.get(2, 2), Some(4.0));
        assert_eq!(surface.call_prices.get(0, 2), None);
        assert_eq!(surface.put_prices.missing_cells(), 6);
    }

    #[test]
    fn irregular_axes_have_independent_lengths() {
        let samples = [sample(90.0, 0.1, 1.0), sample(95.0, 0.1, 1.5), sample(100.0, 0.1, 2.0)];
        let surface = reconstruct(&samples).unwrap();
        assert_eq!(surface.shape(), (1, 3));
        assert!(surface.is_complete());
    }

    #[test]
    fn later_duplicate_wins() {
        let samples = [sample(90.0, 0.1, 1.0), sample(90.0, 0.1, 7.0)];
        let surface = reconstruct(&samples).unwrap();
        assert_eq!(surface.call_prices.get(0, 0), Some(7.0));
    }

    #[test]
    fn signed_zeros_share_a_cell() {
        let samples = [sample(-0.0, 0.2, 1.0), sample(0.0, 0.2, 2.0), sample(1.0, -0.0, 3.0)];
        let surface = reconstruct(&samples).unwrap();
        assert_eq!(surface.spot_axis.len(), 2);
        assert_eq!(surface.vol_axis.len(), 2);
        assert_eq!(surface.call_prices.get(1, 0), Some(2.0));
        assert_eq!(surface.call_prices.get(0, 1), Some(3.0));
        assert_eq!(surface.call_prices.missing_cells(), 2);
    }

    #[test]
    fn non_finite_coordinate_is_rejected() {
        let err = reconstruct(&[sample(f64::NAN, 0.1, 1.0)]).unwrap_err();
        assert_eq!(err.field(), Some("spot"));
    }
}
