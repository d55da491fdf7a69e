//! The calculate / heatmap / history workflow on top of an injected store.
//!
//! Validation and pricing always run before anything is written, so a
//! domain error never leaves a stored calculation behind.

use log::{info, warn};

use crate::error::{HeatmapError, Result};
use crate::models::bs::{price, PricingInputs, PricingResult};
use crate::storage::{CalcId, CalculationRecord, CalculationStore};
use crate::surface::generator::{generate, RangePolicy, SurfaceRequest, SurfaceSweep};
use crate::surface::reconstruct::reconstruct;
use crate::surface::types::Surface;

/// Outcome of [`PricingSession::calculate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calculation {
    pub calc_id: CalcId,
    pub inputs: PricingInputs,
    pub result: PricingResult,
}

/// Outcome of [`PricingSession::generate_heatmap`].
#[derive(Debug, Clone, PartialEq)]
pub struct Heatmap {
    pub calc_id: CalcId,
    pub surface: Surface,
    /// Samples written to the store.
    pub stored_samples: usize,
}

pub struct PricingSession<S: CalculationStore> {
    store: S,
    policy: RangePolicy,
    active: Option<(CalcId, PricingInputs)>,
}

impl<S: CalculationStore> PricingSession<S> {
    pub fn new(store: S) -> Self {
        Self::with_policy(store, RangePolicy::default())
    }

    pub fn with_policy(store: S, policy: RangePolicy) -> Self {
        Self {
            store,
            policy,
            active: None,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// The calculation heatmaps are attached to, if any.
    pub fn active_calculation(&self) -> Option<CalcId> {
        self.active.map(|(id, _)| id)
    }

    /// Price `inputs`, persist them as a new calculation and make it active.
    ///
    /// A storage failure is returned as-is and not retried: the outcome of
    /// the create is unknown and retrying could duplicate the row.
    pub fn calculate(&mut self, inputs: PricingInputs) -> Result<Calculation> {
        let result = price(&inputs)?;
        let calc_id = self.store.create_calculation(&inputs)?;
        self.active = Some((calc_id, inputs));
        info!(
            "calculation {}: call {:.6}, put {:.6}, delta {:.6}/{:.6}, gamma {:.6}",
            calc_id, result.call_price, result.put_price, result.call_delta, result.put_delta, result.gamma
        );
        Ok(Calculation {
            calc_id,
            inputs,
            result,
        })
    }

    /// Sweep around the active calculation's inputs and persist every cell
    /// under its id.
    pub fn generate_heatmap(&mut self, request: SurfaceRequest) -> Result<Heatmap> {
        let (calc_id, base) = self.active.ok_or(HeatmapError::NoActiveCalculation)?;
        let (spot_range, vol_range) = request.resolve(&base, &self.policy);
        info!(
            "heatmap for calculation {}: spot [{:.4}, {:.4}], vol [{:.4}, {:.4}], resolution {}",
            calc_id, spot_range.min, spot_range.max, vol_range.min, vol_range.max, request.resolution
        );

        let SurfaceSweep { surface, samples } =
            generate(&base, spot_range, vol_range, request.resolution)?;
        self.store.append_surface_samples(calc_id, &samples)?;
        info!("stored {} heatmap samples for calculation {}", samples.len(), calc_id);

        Ok(Heatmap {
            calc_id,
            surface,
            stored_samples: samples.len(),
        })
    }

    /// Price `inputs` and sweep a heatmap around them in one step.
    ///
    /// `request` is validated before the calculation is created, so an
    /// invalid resolution or range leaves the store untouched.
    pub fn calculate_with_heatmap(
        &mut self,
        inputs: PricingInputs,
        request: SurfaceRequest,
    ) -> Result<(Calculation, Heatmap)> {
        request.validate(&inputs, &self.policy)?;
        let calc = self.calculate(inputs)?;
        let heatmap = self.generate_heatmap(request)?;
        Ok((calc, heatmap))
    }

    pub fn history(&self) -> Result<Vec<CalculationRecord>> {
        self.store.list_calculations()
    }

    /// Rebuild a stored heatmap without recomputing it.
    pub fn load_heatmap(&self, calc_id: CalcId) -> Result<Surface> {
        let samples = self.store.get_surface_samples(calc_id)?;
        if samples.is_empty() {
            warn!("no heatmap samples stored for calculation {}", calc_id);
        }
        let surface = reconstruct(&samples)?;
        info!(
            "loaded calculation {} as a {}x{} surface",
            calc_id,
            surface.vol_axis.len(),
            surface.spot_axis.len()
        );
        Ok(surface)
    }

    /// Delete a calculation and its samples. Clears it as active if needed.
    pub fn delete(&mut self, calc_id: CalcId) -> Result<bool> {
        let deleted = self.store.delete_calculation(calc_id)?;
        if deleted && self.active_calculation() == Some(calc_id) {
            self.active = None;
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStore;

    #[test]
    fn heatmap_requires_a_calculation() {
        let mut session = PricingSession::new(InMemoryStore::new());
        let err = session.generate_heatmap(SurfaceRequest::new(3)).unwrap_err();
        assert!(matches!(err, HeatmapError::NoActiveCalculation));
    }

    #[test]
    fn bad_range_stores_no_samples() {
        let mut session = PricingSession::new(InMemoryStore::new());
        session
            .calculate(PricingInputs::new(100.0, 100.0, 1.0, 0.2, 0.05).unwrap())
            .unwrap();
        let err = session
            .generate_heatmap(SurfaceRequest::new(3).with_spot_range(120.0, 80.0))
            .unwrap_err();
        assert_eq!(err.field(), Some("spot_range"));
        assert_eq!(session.store().sample_count(), 0);
    }

    #[test]
    fn invalid_request_creates_no_calculation() {
        let mut session = PricingSession::new(InMemoryStore::new());
        let inputs = PricingInputs::new(100.0, 100.0, 1.0, 0.2, 0.05).unwrap();
        let err = session
            .calculate_with_heatmap(inputs, SurfaceRequest::new(1))
            .unwrap_err();
        assert_eq!(err.field(), Some("resolution"));
        assert!(session.history().unwrap().is_empty());
        assert_eq!(session.active_calculation(), None);
    }

    #[test]
    fn deleting_active_calculation_clears_it() {
        let mut session = PricingSession::new(InMemoryStore::new());
        let calc = session
            .calculate(PricingInputs::new(100.0, 100.0, 1.0, 0.2, 0.05).unwrap())
            .unwrap();
        assert!(session.delete(calc.calc_id).unwrap());
        assert_eq!(session.active_calculation(), None);
    }
}
