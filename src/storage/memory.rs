use std::collections::BTreeMap;

use chrono::Utc;
use log::debug;

use crate::error::{HeatmapError, Result};
use crate::models::bs::PricingInputs;
use crate::storage::{sort_history, CalcId, CalculationRecord, CalculationStore};
use crate::surface::types::SurfaceSample;

/// Process-local store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    next_id: i64,
    calculations: BTreeMap<CalcId, CalculationRecord>,
    /// `(sequence, calc_id, sample)` in insertion order.
    samples: Vec<(u64, CalcId, SurfaceSample)>,
    next_sample_seq: u64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Self::default()
        }
    }

    /// Total stored samples across all calculations.
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}

impl CalculationStore for InMemoryStore {
    fn create_calculation(&mut self, inputs: &PricingInputs) -> Result<CalcId> {
        let calc_id = CalcId(self.next_id.max(1));
        self.next_id = calc_id.0 + 1;
        self.calculations.insert(
            calc_id,
            CalculationRecord {
                calc_id,
                timestamp: Utc::now(),
                inputs: *inputs,
            },
        );
        debug!("created calculation {}", calc_id);
        Ok(calc_id)
    }

    fn append_surface_samples(&mut self, calc_id: CalcId, samples: &[SurfaceSample]) -> Result<()> {
        if !self.calculations.contains_key(&calc_id) {
            return Err(HeatmapError::storage(format!(
                "foreign key violation: surface_sample.calculation_id {} references no calculation",
                calc_id
            )));
        }
        self.samples.reserve(samples.len());
        for sample in samples {
            self.samples.push((self.next_sample_seq, calc_id, *sample));
            self.next_sample_seq += 1;
        }
        debug!("stored {} samples for calculation {}", samples.len(), calc_id);
        Ok(())
    }

    fn list_calculations(&self) -> Result<Vec<CalculationRecord>> {
        let mut records: Vec<CalculationRecord> = self.calculations.values().cloned().collect();
        sort_history(&mut records);
        Ok(records)
    }

    fn get_surface_samples(&self, calc_id: CalcId) -> Result<Vec<SurfaceSample>> {
        Ok(self
            .samples
            .iter()
            .filter(|(_, id, _)| *id == calc_id)
            .map(|(_, _, s)| *s)
            .collect())
    }

    fn get_calculation(&self, calc_id: CalcId) -> Result<Option<CalculationRecord>> {
        Ok(self.calculations.get(&calc_id).cloned())
    }

    fn delete_calculation(&mut self, calc_id: CalcId) -> Result<bool> {
        if self.calculations.remove(&calc_id).is_none() {
            return Ok(false);
        }
        self.samples.retain(|(_, id, _)| *id != calc_id);
        debug!("deleted calculation {} and its samples", calc_id);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs() -> PricingInputs {
        PricingInputs::new(100.0, 95.0, 0.5, 0.25, 0.03).unwrap()
    }

    fn samples(n: usize) -> Vec<SurfaceSample> {
        (0..n)
            .map(|i| SurfaceSample {
                spot: 90.0 + i as f64,
                volatility: 0.2,
                call_price: 1.0,
                put_price: 2.0,
            })
            .collect()
    }

    #[test]
    fn ids_are_fresh_and_increasing() {
        let mut store = InMemoryStore::new();
        let a = store.create_calculation(&inputs()).unwrap();
        let b = store.create_calculation(&inputs()).unwrap();
        assert!(b > a);
    }

    #[test]
    fn append_to_unknown_calculation_stores_nothing() {
        let mut store = InMemoryStore::new();
        let err = store.append_surface_samples(CalcId(42), &samples(3)).unwrap_err();
        assert!(err.is_storage());
        assert_eq!(store.sample_count(), 0);
    }

    #[test]
    fn delete_cascades() {
        let mut store = InMemoryStore::new();
        let keep = store.create_calculation(&inputs()).unwrap();
        let drop = store.create_calculation(&inputs()).unwrap();
        store.append_surface_samples(keep, &samples(2)).unwrap();
        store.append_surface_samples(drop, &samples(3)).unwrap();

        assert!(store.delete_calculation(drop).unwrap());
        assert!(!store.delete_calculation(drop).unwrap());
        assert_eq!(store.sample_count(), 2);
        assert!(store.get_calculation(drop).unwrap().is_none());
        assert_eq!(store.get_surface_samples(keep).unwrap().len(), 2);
    }
}
