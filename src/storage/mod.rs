//! Persistence contract for calculations and their surface samples.
//!
//! A calculation owns its samples: samples can only be appended to an
//! existing calculation and are deleted with it. Implementations must make
//! [`CalculationStore::append_surface_samples`] all-or-nothing and must not
//! retry writes internally.

pub mod csv_store;
pub mod memory;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{StorageBackend, StorageConfig};
use crate::error::Result;
use crate::models::bs::PricingInputs;
use crate::surface::types::SurfaceSample;

pub use csv_store::CsvStore;
pub use memory::InMemoryStore;

/// Store-assigned identifier of a calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CalcId(pub i64);

impl fmt::Display for CalcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A persisted calculation as listed in the history.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculationRecord {
    pub calc_id: CalcId,
    pub timestamp: DateTime<Utc>,
    pub inputs: PricingInputs,
}

pub trait CalculationStore {
    /// Persist `inputs` with a store-assigned timestamp and return a fresh id.
    fn create_calculation(&mut self, inputs: &PricingInputs) -> Result<CalcId>;

    /// Store every sample for `calc_id`, or none of them.
    ///
    /// Fails with a storage error if `calc_id` does not exist.
    fn append_surface_samples(&mut self, calc_id: CalcId, samples: &[SurfaceSample]) -> Result<()>;

    /// All calculations ordered by timestamp ascending (ties by id).
    fn list_calculations(&self) -> Result<Vec<CalculationRecord>>;

    /// All samples for one calculation. Callers must not rely on the order.
    fn get_surface_samples(&self, calc_id: CalcId) -> Result<Vec<SurfaceSample>>;

    fn get_calculation(&self, calc_id: CalcId) -> Result<Option<CalculationRecord>>;

    /// Delete a calculation and, by cascade, its samples. Returns whether it
    /// existed.
    fn delete_calculation(&mut self, calc_id: CalcId) -> Result<bool>;
}

impl<S: CalculationStore + ?Sized> CalculationStore for Box<S> {
    fn create_calculation(&mut self, inputs: &PricingInputs) -> Result<CalcId> {
        (**self).create_calculation(inputs)
    }

    fn append_surface_samples(&mut self, calc_id: CalcId, samples: &[SurfaceSample]) -> Result<()> {
        (**self).append_surface_samples(calc_id, samples)
    }

    fn list_calculations(&self) -> Result<Vec<CalculationRecord>> {
        (**self).list_calculations()
    }

    fn get_surface_samples(&self, calc_id: CalcId) -> Result<Vec<SurfaceSample>> {
        (**self).get_surface_samples(calc_id)
    }

    fn get_calculation(&self, calc_id: CalcId) -> Result<Option<CalculationRecord>> {
        (**self).get_calculation(calc_id)
    }

    fn delete_calculation(&mut self, calc_id: CalcId) -> Result<bool> {
        (**self).delete_calculation(calc_id)
    }
}

/// Open the store selected by `config`.
pub fn open_store(config: &StorageConfig) -> Result<Box<dyn CalculationStore>> {
    match config.backend {
        StorageBackend::Memory => Ok(Box::new(InMemoryStore::new())),
        StorageBackend::Csv => Ok(Box::new(CsvStore::open(&config.data_dir)?)),
    }
}

/// Order records for history browsing.
pub(crate) fn sort_history(records: &mut [CalculationRecord]) {
    records.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.calc_id.cmp(&b.calc_id)));
}
