//! Durable store backed by two CSV files in one directory.
//!
//! `calculation.csv`: `id,timestamp,spot,strike,time_to_maturity,volatility,rate`
//!
//! `surface_sample.csv`: `id,calculation_id,spot,volatility,call_price,put_price`
//!
//! `sequence.csv`: `name,next_id`, the next id per table. Ids are never
//! reused, even after the rows holding them are deleted.
//!
//! Every write builds the complete new file next to the old one and renames
//! it into place, so readers see either the old or the new contents.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use csv::{ReaderBuilder, WriterBuilder};
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{HeatmapError, Result};
use crate::models::bs::PricingInputs;
use crate::storage::{sort_history, CalcId, CalculationRecord, CalculationStore};
use crate::surface::types::SurfaceSample;

const CALCULATION_FILE: &str = "calculation.csv";
const SAMPLE_FILE: &str = "surface_sample.csv";
const SEQUENCE_FILE: &str = "sequence.csv";

const CALCULATION_HEADERS: [&str; 7] = [
    "id",
    "timestamp",
    "spot",
    "strike",
    "time_to_maturity",
    "volatility",
    "rate",
];
const SAMPLE_HEADERS: [&str; 6] = [
    "id",
    "calculation_id",
    "spot",
    "volatility",
    "call_price",
    "put_price",
];
const SEQUENCE_HEADERS: [&str; 2] = ["name", "next_id"];

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CalculationRow {
    id: i64,
    timestamp: DateTime<Utc>,
    spot: f64,
    strike: f64,
    time_to_maturity: f64,
    volatility: f64,
    rate: f64,
}

impl CalculationRow {
    fn into_record(self) -> Result<CalculationRecord> {
        let inputs = PricingInputs::new(
            self.spot,
            self.strike,
            self.time_to_maturity,
            self.volatility,
            self.rate,
        )
        .map_err(|e| HeatmapError::storage(format!("corrupt calculation row {}: {}", self.id, e)))?;
        Ok(CalculationRecord {
            calc_id: CalcId(self.id),
            timestamp: self.timestamp,
            inputs,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SampleRow {
    id: i64,
    calculation_id: i64,
    spot: f64,
    volatility: f64,
    call_price: f64,
    put_price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SequenceRow {
    name: String,
    next_id: i64,
}

impl From<&SampleRow> for SurfaceSample {
    fn from(row: &SampleRow) -> Self {
        SurfaceSample {
            spot: row.spot,
            volatility: row.volatility,
            call_price: row.call_price,
            put_price: row.put_price,
        }
    }
}

/// CSV-file calculation store rooted at a directory.
#[derive(Debug, Clone)]
pub struct CsvStore {
    dir: PathBuf,
}

impl CsvStore {
    /// Open (creating if needed) a store in `dir`.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| {
            HeatmapError::storage_with_source(format!("cannot create {}", dir.display()), e)
        })?;
        let store = Self { dir };
        if !store.calculation_path().exists() {
            write_rows_atomic::<CalculationRow>(&store.calculation_path(), &CALCULATION_HEADERS, &[])?;
        }
        if !store.sample_path().exists() {
            write_rows_atomic::<SampleRow>(&store.sample_path(), &SAMPLE_HEADERS, &[])?;
        }
        if !store.sequence_path().exists() {
            // Seed from existing rows so directories written without a
            // sequence file keep counting upwards.
            let seed = [
                SequenceRow {
                    name: CALCULATION_FILE.to_string(),
                    next_id: max_id(store.calculation_rows()?.iter().map(|r| r.id)) + 1,
                },
                SequenceRow {
                    name: SAMPLE_FILE.to_string(),
                    next_id: max_id(store.sample_rows()?.iter().map(|r| r.id)) + 1,
                },
            ];
            write_rows_atomic(&store.sequence_path(), &SEQUENCE_HEADERS, &seed)?;
        }
        info!("opened CSV calculation store at {}", store.dir.display());
        Ok(store)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn calculation_path(&self) -> PathBuf {
        self.dir.join(CALCULATION_FILE)
    }

    fn sample_path(&self) -> PathBuf {
        self.dir.join(SAMPLE_FILE)
    }

    fn sequence_path(&self) -> PathBuf {
        self.dir.join(SEQUENCE_FILE)
    }

    /// Reserve `count` consecutive ids for `table` and return the first.
    ///
    /// The sequence is advanced before the rows are written, so a failed
    /// write burns its ids instead of handing them out twice.
    fn reserve_ids(&self, table: &str, floor: i64, count: usize) -> Result<i64> {
        let mut sequence: Vec<SequenceRow> = read_rows(&self.sequence_path())?;
        let first = match sequence.iter_mut().find(|row| row.name == table) {
            Some(row) => {
                let first = row.next_id.max(floor);
                row.next_id = first + count as i64;
                first
            }
            None => {
                sequence.push(SequenceRow {
                    name: table.to_string(),
                    next_id: floor + count as i64,
                });
                floor
            }
        };
        write_rows_atomic(&self.sequence_path(), &SEQUENCE_HEADERS, &sequence)?;
        Ok(first)
    }

    fn calculation_rows(&self) -> Result<Vec<CalculationRow>> {
        read_rows(&self.calculation_path())
    }

    fn sample_rows(&self) -> Result<Vec<SampleRow>> {
        read_rows(&self.sample_path())
    }
}

fn max_id(ids: impl Iterator<Item = i64>) -> i64 {
    ids.max().unwrap_or(0)
}

fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

fn write_rows_atomic<T: Serialize>(path: &Path, headers: &[&str], rows: &[T]) -> Result<()> {
    let tmp = path.with_extension("csv.tmp");
    let result = write_and_rename(&tmp, path, headers, rows);
    if result.is_err() && tmp.exists() {
        if let Err(e) = fs::remove_file(&tmp) {
            warn!("cannot remove {}: {}", tmp.display(), e);
        }
    }
    result
}

fn write_and_rename<T: Serialize>(tmp: &Path, path: &Path, headers: &[&str], rows: &[T]) -> Result<()> {
    let file = File::create(tmp)?;
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
    writer.write_record(headers)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    let file = writer.into_inner().map_err(|e| {
        HeatmapError::storage(format!("flushing {}: {}", tmp.display(), e.error()))
    })?;
    file.sync_all()?;
    fs::rename(tmp, path)?;
    Ok(())
}

impl CalculationStore for CsvStore {
    fn create_calculation(&mut self, inputs: &PricingInputs) -> Result<CalcId> {
        let mut rows = self.calculation_rows()?;
        let id = self.reserve_ids(CALCULATION_FILE, max_id(rows.iter().map(|r| r.id)) + 1, 1)?;
        rows.push(CalculationRow {
            id,
            timestamp: Utc::now(),
            spot: inputs.spot(),
            strike: inputs.strike(),
            time_to_maturity: inputs.time_to_maturity(),
            volatility: inputs.volatility(),
            rate: inputs.rate(),
        });
        write_rows_atomic(&self.calculation_path(), &CALCULATION_HEADERS, &rows)?;
        debug!("created calculation {} in {}", id, self.dir.display());
        Ok(CalcId(id))
    }

    fn append_surface_samples(&mut self, calc_id: CalcId, samples: &[SurfaceSample]) -> Result<()> {
        if !self.calculation_rows()?.iter().any(|r| r.id == calc_id.0) {
            return Err(HeatmapError::storage(format!(
                "foreign key violation: surface_sample.calculation_id {} references no calculation",
                calc_id
            )));
        }

        let mut rows = self.sample_rows()?;
        let first_id =
            self.reserve_ids(SAMPLE_FILE, max_id(rows.iter().map(|r| r.id)) + 1, samples.len())?;
        rows.extend(samples.iter().zip(first_id..).map(|(s, id)| SampleRow {
            id,
            calculation_id: calc_id.0,
            spot: s.spot,
            volatility: s.volatility,
            call_price: s.call_price,
            put_price: s.put_price,
        }));
        write_rows_atomic(&self.sample_path(), &SAMPLE_HEADERS, &rows)?;
        debug!("stored {} samples for calculation {}", samples.len(), calc_id);
        Ok(())
    }

    fn list_calculations(&self) -> Result<Vec<CalculationRecord>> {
        let mut records = self
            .calculation_rows()?
            .into_iter()
            .map(CalculationRow::into_record)
            .collect::<Result<Vec<_>>>()?;
        sort_history(&mut records);
        Ok(records)
    }

    fn get_surface_samples(&self, calc_id: CalcId) -> Result<Vec<SurfaceSample>> {
        Ok(self
            .sample_rows()?
            .iter()
            .filter(|r| r.calculation_id == calc_id.0)
            .map(SurfaceSample::from)
            .collect())
    }

    fn get_calculation(&self, calc_id: CalcId) -> Result<Option<CalculationRecord>> {
        self.calculation_rows()?
            .into_iter()
            .find(|r| r.id == calc_id.0)
            .map(CalculationRow::into_record)
            .transpose()
    }

    fn delete_calculation(&mut self, calc_id: CalcId) -> Result<bool> {
        let mut calcs = self.calculation_rows()?;
        let before = calcs.len();
        calcs.retain(|r| r.id != calc_id.0);
        if calcs.len() == before {
            return Ok(false);
        }

        // Samples go first so a failure in between never leaves orphans.
        let mut samples = self.sample_rows()?;
        samples.retain(|r| r.calculation_id != calc_id.0);
        write_rows_atomic(&self.sample_path(), &SAMPLE_HEADERS, &samples)?;
        write_rows_atomic(&self.calculation_path(), &CALCULATION_HEADERS, &calcs)?;
        debug!("deleted calculation {} and its samples", calc_id);
        Ok(true)
    }
}
