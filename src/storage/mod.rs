//! Persistence: flat JSON records and columnar Parquet tables
//!
//! **Append-Only Tables**:
//! - Outcome and grid tables are built once from finished runs
//! - More runs are added with [`ResultTable::append_batch`] (schema checked)
//! - Hypotheses are flattened to `;`-joined strings in the columnar form
//!
//! JSON keeps hypotheses as feature lists and is the lossless form.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, StringArray, UInt32Array, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{info, warn};

use crate::experiment::OutcomeRecord;
use crate::fit::{FitArtifact, FitReport, GridPoint};
use crate::{Error, Result};

/// Column layout of the outcome table.
#[must_use]
pub fn outcome_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("trial_id", DataType::Utf8, false),
        Field::new("trial_type", DataType::Utf8, false),
        Field::new("condition", DataType::Utf8, false),
        Field::new("chain_index", DataType::UInt32, false),
        Field::new("initial_hypothesis", DataType::Utf8, false),
        Field::new("final_hypothesis", DataType::Utf8, false),
        Field::new("final_length", DataType::UInt64, false),
        Field::new("response_type", DataType::Utf8, false),
        Field::new("additive_moves", DataType::UInt32, false),
        Field::new("subtractive_moves", DataType::UInt32, false),
        Field::new("accuracy", DataType::Float64, false),
    ]))
}

/// Column layout of the grid-search table.
#[must_use]
pub fn grid_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("p_add", DataType::Float64, false),
        Field::new("steps", DataType::UInt32, false),
        Field::new("temperature", DataType::Float64, false),
        Field::new("loss", DataType::Float64, false),
    ]))
}

fn strings<'a>(values: impl Iterator<Item = &'a str>) -> ArrayRef {
    Arc::new(StringArray::from_iter_values(values))
}

/// Flatten outcome records into one record batch.
///
/// # Errors
///
/// Returns error if Arrow rejects the columns.
pub fn outcomes_to_batch(records: &[OutcomeRecord]) -> Result<RecordBatch> {
    let initial: Vec<String> = records.iter().map(|r| r.initial_hypothesis().joined()).collect();
    let final_h: Vec<String> = records.iter().map(|r| r.final_hypothesis().joined()).collect();

    let columns: Vec<ArrayRef> = vec![
        strings(records.iter().map(OutcomeRecord::trial_id)),
        strings(records.iter().map(OutcomeRecord::trial_type)),
        strings(records.iter().map(OutcomeRecord::condition)),
        Arc::new(UInt32Array::from_iter_values(records.iter().map(OutcomeRecord::chain_index))),
        strings(initial.iter().map(String::as_str)),
        strings(final_h.iter().map(String::as_str)),
        Arc::new(UInt64Array::from_iter_values(
            records.iter().map(|r| r.final_length() as u64),
        )),
        strings(records.iter().map(|r| r.response_type().as_str())),
        Arc::new(UInt32Array::from_iter_values(records.iter().map(OutcomeRecord::additive_moves))),
        Arc::new(UInt32Array::from_iter_values(
            records.iter().map(OutcomeRecord::subtractive_moves),
        )),
        Arc::new(Float64Array::from_iter_values(records.iter().map(OutcomeRecord::accuracy))),
    ];

    Ok(RecordBatch::try_new(outcome_schema(), columns)?)
}

/// One row per grid point: `p_add, steps, temperature, loss`.
///
/// # Errors
///
/// Returns error if Arrow rejects the columns.
pub fn grid_to_batch(points: &[GridPoint]) -> Result<RecordBatch> {
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Float64Array::from_iter_values(points.iter().map(|p| p.p_add))),
        Arc::new(UInt32Array::from_iter_values(points.iter().map(|p| p.steps))),
        Arc::new(Float64Array::from_iter_values(points.iter().map(|p| p.temperature))),
        Arc::new(Float64Array::from_iter_values(points.iter().map(|p| p.loss))),
    ];
    Ok(RecordBatch::try_new(grid_schema(), columns)?)
}

/// Columnar result table backed by Arrow record batches.
#[derive(Debug, Clone, Default)]
pub struct ResultTable {
    batches: Vec<RecordBatch>,
}

impl ResultTable {
    /// Create a table from existing batches.
    #[must_use]
    pub fn new(batches: Vec<RecordBatch>) -> Self {
        Self { batches }
    }

    /// Outcome table for a set of records.
    ///
    /// # Errors
    ///
    /// Returns error if Arrow rejects the columns.
    pub fn from_outcomes(records: &[OutcomeRecord]) -> Result<Self> {
        Ok(Self::new(vec![outcomes_to_batch(records)?]))
    }

    /// Grid table for a set of evaluated points.
    ///
    /// # Errors
    ///
    /// Returns error if Arrow rejects the columns.
    pub fn from_grid(points: &[GridPoint]) -> Result<Self> {
        Ok(Self::new(vec![grid_to_batch(points)?]))
    }

    /// Load a table from a Parquet file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed.
    pub fn load_parquet<P: AsRef<Path>>(path: P) -> Result<Self> {
        use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

        let path = path.as_ref();
        let file = File::open(path)
            .map_err(storage_error(format!("Failed to open {}", path.display())))?;
        let batches = ParquetRecordBatchReaderBuilder::try_new(file)
            .and_then(ParquetRecordBatchReaderBuilder::build)
            .map_err(storage_error(format!("Failed to parse {}", path.display())))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(storage_error(format!("Bad record batch in {}", path.display())))?;

        Ok(Self { batches })
    }

    /// Write every batch to a Parquet file.
    ///
    /// # Errors
    ///
    /// Returns error if the table is empty or the file cannot be written.
    pub fn write_parquet<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        use parquet::arrow::ArrowWriter;

        let schema = self
            .schema()
            .ok_or_else(|| Error::StorageError("Cannot write an empty table".to_string()))?;

        let path = path.as_ref();
        let file = File::create(path)
            .map_err(storage_error(format!("Failed to create {}", path.display())))?;
        let mut writer = ArrowWriter::try_new(file, schema, None)
            .map_err(storage_error("Failed to start Parquet writer"))?;
        for batch in &self.batches {
            writer
                .write(batch)
                .map_err(storage_error(format!("Failed to write {}", path.display())))?;
        }
        writer
            .close()
            .map_err(storage_error(format!("Failed to finalize {}", path.display())))?;

        info!(path = %path.display(), rows = self.num_rows(), "wrote parquet");
        Ok(())
    }

    /// All record batches.
    #[must_use]
    pub fn batches(&self) -> &[RecordBatch] {
        &self.batches
    }

    /// Schema of the first batch, if any.
    #[must_use]
    pub fn schema(&self) -> Option<SchemaRef> {
        self.batches.first().map(RecordBatch::schema)
    }

    /// Total row count.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(RecordBatch::num_rows).sum()
    }

    /// Append a batch, e.g. the records of another parameter point.
    ///
    /// # Errors
    ///
    /// Returns error if the batch schema doesn't match existing batches.
    pub fn append_batch(&mut self, batch: RecordBatch) -> Result<()> {
        if let Some(existing_schema) = self.schema() {
            if batch.schema() != existing_schema {
                return Err(Error::StorageError(format!(
                    "Schema mismatch: expected {:?}, got {:?}",
                    existing_schema,
                    batch.schema()
                )));
            }
        }

        self.batches.push(batch);
        Ok(())
    }
}

/// Wrap a lower-level failure as [`Error::StorageError`] prefixed by `context`.
fn storage_error<E: std::fmt::Display>(context: impl std::fmt::Display) -> impl FnOnce(E) -> Error {
    move |e| Error::StorageError(format!("{context}: {e}"))
}

/// Read every record batch from a Parquet file.
///
/// # Errors
///
/// Returns error if the file cannot be read or parsed.
pub fn read_parquet<P: AsRef<Path>>(path: P) -> Result<Vec<RecordBatch>> {
    Ok(ResultTable::load_parquet(path)?.batches)
}

/// Write a value as pretty-printed JSON.
///
/// # Errors
///
/// Returns error if the file cannot be created or serialization fails.
pub fn save_json<T: Serialize + ?Sized, P: AsRef<Path>>(value: &T, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)
        .map_err(storage_error(format!("Failed to create {}", path.display())))?;
    serde_json::to_writer_pretty(file, value)?;
    info!(path = %path.display(), "wrote json");
    Ok(())
}

/// Read a JSON file.
///
/// # Errors
///
/// Returns error if the file cannot be read or does not match `T`.
pub fn load_json<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let path = path.as_ref();
    let file =
        File::open(path).map_err(storage_error(format!("Failed to open {}", path.display())))?;
    Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
}

/// Save outcome records as `<stem>.json` and `<stem>.parquet` in `dir`.
///
/// An empty record set writes nothing and logs a warning.
///
/// # Errors
///
/// Returns error if either file cannot be written.
pub fn save_outcomes<P: AsRef<Path>>(records: &[OutcomeRecord], dir: P, stem: &str) -> Result<()> {
    if records.is_empty() {
        warn!(stem, "no results to save");
        return Ok(());
    }
    let dir = dir.as_ref();
    save_json(records, dir.join(format!("{stem}.json")))?;
    ResultTable::from_outcomes(records)?.write_parquet(dir.join(format!("{stem}.parquet")))
}

/// Save a finished fit into `dir`.
///
/// Writes `model_fit_grid.json`, `model_fit_grid.parquet`,
/// `best_model_params.json` and `fit_artifact.json`.
///
/// # Errors
///
/// Returns error if any file cannot be written.
pub fn save_fit<P: AsRef<Path>>(report: &FitReport, artifact: &FitArtifact, dir: P) -> Result<()> {
    let dir = dir.as_ref();
    save_json(report.points(), dir.join("model_fit_grid.json"))?;
    ResultTable::from_grid(report.points())?.write_parquet(dir.join("model_fit_grid.parquet"))?;
    save_json(&report.best_params(), dir.join("best_model_params.json"))?;
    save_json(artifact, dir.join("fit_artifact.json"))
}
