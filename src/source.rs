//! The article source: loaders plus the connect / batch / schema surface

use crate::batch::{self, Batches};
use crate::error::{Result, SourceError};
use crate::reference::{read_table, RawTable, ReferenceTables, TableLayout};
use crate::schema::{infer_schema, infer_schema_full};
use crate::types::{Document, SourceConfig};
use serde_json::Value;
use std::collections::BTreeSet;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use tracing::{debug, info};

/// Supplies the raw article documents for one pass
pub trait DocumentSource {
    fn load_documents(&self) -> Result<Vec<Document>>;
}

/// Supplies the raw review status and completion date tables for one pass
pub trait ReferenceSource {
    fn load_reference_tables(&self) -> Result<(RawTable, RawTable)>;
}

impl DocumentSource for Vec<Document> {
    fn load_documents(&self) -> Result<Vec<Document>> {
        Ok(self.clone())
    }
}

impl ReferenceSource for (RawTable, RawTable) {
    fn load_reference_tables(&self) -> Result<(RawTable, RawTable)> {
        Ok(self.clone())
    }
}

/// Articles stored in a JSON file under a JSON pointer
#[derive(Debug, Clone)]
pub struct JsonDocumentFile {
    pub path: PathBuf,
    pub pointer: String,
}

impl JsonDocumentFile {
    /// An API response file with the articles under `response.docs`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonDocumentFile {
            path: path.into(),
            pointer: String::from("/response/docs"),
        }
    }

    pub fn with_pointer(mut self, pointer: impl Into<String>) -> Self {
        self.pointer = pointer.into();
        self
    }
}

impl DocumentSource for JsonDocumentFile {
    fn load_documents(&self) -> Result<Vec<Document>> {
        let mut content = std::fs::read(&self.path).map_err(|e| SourceError::unavailable(&self.path, e))?;

        let mut value: Value = simd_json::serde::from_slice(&mut content).map_err(|e| {
            SourceError::MalformedInput(format!("{}: {}", self.path.display(), e))
        })?;

        let docs = value
            .pointer_mut(&self.pointer)
            .map(Value::take)
            .ok_or_else(|| {
                SourceError::MalformedInput(format!("{} has no '{}'", self.path.display(), self.pointer))
            })?;

        let Value::Array(docs) = docs else {
            return Err(SourceError::MalformedInput(format!(
                "'{}' in {} is not an array",
                self.pointer,
                self.path.display()
            )));
        };

        docs.into_iter()
            .enumerate()
            .map(|(idx, doc)| match doc {
                Value::Object(obj) => Ok(obj),
                _ => Err(SourceError::MalformedInput(format!(
                    "document {} in {} is not an object",
                    idx,
                    self.path.display()
                ))),
            })
            .collect()
    }
}

/// CSV exports of the `review_status` and `date_completed` sheets
#[derive(Debug, Clone)]
pub struct CsvReferenceFiles {
    pub status_path: PathBuf,
    pub dates_path: PathBuf,
    pub status_layout: TableLayout,
    pub dates_layout: TableLayout,
}

impl CsvReferenceFiles {
    pub fn new(status_path: impl Into<PathBuf>, dates_path: impl Into<PathBuf>) -> Self {
        CsvReferenceFiles {
            status_path: status_path.into(),
            dates_path: dates_path.into(),
            status_layout: TableLayout::review_status(),
            dates_layout: TableLayout::default(),
        }
    }
}

impl ReferenceSource for CsvReferenceFiles {
    fn load_reference_tables(&self) -> Result<(RawTable, RawTable)> {
        let status = read_table(&self.status_path, &self.status_layout)?;
        let dates = read_table(&self.dates_path, &self.dates_layout)?;
        Ok((status, dates))
    }
}

/// Articles enriched with their review status and completion date
pub struct ArticleSource<D, R> {
    documents: D,
    references: R,
    config: SourceConfig,
}

impl<D: DocumentSource, R: ReferenceSource> ArticleSource<D, R> {
    pub fn new(documents: D, references: R, config: SourceConfig) -> Self {
        ArticleSource {
            documents,
            references,
            config,
        }
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// Incremental extraction is not supported; the arguments are only logged
    pub fn connect(&mut self, inc_column: Option<&str>, last_value: Option<&Value>) {
        debug!(?inc_column, ?last_value, "connect");
    }

    pub fn disconnect(&mut self) {}

    /// Lazily produce batches of at most `batch_size` merged records.
    ///
    /// The batch size is checked before anything is loaded. Documents and
    /// reference tables are loaded once per call.
    pub fn get_data_batch(&self, batch_size: i64) -> Result<Batches> {
        let size = batch::batch_size(batch_size)?;
        self.batches(size)
    }

    /// Field names seen in the first `schema_sample_size` records
    pub fn get_schema(&self) -> Result<BTreeSet<String>> {
        infer_schema(self.batches(self.sample_size()?)?)
    }

    /// Field names seen in every record
    pub fn get_full_schema(&self) -> Result<BTreeSet<String>> {
        infer_schema_full(self.batches(self.sample_size()?)?)
    }

    fn sample_size(&self) -> Result<NonZeroUsize> {
        NonZeroUsize::new(self.config.schema_sample_size)
            .ok_or_else(|| SourceError::InvalidParameter("schema sample size must be positive".to_string()))
    }

    fn batches(&self, size: NonZeroUsize) -> Result<Batches> {
        let documents = self.documents.load_documents()?;
        let (status, dates) = self.references.load_reference_tables()?;
        let tables = ReferenceTables::from_raw(status, dates, &self.config.split_columns)?;

        info!(
            documents = documents.len(),
            status_rows = tables.status.len(),
            date_rows = tables.dates.len(),
            batch_size = size.get(),
            "starting pass"
        );

        Ok(Batches::new(documents, tables, self.config.clone(), size))
    }
}
