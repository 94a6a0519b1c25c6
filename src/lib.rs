//! # Article Source - Flatten and Join Pipeline
//!
//! Loads nested article documents, flattens each one into dot-path keys,
//! enriches it with its review status and completion date rows, and hands
//! the merged records out in lazily produced batches.
//!
//! ## Modules
//!
//! - **flatten**: nested documents to single-level records
//! - **reference**: loading and normalizing the two reference tables
//! - **join**: status and date lookups with the duplicate-match policies
//! - **batch**: lazy fixed-size batches over all articles
//! - **schema**: field names observed in a sample (or all) of the records
//! - **source**: loaders and the `connect` / `get_data_batch` / `get_schema` surface
//!
//! ## Quick Start
//!
//! ```rust
//! use article_source::{ArticleSource, RawTable, SourceConfig};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), article_source::SourceError> {
//! let docs = vec![json!({"_id": "A1", "headline": {"main": "Hello"}})
//!     .as_object()
//!     .cloned()
//!     .unwrap()];
//!
//! let status = RawTable::new(
//!     vec!["Article ID".into(), "Status".into(), "Reference ID".into()],
//!     vec![vec![json!("A1"), json!("Reviewed"), json!("R1")]],
//! );
//! let dates = RawTable::new(
//!     vec!["Reference ID".into(), "Date Completed".into()],
//!     vec![vec![json!("R1"), json!("2021-08-01")]],
//! );
//!
//! let source = ArticleSource::new(docs, (status, dates), SourceConfig::default());
//! for batch in source.get_data_batch(2)? {
//!     for record in batch?.iter() {
//!         assert_eq!(record["headline.main"], "Hello");
//!         assert_eq!(record["date_completed"], "2021-08-01");
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod error;
pub mod flatten;
pub mod join;
pub mod reference;
pub mod schema;
pub mod source;
pub mod types;

// Re-export commonly used types for convenience
pub use batch::Batches;
pub use error::{Result, SourceError};
pub use flatten::flatten;
pub use join::{join, Joiner};
pub use reference::{ColumnRange, DateRow, RawTable, ReferenceTables, StatusRow, TableLayout};
pub use schema::{infer_schema, infer_schema_full};
pub use source::{ArticleSource, CsvReferenceFiles, DocumentSource, JsonDocumentFile, ReferenceSource};
pub use types::{Batch, Document, DuplicatePolicy, FlatRecord, SourceConfig};
