//! Reference tables joined onto articles
//!
//! Loaders produce [`RawTable`]s; [`ReferenceTables::from_raw`] normalizes
//! column names and join keys before any lookup happens.

pub mod csv_table;
pub mod tables;

pub use csv_table::{read_table, ColumnRange, TableLayout};
pub use tables::{normalize_column, DateRow, RawTable, ReferenceTables, StatusRow};
