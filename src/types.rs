use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One raw article as read from the document source
pub type Document = Map<String, Value>;

/// A single-level record keyed by dot-joined paths
pub type FlatRecord = Map<String, Value>;

/// How the joiner records more than one status match for an article
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// `status.duplicates` count plus the ordered reference ids; last match wins
    #[default]
    CountAndLast,
    /// A `reviews` list with one entry per status match; last match still wins
    Reviews,
}

/// Configuration for a pass over the article source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Flat-record key that holds the article identifier
    pub id_field: String,

    /// Separator used when joining nested keys
    pub separator: String,

    /// Policy applied when an article has several status rows
    pub duplicate_policy: DuplicatePolicy,

    /// Batch size used when sampling the schema
    pub schema_sample_size: usize,

    /// Status columns whose values are split on '.' into a list
    pub split_columns: Vec<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig {
            id_field: String::from("_id"),
            separator: String::from("."),
            duplicate_policy: DuplicatePolicy::CountAndLast,
            schema_sample_size: 10,
            split_columns: vec![String::from("row")],
        }
    }
}

/// An ordered group of merged records with a declared maximum size
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    capacity: usize,
    records: Vec<FlatRecord>,
}

impl Batch {
    pub fn new(capacity: usize, records: Vec<FlatRecord>) -> Self {
        Batch { capacity, records }
    }

    /// The batch size this batch was produced with
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[FlatRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FlatRecord> {
        self.records.iter()
    }
}

impl IntoIterator for Batch {
    type Item = FlatRecord;
    type IntoIter = std::vec::IntoIter<FlatRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a Batch {
    type Item = &'a FlatRecord;
    type IntoIter = std::slice::Iter<'a, FlatRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
