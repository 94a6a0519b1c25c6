//! Field-name schema of merged records
//!
//! The sampled variant only looks at the first batch, so fields that appear
//! in later documents are missing from it. Use [`infer_schema_full`] when
//! every field must be seen.

use crate::error::Result;
use crate::types::{Batch, FlatRecord};
use std::collections::BTreeSet;

/// Union of the keys of every record in the first batch
pub fn infer_schema<I>(mut batches: I) -> Result<BTreeSet<String>>
where
    I: Iterator<Item = Result<Batch>>,
{
    match batches.next() {
        Some(batch) => Ok(field_names(batch?.iter())),
        None => Ok(BTreeSet::new()),
    }
}

/// Union of the keys of every record in every batch
pub fn infer_schema_full<I>(batches: I) -> Result<BTreeSet<String>>
where
    I: Iterator<Item = Result<Batch>>,
{
    let mut fields = BTreeSet::new();
    for batch in batches {
        fields.extend(field_names(batch?.iter()));
    }
    Ok(fields)
}

fn field_names<'a>(records: impl IntoIterator<Item = &'a FlatRecord>) -> BTreeSet<String> {
    records
        .into_iter()
        .flat_map(|record| record.keys().cloned())
        .collect()
}
