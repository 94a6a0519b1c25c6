//! Enrich flat article records with their reference rows
//!
//! Status rows are matched on the article identifier, then date rows on the
//! reference ids of the matched status rows. When several rows match, the
//! last one in source order is merged. Reference values overwrite article
//! fields with the same key.

use crate::reference::{DateRow, ReferenceTables, StatusRow};
use crate::types::{DuplicatePolicy, FlatRecord};
use serde_json::{json, Map, Value};

pub const DUPLICATES_KEY: &str = "status.duplicates";
pub const DUPLICATE_REFERENCES_KEY: &str = "status.duplicates.reference_id";
pub const REVIEWS_KEY: &str = "reviews";

const REVIEWED: &str = "Reviewed";

/// Joins records against a borrowed pair of reference tables
pub struct Joiner<'a> {
    tables: &'a ReferenceTables,
    policy: DuplicatePolicy,
}

impl<'a> Joiner<'a> {
    pub fn new(tables: &'a ReferenceTables, policy: DuplicatePolicy) -> Self {
        Joiner { tables, policy }
    }

    pub fn join(&self, record: FlatRecord, article_id: &str) -> FlatRecord {
        join(record, article_id, &self.tables.status, &self.tables.dates, self.policy)
    }
}

/// Merge the status and date rows matching `article_id` into `record`.
///
/// Zero matches are not an error: the record comes back without reference
/// fields.
pub fn join(
    mut record: FlatRecord,
    article_id: &str,
    status_rows: &[StatusRow],
    date_rows: &[DateRow],
    policy: DuplicatePolicy,
) -> FlatRecord {
    let statuses: Vec<&StatusRow> = status_rows
        .iter()
        .filter(|row| row.article_id() == Some(article_id))
        .collect();

    let reference_ids: Vec<&str> = statuses.iter().filter_map(|row| row.reference_id()).collect();

    if let Some(last) = statuses.last() {
        merge(&mut record, &last.fields);
    }

    if policy == DuplicatePolicy::CountAndLast && statuses.len() > 1 {
        record.insert(DUPLICATES_KEY.to_string(), json!(statuses.len()));
        record.insert(
            DUPLICATE_REFERENCES_KEY.to_string(),
            Value::Array(statuses.iter().map(|row| reference_value(row)).collect()),
        );
    }

    let dates: Vec<&DateRow> = date_rows
        .iter()
        .filter(|row| row.reference_id().is_some_and(|id| reference_ids.contains(&id)))
        .collect();

    if let Some(last) = dates.last() {
        merge(&mut record, &last.fields);
    }

    if policy == DuplicatePolicy::Reviews {
        let reviews = reviews(&statuses, &dates);
        for review in &reviews {
            if review.get("article_status").and_then(Value::as_str) == Some(REVIEWED) {
                if let Some(date) = review.get("date_completed").filter(|d| !d.is_null()) {
                    record.insert("date_completed".to_string(), date.clone());
                }
            }
        }
        record.insert(
            REVIEWS_KEY.to_string(),
            Value::Array(reviews.into_iter().map(Value::Object).collect()),
        );
    }

    record
}

fn merge(record: &mut FlatRecord, fields: &Map<String, Value>) {
    for (key, value) in fields {
        record.insert(key.clone(), value.clone());
    }
}

fn reference_value(row: &StatusRow) -> Value {
    row.reference_id().map(Value::from).unwrap_or(Value::Null)
}

/// One entry per status match, paired with the first date row for its reference id
fn reviews(statuses: &[&StatusRow], dates: &[&DateRow]) -> Vec<Map<String, Value>> {
    statuses
        .iter()
        .map(|status| {
            let date = status
                .reference_id()
                .and_then(|id| dates.iter().find(|d| d.reference_id() == Some(id)));

            let mut review = Map::new();
            review.insert(
                "article_status".to_string(),
                status.status().cloned().unwrap_or(Value::Null),
            );
            review.insert("id".to_string(), reference_value(status));
            review.insert(
                "date_completed".to_string(),
                date.and_then(|d| d.date_completed()).cloned().unwrap_or(Value::Null),
            );
            review.insert(
                "reviewer".to_string(),
                date.and_then(|d| d.reviewer()).cloned().unwrap_or(Value::Null),
            );
            review
        })
        .collect()
}
