use crate::error::{Result, SourceError};
use crate::flatten::flatten;
use crate::join::Joiner;
use crate::reference::ReferenceTables;
use crate::types::{Batch, Document, FlatRecord, SourceConfig};
use serde_json::Value;
use std::iter::FusedIterator;
use std::num::NonZeroUsize;

/// Check a caller-supplied batch size before any work starts
pub fn batch_size(size: i64) -> Result<NonZeroUsize> {
    usize::try_from(size)
        .ok()
        .and_then(NonZeroUsize::new)
        .ok_or_else(|| SourceError::InvalidParameter(format!("batch size must be a positive integer, got {}", size)))
}

/// Lazily flattens, joins and groups articles into batches.
///
/// Each call to `next` processes just enough documents to fill one batch.
/// An error ends the sequence.
#[derive(Debug)]
pub struct Batches {
    documents: std::vec::IntoIter<Document>,
    tables: ReferenceTables,
    config: SourceConfig,
    size: NonZeroUsize,
    finished: bool,
}

impl Batches {
    pub fn new(documents: Vec<Document>, tables: ReferenceTables, config: SourceConfig, size: NonZeroUsize) -> Self {
        Batches {
            documents: documents.into_iter(),
            tables,
            config,
            size,
            finished: false,
        }
    }

    fn process(&self, document: Document) -> Result<FlatRecord> {
        let record = flatten(document, &self.config.separator);
        let article_id = article_id(&record, &self.config.id_field)?;
        Ok(Joiner::new(&self.tables, self.config.duplicate_policy).join(record, &article_id))
    }
}

fn article_id(record: &FlatRecord, id_field: &str) -> Result<String> {
    match record.get(id_field) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(other) => Err(SourceError::MalformedInput(format!(
            "article identifier '{}' is not a string or number: {}",
            id_field, other
        ))),
        None => Err(SourceError::MalformedInput(format!(
            "article is missing identifier field '{}'",
            id_field
        ))),
    }
}

impl Iterator for Batches {
    type Item = Result<Batch>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let size = self.size.get();
        let mut records = Vec::with_capacity(size);

        while records.len() < size {
            let Some(document) = self.documents.next() else {
                self.finished = true;
                break;
            };
            match self.process(document) {
                Ok(record) => records.push(record),
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            }
        }

        if records.is_empty() {
            None
        } else {
            Some(Ok(Batch::new(size, records)))
        }
    }
}

impl FusedIterator for Batches {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::StatusRow;
    use serde_json::json;

    fn docs(n: usize) -> Vec<Document> {
        (1..=n)
            .map(|i| match json!({"_id": format!("A{}", i), "meta": {"n": i}}) {
                Value::Object(obj) => obj,
                _ => unreachable!(),
            })
            .collect()
    }

    fn size(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_batch_size_validation() {
        assert_eq!(batch_size(3).unwrap().get(), 3);
        assert!(matches!(batch_size(0), Err(SourceError::InvalidParameter(_))));
        assert!(matches!(batch_size(-1), Err(SourceError::InvalidParameter(_))));
    }

    #[test]
    fn test_batches_preserve_order_with_partial_tail() {
        let batches: Vec<Batch> = Batches::new(docs(7), ReferenceTables::default(), SourceConfig::default(), size(3))
            .collect::<Result<_>>()
            .unwrap();

        let sizes: Vec<usize> = batches.iter().map(Batch::len).collect();
        assert_eq!(sizes, vec![3, 3, 1]);
        assert!(batches.iter().all(|b| b.capacity() == 3));

        let ids: Vec<&str> = batches
            .iter()
            .flat_map(|b| b.iter())
            .map(|r| r.get("_id").and_then(Value::as_str).unwrap())
            .collect();
        assert_eq!(ids, vec!["A1", "A2", "A3", "A4", "A5", "A6", "A7"]);
    }

    #[test]
    fn test_exact_multiple_has_no_empty_tail() {
        let batches = Batches::new(docs(4), ReferenceTables::default(), SourceConfig::default(), size(2));
        assert_eq!(batches.count(), 2);
    }

    #[test]
    fn test_no_documents_yields_nothing() {
        let mut batches = Batches::new(vec![], ReferenceTables::default(), SourceConfig::default(), size(2));
        assert!(batches.next().is_none());
    }

    #[test]
    fn test_records_are_flattened_and_joined() {
        let tables = ReferenceTables {
            status: vec![StatusRow {
                fields: match json!({"article_id": "A2", "status": "Reviewed", "reference_id": "R1"}) {
                    Value::Object(obj) => obj,
                    _ => unreachable!(),
                },
            }],
            dates: vec![],
        };

        let batch = Batches::new(docs(2), tables, SourceConfig::default(), size(5))
            .next()
            .unwrap()
            .unwrap();

        assert_eq!(batch.records()[0].get("meta.n").unwrap(), 1);
        assert!(!batch.records()[0].contains_key("status"));
        assert_eq!(batch.records()[1].get("status").unwrap(), "Reviewed");
    }

    #[test]
    fn test_numeric_identifier_is_accepted() {
        let doc = match json!({"_id": 42}) {
            Value::Object(obj) => obj,
            _ => unreachable!(),
        };
        let batch = Batches::new(vec![doc], ReferenceTables::default(), SourceConfig::default(), size(1))
            .next()
            .unwrap();
        assert!(batch.is_ok());
    }

    #[test]
    fn test_first_batch_is_ready_before_later_documents_are_processed() {
        let mut documents = docs(3);
        documents[2].remove("_id");

        let mut batches = Batches::new(documents, ReferenceTables::default(), SourceConfig::default(), size(2));

        match batches.next() {
            Some(Ok(batch)) => assert_eq!(batch.len(), 2),
            other => panic!("expected a full first batch, got {:?}", other),
        }
        assert!(matches!(batches.next(), Some(Err(SourceError::MalformedInput(_)))));
        assert!(batches.next().is_none());
    }

    #[test]
    fn test_missing_identifier_aborts_the_sequence() {
        let mut documents = docs(3);
        documents[1].remove("_id");

        let mut batches = Batches::new(documents, ReferenceTables::default(), SourceConfig::default(), size(2));

        assert!(matches!(batches.next(), Some(Err(SourceError::MalformedInput(_)))));
        assert!(batches.next().is_none());
    }
}
