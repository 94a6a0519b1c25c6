use crate::types::{Document, FlatRecord};
use serde_json::Value;
use std::collections::VecDeque;

/// Flatten a nested document into a single-level record.
///
/// Nested objects are walked breadth-first and their keys joined with
/// `separator`. Arrays and scalars are leaves and are never descended into.
/// An empty nested object is kept as a leaf so the field is not dropped.
pub fn flatten(document: Document, separator: &str) -> FlatRecord {
    let mut queue: VecDeque<(String, Value)> = document.into_iter().collect();
    let mut output = FlatRecord::new();

    while let Some((key, value)) = queue.pop_front() {
        match value {
            Value::Object(obj) if !obj.is_empty() => {
                queue.extend(
                    obj.into_iter()
                        .map(|(child, v)| (format!("{}{}{}", key, separator, child), v)),
                );
            }
            leaf => {
                output.insert(key, leaf);
            }
        }
    }

    output
}
