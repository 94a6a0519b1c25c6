//! Normalized reference rows used by the joiner

use crate::error::{Result, SourceError};
use serde_json::{Map, Value};

pub const ARTICLE_ID: &str = "article_id";
pub const REFERENCE_ID: &str = "reference_id";

/// A table as handed over by a loader: header names plus row cells
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl RawTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        RawTable { columns, rows }
    }
}

/// A row from the review status table
#[derive(Debug, Clone, PartialEq)]
pub struct StatusRow {
    pub fields: Map<String, Value>,
}

impl StatusRow {
    pub fn article_id(&self) -> Option<&str> {
        self.fields.get(ARTICLE_ID).and_then(Value::as_str)
    }

    pub fn reference_id(&self) -> Option<&str> {
        self.fields.get(REFERENCE_ID).and_then(Value::as_str)
    }

    pub fn status(&self) -> Option<&Value> {
        self.fields.get("status")
    }
}

/// A row from the completion date table
#[derive(Debug, Clone, PartialEq)]
pub struct DateRow {
    pub fields: Map<String, Value>,
}

impl DateRow {
    pub fn reference_id(&self) -> Option<&str> {
        self.fields.get(REFERENCE_ID).and_then(Value::as_str)
    }

    pub fn date_completed(&self) -> Option<&Value> {
        self.fields.get("date_completed")
    }

    pub fn reviewer(&self) -> Option<&Value> {
        self.fields.get("reviewer")
    }
}

/// Both reference tables after column and key normalization
#[derive(Debug, Clone, Default)]
pub struct ReferenceTables {
    pub status: Vec<StatusRow>,
    pub dates: Vec<DateRow>,
}

impl ReferenceTables {
    /// Normalize the raw status and date tables.
    ///
    /// Column names are lower-cased with spaces replaced by underscores,
    /// `article_id` is trimmed and both tables' `reference_id` values are
    /// rendered as strings. Columns named in `split_columns` are split on
    /// '.' into lists.
    pub fn from_raw(status: RawTable, dates: RawTable, split_columns: &[String]) -> Result<Self> {
        let status_rows = normalize_rows(status, "review_status", ARTICLE_ID)?;
        let date_rows = normalize_rows(dates, "date_completed", REFERENCE_ID)?;

        let status = status_rows
            .into_iter()
            .map(|mut fields| {
                if let Some(id) = fields.get_mut(ARTICLE_ID) {
                    *id = match stringify(id) {
                        Value::String(s) => Value::String(s.trim().to_string()),
                        other => other,
                    };
                }
                if let Some(id) = fields.get_mut(REFERENCE_ID) {
                    *id = stringify(id);
                }
                for column in split_columns {
                    if let Some(cell) = fields.get_mut(column) {
                        *cell = split_on_dots(cell);
                    }
                }
                StatusRow { fields }
            })
            .collect();

        let dates = date_rows
            .into_iter()
            .map(|mut fields| {
                if let Some(id) = fields.get_mut(REFERENCE_ID) {
                    *id = stringify(id);
                }
                DateRow { fields }
            })
            .collect();

        Ok(ReferenceTables { status, dates })
    }
}

/// Lower-case a column name and replace spaces with underscores
pub fn normalize_column(name: &str) -> String {
    name.replace(' ', "_").to_lowercase()
}

fn normalize_rows(table: RawTable, name: &str, required: &str) -> Result<Vec<Map<String, Value>>> {
    let columns: Vec<String> = table.columns.iter().map(|c| normalize_column(c)).collect();

    if !columns.iter().any(|c| c == required) {
        return Err(SourceError::MalformedInput(format!(
            "{} table has no '{}' column (found: {})",
            name,
            required,
            columns.join(", ")
        )));
    }

    let rows = table
        .rows
        .into_iter()
        .map(|cells| {
            let mut cells = cells.into_iter();
            columns
                .iter()
                .map(|column| (column.clone(), cells.next().unwrap_or(Value::Null)))
                .collect()
        })
        .collect();

    Ok(rows)
}

/// Render scalar ids as strings so numeric and textual ids compare equal
fn stringify(value: &Value) -> Value {
    match value {
        Value::String(_) | Value::Null => value.clone(),
        Value::Number(n) => Value::String(n.to_string()),
        Value::Bool(b) => Value::String(b.to_string()),
        other => other.clone(),
    }
}

fn split_on_dots(value: &Value) -> Value {
    match stringify(value) {
        Value::String(s) => Value::Array(s.split('.').map(|p| Value::String(p.to_string())).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn status_table() -> RawTable {
        RawTable::new(
            vec!["Article ID".into(), "Status".into(), "Reference ID".into(), "Row".into()],
            vec![
                vec![json!("  A1 "), json!("Reviewed"), json!("R1"), json!("3.1")],
                vec![json!("A2"), json!("Pending"), json!(7), Value::Null],
            ],
        )
    }

    fn date_table() -> RawTable {
        RawTable::new(
            vec!["Reference ID".into(), "Date Completed".into(), "Reviewer".into()],
            vec![vec![json!(7), json!("2021-08-01"), json!("Kim")]],
        )
    }

    #[test]
    fn test_normalize_column() {
        assert_eq!(normalize_column("Date Completed"), "date_completed");
        assert_eq!(normalize_column("article_id"), "article_id");
        assert_eq!(normalize_column("Two  Spaces"), "two__spaces");
    }

    #[test]
    fn test_from_raw_normalizes_keys() {
        let tables = ReferenceTables::from_raw(status_table(), date_table(), &["row".to_string()]).unwrap();

        assert_eq!(tables.status.len(), 2);
        assert_eq!(tables.status[0].article_id(), Some("A1"));
        assert_eq!(tables.status[0].reference_id(), Some("R1"));
        assert_eq!(tables.status[0].fields.get("row").unwrap(), &json!(["3", "1"]));
        assert_eq!(tables.status[1].reference_id(), Some("7"));
        assert_eq!(tables.status[1].fields.get("row").unwrap(), &Value::Null);

        assert_eq!(tables.dates[0].reference_id(), Some("7"));
        assert_eq!(tables.dates[0].date_completed().unwrap(), "2021-08-01");
        assert_eq!(tables.dates[0].reviewer().unwrap(), "Kim");
    }

    #[test]
    fn test_short_rows_are_padded_with_null() {
        let status = RawTable::new(
            vec!["article_id".into(), "status".into()],
            vec![vec![json!("A1")]],
        );
        let tables = ReferenceTables::from_raw(status, date_table(), &[]).unwrap();
        assert_eq!(tables.status[0].status().unwrap(), &Value::Null);
    }

    #[test]
    fn test_missing_join_column_is_malformed() {
        let status = RawTable::new(vec!["status".into()], vec![]);
        let err = ReferenceTables::from_raw(status, date_table(), &[]).unwrap_err();
        assert!(matches!(err, SourceError::MalformedInput(_)));

        let dates = RawTable::new(vec!["reviewer".into()], vec![]);
        let err = ReferenceTables::from_raw(status_table(), dates, &[]).unwrap_err();
        assert!(matches!(err, SourceError::MalformedInput(_)));
    }
}
