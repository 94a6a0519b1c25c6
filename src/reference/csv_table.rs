//! Raw tabular loading for the reference sheets

use crate::error::{Result, SourceError};
use crate::reference::tables::RawTable;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

/// Widest sheet a spreadsheet can hold (A to XFD)
pub const MAX_COLUMNS: usize = 16_384;

static COLUMN_RANGE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z]+)(?::([A-Za-z]+))?$").unwrap());

/// An inclusive, zero-based range of sheet columns, written like `B:E`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRange {
    start: usize,
    end: usize,
}

impl ColumnRange {
    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    fn select<'a>(&self, cells: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
        let mut selected: Vec<&str> = cells.skip(self.start).take(self.end - self.start + 1).collect();
        selected.resize(self.end - self.start + 1, "");
        selected
    }
}

impl FromStr for ColumnRange {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self> {
        let caps = COLUMN_RANGE_REGEX
            .captures(s.trim())
            .ok_or_else(|| SourceError::InvalidParameter(format!("invalid column range '{}'", s)))?;

        let out_of_range = || {
            SourceError::InvalidParameter(format!(
                "column range '{}' goes past the last sheet column XFD",
                s
            ))
        };
        let start = column_index(&caps[1]).ok_or_else(out_of_range)?;
        let end = match caps.get(2) {
            Some(m) => column_index(m.as_str()).ok_or_else(out_of_range)?,
            None => start,
        };

        if end < start {
            return Err(SourceError::InvalidParameter(format!(
                "column range '{}' ends before it starts",
                s
            )));
        }

        Ok(ColumnRange { start, end })
    }
}

/// Spreadsheet letters to a zero-based index: A -> 0, Z -> 25, AA -> 26.
/// `None` past column XFD.
fn column_index(letters: &str) -> Option<usize> {
    let number = letters.bytes().try_fold(0usize, |acc, b| {
        let digit = (b.to_ascii_uppercase() - b'A') as usize + 1;
        acc.checked_mul(26)?.checked_add(digit)
    })?;

    (1..=MAX_COLUMNS).contains(&number).then(|| number - 1)
}

/// Where the header sits in a sheet and which columns to keep
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableLayout {
    /// Number of rows to skip before the header row
    pub header_row: usize,

    /// Columns to keep; all columns when `None`
    pub columns: Option<ColumnRange>,
}

impl TableLayout {
    /// Layout of the review status sheet: header on the third row, columns B to E
    pub fn review_status() -> Self {
        TableLayout {
            header_row: 2,
            columns: Some(ColumnRange { start: 1, end: 4 }),
        }
    }
}

/// Read a CSV export of one sheet
pub fn read_table(path: &Path, layout: &TableLayout) -> Result<RawTable> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| SourceError::unavailable(path, e))?;

    read_records(reader, layout).map_err(|e| match e {
        TableError::Csv(e) => SourceError::unavailable(path, e),
        TableError::Empty => SourceError::MalformedInput(format!(
            "{} has no header row after skipping {} rows",
            path.display(),
            layout.header_row
        )),
    })
}

#[cfg(test)]
fn read_table_from<R: Read>(input: R, layout: &TableLayout) -> Result<RawTable> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input);

    read_records(reader, layout).map_err(|e| match e {
        TableError::Csv(e) => SourceError::MalformedInput(e.to_string()),
        TableError::Empty => SourceError::MalformedInput(format!(
            "no header row after skipping {} rows",
            layout.header_row
        )),
    })
}

enum TableError {
    Csv(csv::Error),
    Empty,
}

fn read_records<R: Read>(mut reader: csv::Reader<R>, layout: &TableLayout) -> std::result::Result<RawTable, TableError> {
    let mut records = reader.records().skip(layout.header_row);

    let header = match records.next() {
        Some(record) => record.map_err(TableError::Csv)?,
        None => return Err(TableError::Empty),
    };
    let columns: Vec<String> = select(&header, layout)
        .into_iter()
        .map(|c| c.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in records {
        let record = record.map_err(TableError::Csv)?;
        let cells = select(&record, layout);

        // Blank lines in the sheet export
        if cells.iter().all(|c| c.is_empty()) {
            continue;
        }

        rows.push(
            cells
                .into_iter()
                .map(|c| if c.is_empty() { Value::Null } else { Value::String(c.to_string()) })
                .collect(),
        );
    }

    Ok(RawTable { columns, rows })
}

fn select<'a>(record: &'a csv::StringRecord, layout: &TableLayout) -> Vec<&'a str> {
    match layout.columns {
        Some(range) => range.select(record.iter()),
        None => record.iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_column_range() {
        assert_eq!("B:E".parse::<ColumnRange>().unwrap(), ColumnRange { start: 1, end: 4 });
        assert_eq!("c".parse::<ColumnRange>().unwrap(), ColumnRange { start: 2, end: 2 });
        assert_eq!("Z:AB".parse::<ColumnRange>().unwrap(), ColumnRange { start: 25, end: 27 });
        assert!("E:B".parse::<ColumnRange>().is_err());
        assert!("B-E".parse::<ColumnRange>().is_err());
    }

    #[test]
    fn test_column_range_is_bounded_by_sheet_width() {
        let last = "A:XFD".parse::<ColumnRange>().unwrap();
        assert_eq!((last.start(), last.end()), (0, MAX_COLUMNS - 1));

        for input in ["XFE", "A:ZZZZZZZZZZZ", "ZZZZZZZZZZZZZZZ", "ZZZZZZZZZZZZZZZZZZZZZZZZZZZZZZ:A"] {
            assert!(
                matches!(input.parse::<ColumnRange>(), Err(SourceError::InvalidParameter(_))),
                "{} should be rejected",
                input
            );
        }
    }

    #[test]
    fn test_read_with_header_offset_and_range() {
        let sheet = "\
Review status,,,,,
,,,,,
,Article ID,Status,Reference ID,Row,ignored
x,A1 ,Reviewed,R1,2.3,zzz
,,,,,
x,A2,Pending,R2,,zzz
";
        let table = read_table_from(sheet.as_bytes(), &TableLayout::review_status()).unwrap();

        assert_eq!(table.columns, vec!["Article ID", "Status", "Reference ID", "Row"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0], vec![json!("A1 "), json!("Reviewed"), json!("R1"), json!("2.3")]);
        assert_eq!(table.rows[1][3], Value::Null);
    }

    #[test]
    fn test_read_short_rows_are_padded() {
        let sheet = "a,b,c\n1\n";
        let layout = TableLayout {
            header_row: 0,
            columns: Some("A:C".parse().unwrap()),
        };
        let table = read_table_from(sheet.as_bytes(), &layout).unwrap();
        assert_eq!(table.rows[0], vec![json!("1"), Value::Null, Value::Null]);
    }

    #[test]
    fn test_missing_header_is_malformed() {
        let err = read_table_from("only,one\n".as_bytes(), &TableLayout::review_status()).unwrap_err();
        assert!(matches!(err, SourceError::MalformedInput(_)));
    }
}
