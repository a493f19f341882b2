//! Untyped tabular input.
//!
//! Bank SMS dumps, Tally ledger exports and GST registers all arrive as
//! loosely structured spreadsheets. `RawTable` keeps them as strings and
//! leaves every interpretation decision to the normalizer, which knows the
//! quirks of each source.

use crate::error::ReconError;

/// A table as it came off disk: one row of column names and string cells.
/// Rows may be ragged; [`cell`] papers over short rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn from_parts(columns: Vec<String>, rows: Vec<Vec<String>>) -> RawTable {
        RawTable { columns, rows }
    }

    /// Parses CSV text, taking the first record as the column row. Ragged
    /// records are preserved as-is.
    pub fn from_csv_str(text: &str) -> Result<RawTable, ReconError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());

        let mut records: Vec<Vec<String>> = Vec::new();
        for record in reader.records() {
            let record = record?;
            records.push(record.iter().map(str::to_string).collect());
        }
        if records.is_empty() {
            return Err(ReconError::EmptyInput);
        }
        let columns = records.remove(0);
        Ok(RawTable { columns, rows: records })
    }

    /// Index of the named column, after trimming header whitespace.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|col| col.trim() == name)
    }
}

/// Cell text by optional column index. Absent columns and short rows read
/// as empty.
pub(crate) fn cell<'a>(row: &'a [String], col: Option<usize>) -> &'a str {
    col.and_then(|idx| row.get(idx))
        .map(String::as_str)
        .unwrap_or("")
}
