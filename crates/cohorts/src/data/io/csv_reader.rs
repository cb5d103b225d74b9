//! CSV-to-table decoder.

use crate::data::table::{RawColumn, Table};

use super::error::TableLoadError;

/// Decode CSV bytes with a header row into a [`Table`].
///
/// The first record supplies column names; every following record supplies
/// one row. Ragged records are rejected by the reader.
///
/// # Errors
///
/// - [`TableLoadError::Empty`] for empty or whitespace-only input.
/// - [`TableLoadError::Csv`] for malformed CSV (including ragged rows).
/// - [`TableLoadError::Table`] if the decoded columns violate table
///   invariants.
///
/// # Example
///
/// ```
/// use cohorts::data::io::read_table;
///
/// let table = read_table(b"name,age\nAlice,20\nBob,45\n").unwrap();
/// assert_eq!(table.n_rows(), 2);
/// assert_eq!(table.column("name").unwrap().values()[0], "Alice");
/// ```
pub fn read_table(bytes: &[u8]) -> Result<Table, TableLoadError> {
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(TableLoadError::Empty);
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut columns: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record?;
        for (col, cell) in columns.iter_mut().zip(record.iter()) {
            col.push(cell.to_string());
        }
    }

    let columns = headers
        .into_iter()
        .zip(columns)
        .map(|(name, values)| RawColumn::new(name, values))
        .collect();

    Ok(Table::from_columns(columns)?)
}
