//! Shared error types for table ingestion.

use crate::data::error::TableError;

/// Errors that can occur when decoding CSV bytes into a table.
///
/// This is the parse-failure class of the pipeline: malformed input aborts
/// the whole run and the message surfaces unchanged to the caller.
#[derive(Debug, thiserror::Error)]
pub enum TableLoadError {
    #[error("uploaded file is empty")]
    Empty,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Table(#[from] TableError),
}
