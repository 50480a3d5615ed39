//! # Worksheet Row Processing
//!
//! Reads the rows of a worksheet XML part, resolves shared strings, and turns the
//! title row into a [`HeaderTable`] mapping header text to column indexes.
pub mod header;
pub mod reference;
pub mod row;
pub mod shared;

use thiserror::Error;

pub use header::resolve_header;
pub use header::HeaderTable;
pub use row::Row;
pub use row::RowCell;
pub use row::RowCursor;
pub use shared::SharedStrings;

/// Errors raised while walking worksheet rows.
#[derive(Error, Debug)]
pub enum SheetError {
    /// Header row expected but not found
    #[error("Missing header row")]
    NoHeaderRow,

    /// A shared string cell points past the shared string table
    #[error("Shared string {0} not found")]
    MissingSharedString(usize),

    /// A shared string cell whose value is not an index
    #[error("Invalid shared string index '{0}'")]
    InvalidSharedStringIndex(String),
}
