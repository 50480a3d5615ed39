use crate::config::ConversionPolicy;
use crate::config::ReadConfig;
use crate::error::ResultMessage;
use crate::error::RustyRowsError;
use crate::scan::ScanError;
use crate::schema::BindingCache;
use crate::schema::BindingError;
use crate::schema::ColumnBindings;
use crate::schema::Record;
use crate::sheet::reference::index_to_reference;
use crate::sheet::resolve_header;
use crate::sheet::HeaderTable;
use crate::sheet::Row;
use crate::sheet::RowCursor;
use crate::sheet::SharedStrings;
use crate::sheet::SheetError;
use log::debug;
use log::warn;
use std::collections::HashSet;
use std::io::BufRead;
use std::sync::Arc;
use thiserror::Error;

/// A cell whose text did not convert into its field.
#[derive(Error, Debug)]
#[error("Invalid cell value '{text}' at {reference} for field '{field}': {source}")]
pub struct CellError {
    /// Excel-style cell reference, e.g. "B7"
    pub reference: String,
    pub field: &'static str,
    pub text: String,
    #[source]
    pub source: ScanError,
}

/// Reads records of type `R` from the rows of a worksheet.
///
/// The title row is read and bound on construction; every following row becomes one
/// record. Cells convert into the fields bound to their column, and bound columns
/// without a cell in the row fall back to their default value.
pub struct RecordReader<'s, R: Record, B: BufRead, S: SharedStrings + ?Sized> {
    cursor: RowCursor<'s, B, S>,
    header: HeaderTable,
    bindings: Arc<ColumnBindings<R>>,
    config: ReadConfig,
    records_read: usize,
    failures: Vec<CellError>,
}

impl<'s, R: Record, B: BufRead, S: SharedStrings + ?Sized> RecordReader<'s, R, B, S> {
    /// Opens a reader with its own binding cache.
    pub fn new(source: B, shared_strings: &'s S, config: ReadConfig) -> Result<Self, RustyRowsError> {
        Self::with_cache(source, shared_strings, config, &BindingCache::new())
    }

    /// Opens a reader resolving its bindings through `cache`, so sheets sharing a
    /// header layout share one binding table.
    pub fn with_cache(
        source: B,
        shared_strings: &'s S,
        config: ReadConfig,
        cache: &BindingCache<R>,
    ) -> Result<Self, RustyRowsError> {
        let mut cursor = RowCursor::new(source, shared_strings);
        for _ in 0..config.title_row {
            cursor.next_row()?.ok_or(SheetError::NoHeaderRow)?;
        }
        let header = resolve_header(&mut cursor)?;
        let bindings = cache.resolve(&header)?;
        for _ in 0..config.skip {
            if cursor.next_row().with_prefix("Skip row")?.is_none() {
                break;
            }
        }
        debug!("Reading records after row {}", cursor.rows_read());
        Ok(RecordReader {
            cursor,
            header,
            bindings,
            config,
            records_read: 0,
            failures: Vec::new(),
        })
    }

    /// The resolved title row
    pub fn header(&self) -> &HeaderTable {
        &self.header
    }

    /// Conversion failures passed over under [`ConversionPolicy::Skip`]
    pub fn failures(&self) -> &[CellError] {
        &self.failures
    }

    pub fn records_read(&self) -> usize {
        self.records_read
    }

    /// Reads the next record, `None` once the rows or the row limit are exhausted.
    pub fn read(&mut self) -> Result<Option<R>, RustyRowsError> {
        if self.config.rows_limit.is_some_and(|limit| self.records_read >= limit) {
            return Ok(None);
        }
        let row = match self.cursor.next_row()? {
            Some(row) => row,
            None => return Ok(None),
        };
        let record = self.bind_row(&row)?;
        self.records_read += 1;
        Ok(Some(record))
    }

    /// Reads every remaining record.
    pub fn read_all(&mut self) -> Result<Vec<R>, RustyRowsError> {
        let mut records = Vec::new();
        while let Some(record) = self.read()? {
            records.push(record);
        }
        Ok(records)
    }

    fn bind_row(&mut self, row: &Row) -> Result<R, RustyRowsError> {
        let bindings = Arc::clone(&self.bindings);
        let mut record = R::default();
        let mut filled = HashSet::new();
        for cell in &row.cells {
            if cell.text.is_empty() || !filled.insert(cell.column) {
                continue;
            }
            for binding in bindings.get(cell.column) {
                if let Err(source) = binding.scan(&mut record, &cell.text) {
                    let error = CellError {
                        reference: index_to_reference(row.index, cell.column),
                        field: binding.field_name(),
                        text: cell.text.to_owned(),
                        source,
                    };
                    match self.config.conversion {
                        ConversionPolicy::Abort => return Err(error.into()),
                        ConversionPolicy::Skip => {
                            warn!("{}", error);
                            self.failures.push(error);
                        }
                    }
                }
            }
        }
        for (column, column_bindings) in bindings.iter() {
            if filled.contains(&column) {
                continue;
            }
            for binding in column_bindings {
                binding.scan_default(&mut record).map_err(|source| BindingError::BadDefault {
                    field: binding.field_name(),
                    value: binding.default_value().to_owned(),
                    source,
                })?;
            }
        }
        Ok(record)
    }
}

impl<R: Record, B: BufRead, S: SharedStrings + ?Sized> Iterator for RecordReader<'_, R, B, S> {
    type Item = Result<R, RustyRowsError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read().transpose()
    }
}
