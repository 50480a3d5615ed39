/// What a [`RecordReader`](crate::reader::RecordReader) does with a cell whose text does
/// not convert into its field.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ConversionPolicy {
    /// Stop reading and return the error.
    #[default]
    Abort,
    /// Log the error, keep it in the reader's failure list, and continue with the row.
    Skip,
}

/// Options for reading records from a worksheet.
#[derive(Clone, Debug, Default)]
pub struct ReadConfig {
    /// Number of rows before the title row (0 = first row holds the headers).
    pub title_row: usize,

    /// Number of rows after the title row to skip before the first record.
    pub skip: usize,

    /// Maximum number of records to read.
    pub rows_limit: Option<usize>,

    /// Handling of cells that fail to convert.
    pub conversion: ConversionPolicy,
}

impl ReadConfig {
    pub fn with_title_row(mut self, title_row: usize) -> Self {
        self.title_row = title_row;
        self
    }

    pub fn with_skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    pub fn with_rows_limit(mut self, rows_limit: usize) -> Self {
        self.rows_limit = Some(rows_limit);
        self
    }

    pub fn with_conversion(mut self, conversion: ConversionPolicy) -> Self {
        self.conversion = conversion;
        self
    }
}
