use thiserror::Error;

/// Main error type for the Rusty Rows crate.
/// Aggregates errors from the XML token stream, header resolution, schema binding and cell scanning.
#[derive(Error, Debug)]
pub enum RustyRowsError {
    #[error("{0}")]
    WithContextError(String),

    // Standard library errors
    #[error("{0}")]
    ParseIntError(#[from] std::num::ParseIntError),

    // Third-party library errors
    #[error("{0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("{0}")]
    XmlEncodingError(#[from] quick_xml::encoding::EncodingError),

    #[error("{0}")]
    XmlAttributeError(#[from] quick_xml::events::attributes::AttrError),

    // Helper module errors
    #[error("{0}")]
    XmlHelperError(#[from] crate::helpers::xml::XmlError),

    // Sheet module errors
    #[error("{0}")]
    ReferenceError(#[from] crate::sheet::reference::ReferenceError),

    #[error("{0}")]
    SheetError(#[from] crate::sheet::SheetError),

    // Schema module errors
    #[error("{0}")]
    BindingError(#[from] crate::schema::BindingError),

    #[error("{0}")]
    ScanError(#[from] crate::scan::ScanError),

    // Reader module errors
    #[error("{0}")]
    CellError(#[from] crate::reader::CellError),
}

pub(crate) trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, RustyRowsError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| RustyRowsError::WithContextError(format!("{}: {}", message, e)))
    }
}
