use crate::scan::Encoding;
use crate::scan::ScanError;
use crate::schema::field::Field;
use crate::schema::field::FieldConfig;
use crate::schema::field::Shape;
use crate::schema::field::ShapeKind;
use log::trace;
use std::fmt::Debug;

/// Resolved configuration of one record field: which column feeds it and how its
/// text is converted.
pub struct FieldBinding<R> {
    field_index: usize,
    field_name: &'static str,
    column_name: String,
    default_value: String,
    split: String,
    encoding: Encoding,
    nil_value: String,
    required: bool,
    shape: Shape<R>,
}

impl<R> FieldBinding<R> {
    /// Freezes a field with its effective configuration. An empty column name
    /// falls back to the field name.
    pub(crate) fn freeze(field_index: usize, field: Field<R>, config: FieldConfig) -> Self {
        let column_name = if config.column_name.is_empty() {
            field.name.to_owned()
        } else {
            config.column_name
        };
        FieldBinding {
            field_index,
            field_name: field.name,
            column_name,
            default_value: config.default_value,
            split: config.split,
            encoding: config.encoding,
            nil_value: config.nil_value,
            required: config.required,
            shape: field.shape,
        }
    }

    /// Position of the field in declaration order
    pub fn field_index(&self) -> usize {
        self.field_index
    }

    pub fn field_name(&self) -> &'static str {
        self.field_name
    }

    pub fn column_name(&self) -> &str {
        &self.column_name
    }

    pub fn default_value(&self) -> &str {
        &self.default_value
    }

    pub fn split(&self) -> &str {
        &self.split
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn nil_value(&self) -> &str {
        &self.nil_value
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn shape(&self) -> ShapeKind {
        self.shape.kind()
    }

    /// Converts one cell's text into the bound field of `record`.
    ///
    /// Text equal to the nil value leaves the field untouched.
    pub fn scan(&self, record: &mut R, text: &str) -> Result<(), ScanError> {
        if text == self.nil_value {
            return Ok(());
        }
        trace!("Scan '{}' into field '{}'", text, self.field_name);
        match &self.shape {
            Shape::Repeated { elements, payload } => {
                if !self.split.is_empty() && !text.is_empty() {
                    let parts = text.split(self.split.as_str()).collect::<Vec<_>>();
                    elements(record, &parts)
                } else if self.encoding == Encoding::Json {
                    payload(record, text, self.encoding)
                } else {
                    Ok(())
                }
            }
            Shape::Optional(assign) | Shape::Scalar(assign) => assign(record, text, self.encoding),
        }
    }

    /// Converts the configured default value into the bound field.
    ///
    /// A failure is only reported when a default was actually configured.
    pub fn scan_default(&self, record: &mut R) -> Result<(), ScanError> {
        match self.scan(record, &self.default_value) {
            Err(error) if !self.default_value.is_empty() => Err(error),
            _ => Ok(()),
        }
    }
}

impl<R> Clone for FieldBinding<R> {
    fn clone(&self) -> Self {
        FieldBinding {
            field_index: self.field_index,
            field_name: self.field_name,
            column_name: self.column_name.to_owned(),
            default_value: self.default_value.to_owned(),
            split: self.split.to_owned(),
            encoding: self.encoding,
            nil_value: self.nil_value.to_owned(),
            required: self.required,
            shape: self.shape.clone(),
        }
    }
}

impl<R> Debug for FieldBinding<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldBinding")
            .field("field_index", &self.field_index)
            .field("field_name", &self.field_name)
            .field("column_name", &self.column_name)
            .field("default_value", &self.default_value)
            .field("split", &self.split)
            .field("encoding", &self.encoding)
            .field("nil_value", &self.nil_value)
            .field("required", &self.required)
            .field("shape", &self.shape.kind())
            .finish()
    }
}
