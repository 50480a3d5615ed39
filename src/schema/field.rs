use crate::scan::decode_json;
use crate::scan::Encoding;
use crate::scan::Scan;
use crate::scan::ScanError;
use serde::de::DeserializeOwned;
use std::any::type_name;
use std::sync::Arc;

pub(crate) type Assign<R> = Arc<dyn Fn(&mut R, &str, Encoding) -> Result<(), ScanError> + Send + Sync>;
pub(crate) type AssignParts<R> = Arc<dyn Fn(&mut R, &[&str]) -> Result<(), ScanError> + Send + Sync>;

/// Shape of a declared field, fixed when the field is declared.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ShapeKind {
    /// A plain value
    Scalar,
    /// An `Option` filled on the first successful conversion
    Optional,
    /// A `Vec` filled from split text or a JSON array
    Repeated,
}

/// Conversion handlers of a field, one per shape.
pub(crate) enum Shape<R> {
    Scalar(Assign<R>),
    Optional(Assign<R>),
    Repeated {
        elements: AssignParts<R>,
        payload: Assign<R>,
    },
}

impl<R> Shape<R> {
    pub(crate) fn kind(&self) -> ShapeKind {
        match self {
            Self::Scalar(_) => ShapeKind::Scalar,
            Self::Optional(_) => ShapeKind::Optional,
            Self::Repeated { .. } => ShapeKind::Repeated,
        }
    }
}

impl<R> Clone for Shape<R> {
    fn clone(&self) -> Self {
        match self {
            Self::Scalar(assign) => Self::Scalar(Arc::clone(assign)),
            Self::Optional(assign) => Self::Optional(Arc::clone(assign)),
            Self::Repeated { elements, payload } => Self::Repeated {
                elements: Arc::clone(elements),
                payload: Arc::clone(payload),
            },
        }
    }
}

fn assign<R, F>(handler: F) -> Assign<R>
where
    F: Fn(&mut R, &str, Encoding) -> Result<(), ScanError> + Send + Sync + 'static,
{
    Arc::new(handler)
}

fn assign_parts<R, F>(handler: F) -> AssignParts<R>
where
    F: Fn(&mut R, &[&str]) -> Result<(), ScanError> + Send + Sync + 'static,
{
    Arc::new(handler)
}

fn decode_scalar<T: Scan>(text: &str, encoding: Encoding) -> Result<T, ScanError> {
    match encoding {
        Encoding::Plain => T::scan(text),
        Encoding::Json => T::scan_structured(text),
    }
}

fn decode_payload<T: DeserializeOwned>(text: &str, encoding: Encoding) -> Result<T, ScanError> {
    match encoding {
        Encoding::Json => decode_json(text),
        Encoding::Plain => Err(ScanError::UnsupportedEncoding {
            target: type_name::<T>(),
            encoding,
        }),
    }
}

/// One declared field of a [`Record`](crate::schema::Record) type.
///
/// A field has a name (the default column name), an optional inline tag such as
/// `"column(Age);default(0)"`, and an accessor to the storage it fills.
pub struct Field<R> {
    pub(crate) name: &'static str,
    pub(crate) tag: Option<&'static str>,
    pub(crate) shape: Shape<R>,
}

impl<R> Field<R> {
    /// Attaches an inline configuration tag, see [`parse_tag`](crate::schema::tag::parse_tag).
    pub fn tag(&mut self, tag: &'static str) -> &mut Self {
        self.tag = Some(tag);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn shape(&self) -> ShapeKind {
        self.shape.kind()
    }
}

/// The declared fields of a record type, in declaration order.
///
/// ```ignore
/// fn fields(fields: &mut Fields<Self>) {
///     fields.scalar("Name", |r| &mut r.name).tag("req");
///     fields.repeated("Tags", |r| &mut r.tags).tag("split(,)");
/// }
/// ```
pub struct Fields<R> {
    fields: Vec<Field<R>>,
}

impl<R> Default for Fields<R> {
    fn default() -> Self {
        Fields { fields: Vec::new() }
    }
}

impl<R: 'static> Fields<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub(crate) fn into_vec(self) -> Vec<Field<R>> {
        self.fields
    }

    fn push(&mut self, name: &'static str, shape: Shape<R>) -> &mut Field<R> {
        self.fields.push(Field { name, tag: None, shape });
        let index = self.fields.len() - 1;
        &mut self.fields[index]
    }

    /// A value converted with [`Scan`], or its JSON form under `encoding(json)`.
    pub fn scalar<T: Scan + 'static>(&mut self, name: &'static str, slot: fn(&mut R) -> &mut T) -> &mut Field<R> {
        self.push(
            name,
            Shape::Scalar(assign(move |record: &mut R, text: &str, encoding: Encoding| {
                *slot(record) = decode_scalar::<T>(text, encoding)?;
                Ok(())
            })),
        )
    }

    /// A payload type only decodable from JSON; needs `encoding(json)`.
    pub fn structured<T: DeserializeOwned + 'static>(
        &mut self,
        name: &'static str,
        slot: fn(&mut R) -> &mut T,
    ) -> &mut Field<R> {
        self.push(
            name,
            Shape::Scalar(assign(move |record: &mut R, text: &str, encoding: Encoding| {
                *slot(record) = decode_payload::<T>(text, encoding)?;
                Ok(())
            })),
        )
    }

    /// An optional value, set to `Some` once a cell converts.
    ///
    /// Nested optional layers are materialized by the accessor itself, e.g.
    /// `|r| &mut r.contact.get_or_insert_with(Default::default).phone`; it is only
    /// called after the text has converted.
    pub fn optional<T: Scan + 'static>(
        &mut self,
        name: &'static str,
        slot: fn(&mut R) -> &mut Option<T>,
    ) -> &mut Field<R> {
        self.push(
            name,
            Shape::Optional(assign(move |record: &mut R, text: &str, encoding: Encoding| {
                let value = decode_scalar::<T>(text, encoding)?;
                *slot(record) = Some(value);
                Ok(())
            })),
        )
    }

    /// An optional payload type only decodable from JSON.
    pub fn optional_structured<T: DeserializeOwned + 'static>(
        &mut self,
        name: &'static str,
        slot: fn(&mut R) -> &mut Option<T>,
    ) -> &mut Field<R> {
        self.push(
            name,
            Shape::Optional(assign(move |record: &mut R, text: &str, encoding: Encoding| {
                let value = decode_payload::<T>(text, encoding)?;
                *slot(record) = Some(value);
                Ok(())
            })),
        )
    }

    /// A collection filled from `split(..)` text element-wise, or from a JSON array
    /// under `encoding(json)`. Without either the field is left as is.
    pub fn repeated<T: Scan + 'static>(
        &mut self,
        name: &'static str,
        slot: fn(&mut R) -> &mut Vec<T>,
    ) -> &mut Field<R> {
        let elements = assign_parts(move |record: &mut R, parts: &[&str]| {
            let values = parts.iter().map(|part| T::scan(part)).collect::<Result<Vec<T>, _>>()?;
            *slot(record) = values;
            Ok(())
        });
        let payload = assign(move |record: &mut R, text: &str, encoding: Encoding| {
            if encoding == Encoding::Json {
                let values = decode_json::<Vec<serde_json::Value>>(text)?
                    .iter()
                    .map(|value| T::scan_structured(&value.to_string()))
                    .collect::<Result<Vec<T>, _>>()?;
                *slot(record) = values;
            }
            Ok(())
        });
        self.push(name, Shape::Repeated { elements, payload })
    }
}

/// Programmatic configuration of one field, overriding its inline tag.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldConfig {
    /// Header text of the source column; empty means the field name
    pub column_name: String,
    /// Text converted when the row has no cell for the column
    pub default_value: String,
    /// Delimiter for collection fields
    pub split: String,
    /// Tag names match case-insensitively, see [`Encoding::parse`]
    pub encoding: Encoding,
    /// Cell text that leaves the field untouched
    pub nil_value: String,
    /// The column must be present in the header
    pub required: bool,
    /// Leave the field out of the schema
    pub ignore: bool,
}

impl FieldConfig {
    pub fn column(name: &str) -> Self {
        FieldConfig {
            column_name: name.to_owned(),
            ..Default::default()
        }
    }

    pub fn ignored() -> Self {
        FieldConfig {
            ignore: true,
            ..Default::default()
        }
    }

    pub fn with_default(mut self, value: &str) -> Self {
        self.default_value = value.to_owned();
        self
    }

    pub fn with_split(mut self, delimiter: &str) -> Self {
        self.split = delimiter.to_owned();
        self
    }

    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_nil(mut self, value: &str) -> Self {
        self.nil_value = value.to_owned();
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}
