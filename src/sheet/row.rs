use crate::error::RustyRowsError;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::xml::XmlReader;
use crate::helpers::xml::XmlTextContextHelper;
use crate::match_xml_events;
use crate::sheet::reference::reference_to_column;
use crate::sheet::shared::SharedStrings;
use crate::sheet::SheetError;
use quick_xml::events::Event;
use quick_xml::name::QName;
use std::io::BufRead;

// XML tag names for parsing worksheet parts
const TAG_ROW: QName = QName(b"row");                 // Row in worksheet
const TAG_CELL: QName = QName(b"c");                  // Cell in worksheet
const TAG_INLINE_STRING: QName = QName(b"is");        // Inline string value
const TAG_VALUE: QName = QName(b"v");                 // Cell value content
const TAG_PHONETIC_TEXT: QName = QName(b"rPh");       // Phonetic text for Asian languages
const TAG_TEXT: QName = QName(b"t");                  // Text content within strings

/// How the text of a cell is stored.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub(crate) enum CellType {
    /// Raw `<v>` content: numbers, booleans, dates, errors
    #[default]
    Value,
    /// Inline string values
    InlineString,
    /// Shared string table references
    SharedString,
}

impl CellType {
    fn parse(marker: Option<&str>) -> Self {
        match marker {
            Some("s") => Self::SharedString,
            Some("inlineStr") | Some("str") => Self::InlineString,
            _ => Self::Value,
        }
    }
}

/// One cell of a row with its text already resolved.
#[derive(Clone, Debug, PartialEq)]
pub struct RowCell {
    /// Column index (0-based)
    pub column: usize,
    /// Cell text, shared strings resolved
    pub text: String,
}

/// One `<row>` element of a worksheet.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Row {
    /// Row index (0-based), from the `r` attribute when present
    pub index: usize,
    /// Cells carrying a value, in document order
    pub cells: Vec<RowCell>,
}

/// Walks the rows of a worksheet XML part, one `<row>` element at a time.
pub struct RowCursor<'s, B: BufRead, S: SharedStrings + ?Sized> {
    reader: XmlReader<B>,
    shared_strings: &'s S,
    row_count: usize,
}

impl<'s, B: BufRead, S: SharedStrings + ?Sized> RowCursor<'s, B, S> {
    /// Creates a cursor over a worksheet part, resolving `s` cells through `shared_strings`.
    pub fn new(source: B, shared_strings: &'s S) -> Self {
        RowCursor {
            reader: XmlReader::new(source),
            shared_strings,
            row_count: 0,
        }
    }

    /// Number of complete rows consumed so far
    pub fn rows_read(&self) -> usize {
        self.row_count
    }

    /// Reads the next row, or `None` once the stream has no further row boundary.
    pub fn next_row(&mut self) -> Result<Option<Row>, RustyRowsError> {
        let mut row = Row {
            index: self.row_count,
            cells: Vec::new(),
        };
        let mut col_count = 0usize;
        let mut cell = None::<(usize, CellType)>;
        let mut value = None::<String>;
        match_xml_events!(self.reader => {
            Event::Start(event) if event.name() == TAG_ROW => {
                row.index = match event.get_attribute_value("r")? {
                    Some(number) => number.trim().parse::<usize>()?.saturating_sub(1),
                    None => self.row_count,
                };
                row.cells.clear();
                col_count = 0;
            }
            Event::End(event) if event.name() == TAG_ROW => {
                self.row_count += 1;
                return Ok(Some(row));
            }
            Event::Start(event) if event.name() == TAG_CELL => {
                let column = match event.get_attribute_value("r")? {
                    Some(reference) => reference_to_column(&reference)?,
                    None => col_count,
                };
                let kind = CellType::parse(event.get_attribute_value("t")?.as_deref());
                col_count = column + 1;
                cell = Some((column, kind));
                value = None;
            }
            Event::Start(event) if cell.is_some() && event.name() == TAG_INLINE_STRING => {
                value = Some(read_string_value(&mut self.reader, TAG_INLINE_STRING, false)?);
            }
            Event::Start(event) if cell.is_some() && event.name() == TAG_VALUE => {
                value = Some(read_string_value(&mut self.reader, TAG_VALUE, true)?);
            }
            Event::End(event) if event.name() == TAG_CELL => {
                if let Some(((column, kind), text)) = cell.take().zip(value.take()) {
                    let text = resolve_text(self.shared_strings, kind, text)?;
                    row.cells.push(RowCell { column, text });
                }
            }
        });
        Ok(None)
    }
}

/// Resolves the stored text of a cell, following shared string indexes.
fn resolve_text<S: SharedStrings + ?Sized>(
    shared_strings: &S,
    kind: CellType,
    text: String,
) -> Result<String, SheetError> {
    match kind {
        CellType::SharedString => {
            let index = text
                .trim()
                .parse::<usize>()
                .map_err(|_| SheetError::InvalidSharedStringIndex(text.to_owned()))?;
            shared_strings
                .get(index)
                .map(str::to_owned)
                .ok_or(SheetError::MissingSharedString(index))
        }
        CellType::Value | CellType::InlineString => Ok(text),
    }
}

/// Reads string value from XML content, handling text and CDATA sections
///
/// Skips phonetic text annotations. When `is_text_content` is false only text inside
/// `<t>` elements is collected, as in inline and rich strings.
fn read_string_value<B: BufRead>(
    reader: &mut XmlReader<B>,
    end_tag: QName,
    is_text_content: bool,
) -> Result<String, RustyRowsError> {
    let mut is_phonetic_text = false;
    let mut is_text = is_text_content;
    let mut text = String::new();
    match_xml_events!(reader => {
        Event::End(event) if event.name() == end_tag => break,
        Event::Start(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = true,
        Event::End(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = false,
        Event::Start(event) if !is_phonetic_text && event.name() == TAG_TEXT => is_text = true,
        Event::End(event) if is_text && event.name() == TAG_TEXT => is_text = false,
        Event::Text(event) if is_text => text.push_str(&event.xml_content()?),
        Event::CData(event) if is_text => text.push_str(&event.xml_content()?),
        Event::GeneralRef(event) if is_text => text.push_bytes_ref(&event)?,
    });
    Ok(text)
}
