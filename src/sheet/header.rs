use crate::error::RustyRowsError;
use crate::sheet::row::Row;
use crate::sheet::row::RowCursor;
use crate::sheet::shared::SharedStrings;
use crate::sheet::SheetError;
use log::debug;
use log::warn;
use std::collections::BTreeMap;
use std::io::BufRead;

/// Header text to zero-based column index, built from one title row.
///
/// Header text is unique: when the same text appears in several columns the
/// right-most one wins. Empty header cells are not recorded.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct HeaderTable {
    columns: BTreeMap<String, usize>,
}

impl HeaderTable {
    /// Builds the table from an already resolved title row.
    pub fn from_row(row: &Row) -> Self {
        let mut columns = BTreeMap::new();
        for cell in &row.cells {
            if cell.text.is_empty() {
                continue;
            }
            if let Some(previous) = columns.insert(cell.text.to_owned(), cell.column) {
                warn!(
                    "Duplicate header '{}' in row {}: column {} replaces column {}",
                    cell.text,
                    row.index + 1,
                    cell.column,
                    previous
                );
            }
        }
        HeaderTable { columns }
    }

    /// Column index of a header, if present
    pub fn get(&self, name: &str) -> Option<usize> {
        self.columns.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Headers in text order with their column indexes
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.columns.iter().map(|(name, column)| (name.as_str(), *column))
    }
}

impl<K: Into<String>> FromIterator<(K, usize)> for HeaderTable {
    fn from_iter<I: IntoIterator<Item = (K, usize)>>(iter: I) -> Self {
        HeaderTable {
            columns: iter.into_iter().map(|(name, column)| (name.into(), column)).collect(),
        }
    }
}

/// Reads the next row of the cursor as the header row.
///
/// Fails with [`SheetError::NoHeaderRow`] when the stream ends before a row is complete.
pub fn resolve_header<B: BufRead, S: SharedStrings + ?Sized>(
    cursor: &mut RowCursor<'_, B, S>,
) -> Result<HeaderTable, RustyRowsError> {
    let row = cursor.next_row()?.ok_or(SheetError::NoHeaderRow)?;
    let header = HeaderTable::from_row(&row);
    debug!("Resolved {} header columns from row {}", header.len(), row.index + 1);
    Ok(header)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn resolve(xml: &str, shared: &[String]) -> Result<HeaderTable, RustyRowsError> {
        let mut cursor = RowCursor::new(Cursor::new(xml.as_bytes()), shared);
        resolve_header(&mut cursor)
    }

    #[test]
    fn direct_and_shared_header_text() {
        let shared = vec!["Score".to_owned()];
        let header = resolve(
            r#"<sheetData><row r="1">
                <c r="A1" t="inlineStr"><is><t>Name</t></is></c>
                <c r="B1" t="str"><v>Age</v></c>
                <c r="C1" t="s"><v>0</v></c>
            </row></sheetData>"#,
            &shared,
        )
        .unwrap();

        assert_eq!(header, HeaderTable::from_iter([("Name", 0), ("Age", 1), ("Score", 2)]));
        assert_eq!(header.get("Score"), Some(2));
        assert_eq!(header.get("Missing"), None);
    }

    #[test]
    fn duplicate_header_last_column_wins() {
        let header = resolve(
            r#"<row><c r="A1" t="str"><v>Id</v></c><c r="D1" t="str"><v>Id</v></c></row>"#,
            &[],
        )
        .unwrap();
        assert_eq!(header.len(), 1);
        assert_eq!(header.get("Id"), Some(3));
    }

    #[test]
    fn empty_header_cells_are_skipped() {
        let header = resolve(r#"<row><c r="A1"><v></v></c><c r="B1"><v>7</v></c></row>"#, &[]).unwrap();
        assert_eq!(header.iter().collect::<Vec<_>>(), vec![("7", 1)]);
    }

    #[test]
    fn no_header_row() {
        let result = resolve("<worksheet><sheetData/></worksheet>", &[]);
        assert!(matches!(result, Err(RustyRowsError::SheetError(SheetError::NoHeaderRow))));
    }
}
