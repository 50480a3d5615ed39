//! Conversion between spreadsheet column letters ("A", "AB", ...) and zero-based column indexes.
//!
//! Column letters form a base-26 numeral without a zero digit: `A`=1 .. `Z`=26, `AA`=27.
//! Indexes handed out by this module are that value minus one.

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ReferenceError {
    #[error("Malformed column reference '{0}'")]
    MalformedReference(String),
}

/// Decodes column letters into a zero-based column index.
///
/// Only upper case letters are accepted. Empty input, any symbol outside `A-Z`
/// (lower case included), or a value that does not fit in `usize` is a malformed
/// reference.
pub fn column_to_index(letters: &str) -> Result<usize, ReferenceError> {
    let malformed = || ReferenceError::MalformedReference(letters.to_owned());
    let mut index = None::<usize>;
    for character in letters.chars() {
        let offset = match character {
            'A'..='Z' => character as usize - 'A' as usize,
            _ => return Err(malformed()),
        };
        // Each further letter shifts the index past every shorter column name
        index = Some(match index {
            None => offset,
            Some(index) => index
                .checked_add(1)
                .and_then(|index| index.checked_mul(26))
                .and_then(|index| index.checked_add(offset))
                .ok_or_else(malformed)?,
        });
    }
    index.ok_or_else(malformed)
}

/// Encodes a zero-based column index as column letters.
pub fn index_to_column(index: usize) -> String {
    let mut column = index;
    let mut letters = Vec::new();
    loop {
        letters.push(char::from(b'A' + (column % 26) as u8));
        if column < 26 {
            break;
        }
        column = column / 26 - 1;
    }
    letters.iter().rev().collect()
}

/// Decodes the column part of a cell reference such as `"AB12"`, ignoring the row digits.
pub fn reference_to_column(reference: &str) -> Result<usize, ReferenceError> {
    let letters = reference.trim_end_matches(|c: char| c.is_ascii_digit());
    column_to_index(letters).map_err(|_| ReferenceError::MalformedReference(reference.to_owned()))
}

/// Returns the Excel-style cell reference (e.g. "A1") for a zero-based row and column.
pub fn index_to_reference(row: usize, col: usize) -> String {
    format!("{}{}", index_to_column(col), row + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn decode_single_and_multi_letter_columns() {
        assert_eq!(column_to_index("A"), Ok(0));
        assert_eq!(column_to_index("Z"), Ok(25));
        assert_eq!(column_to_index("AA"), Ok(26));
        assert_eq!(column_to_index("AZ"), Ok(51));
        assert_eq!(column_to_index("BA"), Ok(52));
        assert_eq!(column_to_index("ZZ"), Ok(701));
        assert_eq!(column_to_index("AAA"), Ok(702));
        assert_eq!(column_to_index("XFD"), Ok(16383));
    }

    #[test]
    fn decode_rejects_malformed_letters() {
        assert_eq!(column_to_index(""), Err(ReferenceError::MalformedReference("".to_owned())));
        assert_eq!(column_to_index("A1"), Err(ReferenceError::MalformedReference("A1".to_owned())));
        assert_eq!(column_to_index("Ä"), Err(ReferenceError::MalformedReference("Ä".to_owned())));
        assert!(column_to_index(&"Z".repeat(64)).is_err());
        assert_eq!(column_to_index("ab"), Err(ReferenceError::MalformedReference("ab".to_owned())));
        assert_eq!(reference_to_column("b2"), Err(ReferenceError::MalformedReference("b2".to_owned())));
    }

    #[test]
    fn reference_strips_row_digits() {
        assert_eq!(reference_to_column("B2"), Ok(1));
        assert_eq!(reference_to_column("AB123"), Ok(27));
        assert_eq!(reference_to_column("12"), Err(ReferenceError::MalformedReference("12".to_owned())));
        assert_eq!(reference_to_column("B-2"), Err(ReferenceError::MalformedReference("B-2".to_owned())));
    }

    #[test]
    fn encode_indexes() {
        assert_eq!(index_to_column(0), "A");
        assert_eq!(index_to_column(25), "Z");
        assert_eq!(index_to_column(26), "AA");
        assert_eq!(index_to_column(18277), "ZZZ");
        assert_eq!(index_to_reference(1, 27), "AB2");
    }

    #[test]
    fn encode_largest_index() {
        let letters = index_to_column(usize::MAX);
        assert!(!letters.is_empty());
        assert!(letters.bytes().all(|b| b.is_ascii_uppercase()));
        assert_eq!(column_to_index(&letters), Ok(usize::MAX));
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(index in 0usize..18278) {
            prop_assert_eq!(column_to_index(&index_to_column(index)), Ok(index));
        }
    }
}
