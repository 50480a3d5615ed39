use std::collections::HashMap;

/// Lookup into a workbook's shared string table.
///
/// Worksheet cells typed `s` carry an index into this table instead of inline text.
/// Loading the table is left to the caller; any indexable collection of strings works.
pub trait SharedStrings {
    fn get(&self, index: usize) -> Option<&str>;
}

impl SharedStrings for [String] {
    fn get(&self, index: usize) -> Option<&str> {
        <[String]>::get(self, index).map(String::as_str)
    }
}

impl SharedStrings for Vec<String> {
    fn get(&self, index: usize) -> Option<&str> {
        self.as_slice().get(index).map(String::as_str)
    }
}

impl SharedStrings for [&str] {
    fn get(&self, index: usize) -> Option<&str> {
        <[&str]>::get(self, index).copied()
    }
}

/// Sparse tables, as produced when only the referenced indexes were loaded
impl SharedStrings for HashMap<usize, String> {
    fn get(&self, index: usize) -> Option<&str> {
        HashMap::get(self, &index).map(String::as_str)
    }
}

/// A worksheet without shared strings
impl SharedStrings for () {
    fn get(&self, _index: usize) -> Option<&str> {
        None
    }
}
