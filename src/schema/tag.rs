//! Inline field tags: `;`-separated `key` or `key(value)` parameters.
//!
//! ```text
//! column(Name);default(0);req
//! split(,);nil(NULL)
//! encoding(json)           encoding names are case-insensitive: json, JSON, plain
//! Age                      bare column name
//! -                        ignore the field
//! ```
//!
//! A recognized key without parentheses is that key with an empty value, so a bare
//! `req` marks the field required and a bare `column` keeps the field name.

use crate::scan::Encoding;
use crate::schema::field::FieldConfig;
use log::warn;
use regex::Regex;
use std::sync::LazyLock;

const TAG_SEPARATOR: char = ';';
const IGNORE_TAG: &str = "-";

const COLUMN_KEY: &str = "column";
const ENCODING_KEY: &str = "encoding";
const SPLIT_KEY: &str = "split";
const DEFAULT_KEY: &str = "default";
const NIL_KEY: &str = "nil";
const REQUIRED_KEY: &str = "req";

/// `key(value)` where the first `)` closes the parameter
static PARAMETER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^(]+)\(([^)]*)\)$").expect("Hardcode parameter pattern"));

/// Splits one parameter into key and value. Anything that is not a recognized
/// `key` or `key(value)` names the column.
fn parameter(text: &str) -> (&str, &str) {
    if is_key(text) {
        return (text, "");
    }
    if let Some(captures) = PARAMETER.captures(text) {
        if let (Some(key), Some(value)) = (captures.get(1), captures.get(2)) {
            if is_key(key.as_str()) {
                return (key.as_str(), value.as_str());
            }
        }
    }
    (COLUMN_KEY, text)
}

fn is_key(text: &str) -> bool {
    matches!(text, COLUMN_KEY | ENCODING_KEY | SPLIT_KEY | DEFAULT_KEY | NIL_KEY | REQUIRED_KEY)
}

/// Parses an inline tag into a field configuration.
pub fn parse_tag(tag: &str) -> FieldConfig {
    if tag == IGNORE_TAG {
        return FieldConfig::ignored();
    }
    let mut config = FieldConfig::default();
    for text in tag.split(TAG_SEPARATOR).filter(|text| !text.is_empty()) {
        match parameter(text) {
            (COLUMN_KEY, value) => config.column_name = value.to_owned(),
            (DEFAULT_KEY, value) => config.default_value = value.to_owned(),
            (SPLIT_KEY, value) => config.split = value.to_owned(),
            (NIL_KEY, value) => config.nil_value = value.to_owned(),
            (REQUIRED_KEY, _) => config.required = true,
            (ENCODING_KEY, value) => {
                config.encoding = Encoding::parse(value).unwrap_or_else(|| {
                    warn!("Unknown encoding '{}' in tag '{}', using plain", value, tag);
                    Encoding::Plain
                })
            }
            _ => (),
        }
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyed_parameters() {
        let config = parse_tag("column(Score);default(0);split(|);encoding(json);nil(NULL);req()");
        assert_eq!(
            config,
            FieldConfig {
                column_name: "Score".to_owned(),
                default_value: "0".to_owned(),
                split: "|".to_owned(),
                encoding: Encoding::Json,
                nil_value: "NULL".to_owned(),
                required: true,
                ignore: false,
            }
        );
    }

    #[test]
    fn bare_column_name() {
        assert_eq!(parse_tag("Age").column_name, "Age");
        assert_eq!(parse_tag("Age;default(1)"), FieldConfig::column("Age").with_default("1"));
    }

    #[test]
    fn unrecognized_or_partial_parameters_name_the_column() {
        assert_eq!(parse_tag("alias(x)").column_name, "alias(x)");
        assert_eq!(parse_tag("(x)").column_name, "(x)");
        assert_eq!(parse_tag("default(a)b").column_name, "default(a)b");
        assert_eq!(parse_tag("default(a))").column_name, "default(a))");
    }

    #[test]
    fn bare_required_flag() {
        let config = parse_tag("column(Id);req");
        assert!(config.required);
        assert_eq!(config.column_name, "Id");
    }

    #[test]
    fn bare_keys_take_an_empty_value() {
        let config = parse_tag("column;req");
        assert_eq!(config.column_name, "");
        assert!(config.required);
        assert_eq!(parse_tag("Age;split;default;nil"), FieldConfig::column("Age"));
        assert_eq!(parse_tag("encoding(json);encoding").encoding, Encoding::Plain);
        assert_eq!(parse_tag("columns").column_name, "columns");
    }

    #[test]
    fn encoding_names_ignore_case() {
        assert_eq!(parse_tag("encoding(JSON)").encoding, Encoding::Json);
        assert_eq!(parse_tag("encoding(Plain)").encoding, Encoding::Plain);
    }

    #[test]
    fn delimiter_values_are_kept_verbatim() {
        assert_eq!(parse_tag("split(,)").split, ",");
        assert_eq!(parse_tag("split(()").split, "(");
        assert_eq!(parse_tag("default()").default_value, "");
    }

    #[test]
    fn ignore_marker_and_empty_parameters() {
        assert!(parse_tag("-").ignore);
        assert!(!parse_tag("-x").ignore);
        assert_eq!(parse_tag(";;column(A);;"), FieldConfig::column("A"));
        assert_eq!(parse_tag(""), FieldConfig::default());
    }

    #[test]
    fn unknown_encoding_is_plain() {
        assert_eq!(parse_tag("encoding(xml)").encoding, Encoding::Plain);
    }
}
