//! # Rusty Rows
//!
//! Maps the rows of a spreadsheet worksheet onto typed records.
//!
//! ## Features
//!
//! - **Header binding**: the title row is read once and fields bind to columns by
//!   header text, in whatever order the sheet lays them out
//! - **Field configuration**: per-field column name, default value, split delimiter,
//!   encoding, nil sentinel and required flag, from inline tags or programmatic overrides
//! - **Column codecs**: plain text conversion for numbers, booleans, dates and durations,
//!   or JSON payloads for structured fields
//! - **Shapes**: scalar, optional and repeated fields
//! - **Caching**: schemas are built once per record type and column bindings once per
//!   header layout
//!
//! ## Example
//!
//! ```
//! use rusty_rows::{Fields, ReadConfig, Record, RecordReader};
//! use std::io::Cursor;
//!
//! #[derive(Default)]
//! struct Player {
//!     name: String,
//!     level: u32,
//!     tags: Vec<String>,
//! }
//!
//! impl Record for Player {
//!     fn fields(fields: &mut Fields<Self>) {
//!         fields.scalar("Name", |r| &mut r.name).tag("req");
//!         fields.scalar("Level", |r| &mut r.level).tag("default(1)");
//!         fields.repeated("Tags", |r| &mut r.tags).tag("split(,)");
//!     }
//! }
//!
//! let sheet = r#"<sheetData>
//!     <row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>1</v></c><c r="C1" t="s"><v>2</v></c></row>
//!     <row r="2"><c r="A2" t="s"><v>3</v></c><c r="C2" t="inlineStr"><is><t>tank,healer</t></is></c></row>
//! </sheetData>"#;
//! let shared = vec!["Name".to_owned(), "Level".to_owned(), "Tags".to_owned(), "Ada".to_owned()];
//!
//! let mut reader = RecordReader::<Player, _, _>::new(Cursor::new(sheet.as_bytes()), &shared, ReadConfig::default())?;
//! let player = reader.read()?.unwrap();
//! assert_eq!(player.name, "Ada");
//! assert_eq!(player.level, 1);
//! assert_eq!(player.tags, vec!["tank", "healer"]);
//! # Ok::<(), rusty_rows::RustyRowsError>(())
//! ```
pub mod config;
pub mod error;
pub(crate) mod helpers;
pub mod reader;
pub mod scan;
pub mod schema;
pub mod sheet;

pub use config::ConversionPolicy;
pub use config::ReadConfig;
pub use error::RustyRowsError;
pub use reader::CellError;
pub use reader::RecordReader;
pub use scan::Encoding;
pub use scan::Scan;
pub use scan::ScanError;
pub use schema::BindingCache;
pub use schema::BindingError;
pub use schema::FieldBinding;
pub use schema::FieldConfig;
pub use schema::Fields;
pub use schema::Record;
pub use schema::Schema;
pub use schema::SchemaCache;
pub use sheet::HeaderTable;
pub use sheet::RowCursor;
pub use sheet::SharedStrings;
