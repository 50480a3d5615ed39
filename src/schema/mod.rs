//! # Record Schemas
//!
//! A [`Record`] type declares its fields once; [`Schema::build`] merges the three
//! configuration sources of every field, highest precedence first:
//!
//! 1. the programmatic [`Record::field_configs`] entry for the field name,
//! 2. the field's inline tag,
//! 3. the field name as column name with no further options.
//!
//! The schema is then joined with a sheet's [`HeaderTable`](crate::sheet::HeaderTable)
//! into [`ColumnBindings`] that drive the per-cell conversion.
pub mod binding;
pub mod cache;
pub mod field;
pub mod tag;

use crate::scan::ScanError;
use std::collections::HashMap;
use thiserror::Error;

pub use binding::FieldBinding;
pub use cache::bind_columns;
pub use cache::BindingCache;
pub use cache::ColumnBindings;
pub use cache::SchemaCache;
pub use field::Field;
pub use field::FieldConfig;
pub use field::Fields;
pub use field::ShapeKind;

/// Errors joining a schema with a sheet.
#[derive(Error, Debug)]
pub enum BindingError {
    /// A required column is absent from the header row
    #[error("Column '{0}' is required but missing from the header row")]
    MissingRequiredColumn(String),

    /// A configured default value does not convert to its field
    #[error("Invalid default value '{value}' for field '{field}': {source}")]
    BadDefault {
        field: &'static str,
        value: String,
        #[source]
        source: ScanError,
    },
}

/// A type whose values are built from sheet rows.
pub trait Record: Default + 'static {
    /// Declares the fields in declaration order.
    fn fields(fields: &mut Fields<Self>);

    /// Per-field configuration keyed by field name, taking precedence over inline tags.
    fn field_configs() -> HashMap<&'static str, FieldConfig> {
        HashMap::new()
    }
}

/// The ordered field bindings of a record type.
pub struct Schema<R> {
    fields: Vec<FieldBinding<R>>,
}

impl<R: Record> Schema<R> {
    /// Resolves every declared, non-ignored field of `R`.
    pub fn build() -> Self {
        let configs = R::field_configs();
        let mut declared = Fields::new();
        R::fields(&mut declared);
        let fields = declared
            .into_vec()
            .into_iter()
            .enumerate()
            .filter_map(|(index, field)| {
                let config = match (configs.get(field.name), field.tag) {
                    (Some(config), _) => config.clone(),
                    (None, Some(tag)) => tag::parse_tag(tag),
                    (None, None) => FieldConfig::default(),
                };
                if config.ignore {
                    None
                } else {
                    Some(FieldBinding::freeze(index, field, config))
                }
            })
            .collect();
        Schema { fields }
    }
}

impl<R> Schema<R> {
    /// Bindings in declaration order
    pub fn fields(&self) -> &[FieldBinding<R>] {
        &self.fields
    }

    /// Binding of a field by its declared name
    pub fn field(&self, name: &str) -> Option<&FieldBinding<R>> {
        self.fields.iter().find(|binding| binding.field_name() == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<R> Clone for Schema<R> {
    fn clone(&self) -> Self {
        Schema {
            fields: self.fields.clone(),
        }
    }
}

impl<R> std::fmt::Debug for Schema<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema").field("fields", &self.fields).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::Encoding;

    #[derive(Default)]
    struct Player {
        name: String,
        age: u32,
        nick: Option<String>,
        tags: Vec<String>,
        secret: String,
        note: String,
    }

    impl Record for Player {
        fn fields(fields: &mut Fields<Self>) {
            fields.scalar("Name", |r| &mut r.name).tag("column(Player);req");
            fields.scalar("Age", |r| &mut r.age).tag("default(18)");
            fields.optional("Nick", |r| &mut r.nick);
            fields.repeated("Tags", |r| &mut r.tags).tag("split(,)");
            fields.scalar("Secret", |r| &mut r.secret).tag("-");
            fields.scalar("Note", |r| &mut r.note).tag("-");
        }

        fn field_configs() -> HashMap<&'static str, FieldConfig> {
            HashMap::from([
                ("Name", FieldConfig::column("Full Name").required()),
                ("Nick", FieldConfig::default().with_nil("-")),
                ("Note", FieldConfig::column("Remark").with_encoding(Encoding::Plain)),
                ("Tags", FieldConfig::ignored()),
            ])
        }
    }

    #[test]
    fn precedence_of_configuration_sources() {
        let schema = Schema::<Player>::build();
        let names = schema
            .fields()
            .iter()
            .map(|binding| (binding.field_index(), binding.field_name(), binding.column_name()))
            .collect::<Vec<_>>();
        assert_eq!(
            names,
            vec![(0, "Name", "Full Name"), (1, "Age", "Age"), (2, "Nick", "Nick"), (5, "Note", "Remark")]
        );

        let name = schema.field("Name").unwrap();
        assert!(name.is_required());

        let age = schema.field("Age").unwrap();
        assert_eq!(age.default_value(), "18");
        assert!(!age.is_required());

        let nick = schema.field("Nick").unwrap();
        assert_eq!(nick.nil_value(), "-");
        assert_eq!(nick.shape(), ShapeKind::Optional);

        assert!(schema.field("Tags").is_none());
        assert!(schema.field("Secret").is_none());
    }

    #[test]
    fn build_is_idempotent() {
        let first = Schema::<Player>::build();
        let second = Schema::<Player>::build();
        assert_eq!(format!("{:?}", first), format!("{:?}", second));
        assert_eq!(first.len(), 4);
    }

    #[derive(Default)]
    struct Plain {
        id: i64,
    }

    impl Record for Plain {
        fn fields(fields: &mut Fields<Self>) {
            fields.scalar("id", |r| &mut r.id);
        }
    }

    #[test]
    fn untagged_fields_bind_by_name() {
        let schema = Schema::<Plain>::build();
        let id = &schema.fields()[0];
        assert_eq!(id.column_name(), "id");
        assert_eq!(id.encoding(), Encoding::Plain);
        assert_eq!(id.split(), "");
        assert!(!id.is_required());
    }
}
