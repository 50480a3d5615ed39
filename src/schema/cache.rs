use crate::schema::BindingError;
use crate::schema::FieldBinding;
use crate::schema::Record;
use crate::schema::Schema;
use crate::sheet::HeaderTable;
use log::debug;
use std::any::Any;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

/// Column index to the bindings it feeds; one column may feed several fields.
pub struct ColumnBindings<R> {
    columns: HashMap<usize, Vec<FieldBinding<R>>>,
}

impl<R> ColumnBindings<R> {
    /// Bindings fed by a column, empty when the column is unbound
    pub fn get(&self, column: usize) -> &[FieldBinding<R>] {
        self.columns.get(&column).map(Vec::as_slice).unwrap_or_default()
    }

    /// Bound columns with their bindings
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[FieldBinding<R>])> + '_ {
        self.columns.iter().map(|(column, bindings)| (*column, bindings.as_slice()))
    }

    /// Number of bound columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<R> Clone for ColumnBindings<R> {
    fn clone(&self) -> Self {
        ColumnBindings {
            columns: self.columns.clone(),
        }
    }
}

/// Joins a schema with a header row.
///
/// Fields whose column is missing are skipped and keep their initial value, unless
/// the field is required.
pub fn bind_columns<R>(schema: &Schema<R>, header: &HeaderTable) -> Result<ColumnBindings<R>, BindingError> {
    let mut columns = HashMap::<usize, Vec<FieldBinding<R>>>::new();
    for binding in schema.fields() {
        match header.get(binding.column_name()) {
            Some(column) => columns.entry(column).or_default().push(binding.clone()),
            None if binding.is_required() => {
                return Err(BindingError::MissingRequiredColumn(binding.column_name().to_owned()));
            }
            None => debug!(
                "Column '{}' of field '{}' not found in header, skipped",
                binding.column_name(),
                binding.field_name()
            ),
        }
    }
    Ok(ColumnBindings { columns })
}

/// Schemas memoized by record type.
#[derive(Default)]
pub struct SchemaCache {
    schemas: Mutex<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the schema of `R`, building it on first use.
    pub fn get<R: Record>(&self) -> Arc<Schema<R>> {
        let mut schemas = self.schemas.lock().unwrap_or_else(PoisonError::into_inner);
        let cached = schemas
            .get(&TypeId::of::<R>())
            .cloned()
            .and_then(|schema| schema.downcast::<Schema<R>>().ok());
        if let Some(schema) = cached {
            return schema;
        }
        let schema = Arc::new(Schema::<R>::build());
        debug!("Built schema of {} with {} fields", std::any::type_name::<R>(), schema.len());
        schemas.insert(TypeId::of::<R>(), schema.clone());
        schema
    }

    pub fn len(&self) -> usize {
        self.schemas.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Column bindings of one record type, memoized per header layout.
///
/// Sheets whose headers are arranged differently get their own bindings.
pub struct BindingCache<R> {
    schema: Arc<Schema<R>>,
    tables: Mutex<HashMap<HeaderTable, Arc<ColumnBindings<R>>>>,
}

impl<R: Record> BindingCache<R> {
    pub fn new() -> Self {
        Self::with_schema(Arc::new(Schema::build()))
    }
}

impl<R: Record> Default for BindingCache<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> BindingCache<R> {
    /// Uses an already built schema, e.g. one shared through a [`SchemaCache`].
    pub fn with_schema(schema: Arc<Schema<R>>) -> Self {
        BindingCache {
            schema,
            tables: Mutex::new(HashMap::new()),
        }
    }

    pub fn schema(&self) -> &Arc<Schema<R>> {
        &self.schema
    }

    /// Returns the bindings for a header layout, building them on first use.
    pub fn resolve(&self, header: &HeaderTable) -> Result<Arc<ColumnBindings<R>>, BindingError> {
        let mut tables = self.tables.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(bindings) = tables.get(header) {
            return Ok(Arc::clone(bindings));
        }
        let bindings = Arc::new(bind_columns(&self.schema, header)?);
        debug!("Bound {} of {} header columns", bindings.len(), header.len());
        tables.insert(header.clone(), Arc::clone(&bindings));
        Ok(bindings)
    }

    /// Number of header layouts bound so far
    pub fn len(&self) -> usize {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Fields;

    #[derive(Debug, Default)]
    struct Score {
        name: String,
        score: i32,
        grade: i32,
        comment: String,
    }

    impl Record for Score {
        fn fields(fields: &mut Fields<Self>) {
            fields.scalar("Name", |r| &mut r.name).tag("req");
            fields.scalar("Score", |r| &mut r.score);
            fields.scalar("Grade", |r| &mut r.grade).tag("column(Score)");
            fields.scalar("Comment", |r| &mut r.comment);
        }
    }

    #[derive(Debug, Default)]
    struct Strict {
        id: i32,
    }

    impl Record for Strict {
        fn fields(fields: &mut Fields<Self>) {
            fields.scalar("Id", |r| &mut r.id).tag("column(ID);req");
        }
    }

    #[derive(Debug, Default)]
    struct Lenient {
        id: i32,
    }

    impl Record for Lenient {
        fn fields(fields: &mut Fields<Self>) {
            fields.scalar("Id", |r| &mut r.id).tag("column(ID)");
        }
    }

    fn header(columns: &[(&str, usize)]) -> HeaderTable {
        columns.iter().map(|(name, column)| (*name, *column)).collect()
    }

    #[test]
    fn one_column_feeds_several_fields() {
        let schema = Schema::<Score>::build();
        let bindings = bind_columns(&schema, &header(&[("Name", 0), ("Score", 2)])).unwrap();
        assert_eq!(bindings.len(), 2);
        assert_eq!(bindings.get(0).len(), 1);
        let fed = bindings.get(2).iter().map(FieldBinding::field_name).collect::<Vec<_>>();
        assert_eq!(fed, vec!["Score", "Grade"]);
        assert!(bindings.get(1).is_empty());

        let mut record = Score::default();
        for binding in bindings.get(2) {
            binding.scan(&mut record, "90").unwrap();
        }
        assert_eq!((record.score, record.grade), (90, 90));
        assert!(record.comment.is_empty());
    }

    #[test]
    fn missing_required_column() {
        let strict = bind_columns(&Schema::<Strict>::build(), &header(&[("Name", 0)]));
        assert!(matches!(strict, Err(BindingError::MissingRequiredColumn(column)) if column == "ID"));

        let lenient = bind_columns(&Schema::<Lenient>::build(), &header(&[("Name", 0)])).unwrap();
        assert!(lenient.is_empty());
    }

    #[test]
    fn schema_cache_memoizes_by_type() {
        let cache = SchemaCache::new();
        let first = cache.get::<Score>();
        let second = cache.get::<Score>();
        assert!(Arc::ptr_eq(&first, &second));
        cache.get::<Strict>();
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn binding_cache_keys_by_header_layout() {
        let cache = BindingCache::<Score>::new();
        let layout = header(&[("Name", 0), ("Score", 1)]);
        let first = cache.resolve(&layout).unwrap();
        let again = cache.resolve(&layout).unwrap();
        assert!(Arc::ptr_eq(&first, &again));

        let swapped = cache.resolve(&header(&[("Score", 0), ("Name", 1)])).unwrap();
        assert_eq!(swapped.get(1)[0].field_name(), "Name");
        assert_eq!(first.get(0)[0].field_name(), "Name");
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn binding_cache_reports_missing_required_column() {
        let cache = BindingCache::<Strict>::new();
        assert!(cache.resolve(&header(&[("Id", 0)])).is_err());
        assert!(cache.is_empty());
    }
}
