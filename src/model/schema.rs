//! Model schema resolution.
//!
//! A model either declares its table, fields and primary key, or they are
//! derived: the table from the type name, the fields (and primary key) from
//! the store's column metadata. Resolution happens once per model type; the
//! result is cached on the [`Database`] handle and shared read-only.

use std::any::TypeId;
use std::sync::Arc;

use thiserror::Error;

use crate::db::{Database, DbError};
use crate::model::Model;

/// Errors raised while resolving a model's schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("model table name not specified for {model}")]
    MissingTable { model: &'static str },

    #[error("model fields not specified for table '{table}'")]
    MissingFields { table: String },

    #[error("column introspection failed for table '{table}': {source}")]
    Introspection {
        table: String,
        #[source]
        source: DbError,
    },
}

/// Table name, field list and primary key of a model type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSchema {
    pub table: String,
    pub fields: Vec<String>,
    pub primary_key: Option<String>,
}

impl ModelSchema {
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|field| field == name)
    }
}

/// Unqualified type name, e.g. `Demo` for `app::models::Demo`.
pub(crate) fn short_type_name<M: 'static>() -> &'static str {
    let full = std::any::type_name::<M>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Resolve (or fetch the cached) schema for model type `M`.
pub fn resolve_schema<M: Model>(db: &Database) -> Result<Arc<ModelSchema>, SchemaError> {
    let key = TypeId::of::<M>();
    if let Some(schema) = db.schemas().get(&key) {
        return Ok(Arc::clone(schema.value()));
    }

    let table = if M::TABLE.is_empty() {
        M::type_name().to_string()
    } else {
        M::TABLE.to_string()
    };
    if table.is_empty() {
        return Err(SchemaError::MissingTable {
            model: std::any::type_name::<M>(),
        });
    }

    let mut introspected_key = None;
    let fields: Vec<String> = if M::FIELDS.is_empty() {
        let columns = db
            .fetch_columns(&table)
            .map_err(|source| SchemaError::Introspection {
                table: table.clone(),
                source,
            })?;
        tracing::debug!(table = %table, columns = columns.len(), "Introspected model fields");
        introspected_key = columns
            .iter()
            .find(|column| column.primary_key)
            .map(|column| column.name.clone());
        columns.into_iter().map(|column| column.name).collect()
    } else {
        M::FIELDS.iter().map(|field| field.to_string()).collect()
    };

    if fields.is_empty() {
        return Err(SchemaError::MissingFields { table });
    }

    let schema = Arc::new(ModelSchema {
        table,
        fields,
        primary_key: M::PRIMARY_KEY.map(str::to_string).or(introspected_key),
    });

    let cached = db.schemas().entry(key).or_insert(schema);
    Ok(Arc::clone(cached.value()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Binding;

    struct Declared;
    impl Model for Declared {
        const TABLE: &'static str = "articles";
        const FIELDS: &'static [&'static str] = &["id", "article_title", "content"];
        const PRIMARY_KEY: Option<&'static str> = Some("id");
    }

    struct Widgets;
    impl Model for Widgets {}

    struct Ghost;
    impl Model for Ghost {}

    fn database() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.run(
            "CREATE TABLE Widgets (code TEXT PRIMARY KEY, label TEXT, weight REAL)",
            &[] as &[Binding],
        )
        .unwrap();
        db
    }

    #[test]
    fn test_declared_schema_used_verbatim() {
        let db = database();
        let schema = resolve_schema::<Declared>(&db).unwrap();
        assert_eq!(schema.table, "articles");
        assert_eq!(schema.fields, vec!["id", "article_title", "content"]);
        assert_eq!(schema.primary_key.as_deref(), Some("id"));
    }

    #[test]
    fn test_introspected_schema() {
        let db = database();
        let schema = resolve_schema::<Widgets>(&db).unwrap();
        assert_eq!(schema.table, "Widgets");
        assert_eq!(schema.fields, vec!["code", "label", "weight"]);
        assert_eq!(schema.primary_key.as_deref(), Some("code"));
        assert!(schema.has_field("label"));
    }

    #[test]
    fn test_schema_is_cached() {
        let db = database();
        let first = resolve_schema::<Widgets>(&db).unwrap();
        let second = resolve_schema::<Widgets>(&db).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_missing_table_fails() {
        let db = database();
        let err = resolve_schema::<Ghost>(&db).unwrap_err();
        assert!(matches!(err, SchemaError::MissingFields { ref table } if table == "Ghost"));
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name::<Widgets>(), "Widgets");
        assert_eq!(short_type_name::<Vec<u8>>(), "Vec");
    }
}
