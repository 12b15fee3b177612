//! Models and the fluent query builder.
//!
//! # Data Flow
//! ```text
//! Model impl (table / fields / primary key, or derived)
//!     → schema.rs (resolve once, cache on the Database handle)
//!     → query.rs (clause state machine, bind names, SQL text)
//!     → executor.rs (transaction per statement, fail-soft)
//! ```
//!
//! # Usage
//! ```ignore
//! struct Articles;
//! impl Model for Articles {
//!     const TABLE: &'static str = "articles";
//!     const PRIMARY_KEY: Option<&'static str> = Some("id");
//! }
//!
//! let rows = Articles::select(&db, ["*"])?
//!     .where_([("author", 1)])?
//!     .order_desc(["id"])?
//!     .get_all();
//! ```
//!
//! # Design Decisions
//! - Builder state lives in the `Query` value, one per chain, so chains on
//!   different threads or models never share state
//! - Usage errors are returned to the caller; store failures are logged and
//!   surface only as "nothing came back"

pub mod condition;
pub mod executor;
pub mod query;
pub mod schema;

use std::sync::Arc;

use crate::db::{Database, Value};

pub use condition::{Condition, DeleteTarget};
pub use query::{ClauseKind, NotExecuted, Query, QueryError};
pub use schema::{resolve_schema, ModelSchema, SchemaError};

/// A table-backed model.
///
/// Leave `TABLE` empty to use the type name, and `FIELDS` empty to read the
/// column list from the store.
pub trait Model: Sized + 'static {
    const TABLE: &'static str = "";
    const FIELDS: &'static [&'static str] = &[];
    const PRIMARY_KEY: Option<&'static str> = None;

    /// Name used when `TABLE` is empty.
    fn type_name() -> &'static str {
        schema::short_type_name::<Self>()
    }

    fn schema(db: &Database) -> Result<Arc<ModelSchema>, SchemaError> {
        resolve_schema::<Self>(db)
    }

    /// An empty query chain.
    fn query(db: &Database) -> Result<Query<Self>, QueryError> {
        Query::new(db)
    }

    fn select<I>(db: &Database, fields: I) -> Result<Query<Self>, QueryError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        Self::query(db)?.select(fields)
    }

    fn insert<I, K, V>(db: &Database, data: I) -> Result<bool, QueryError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self::query(db)?.insert(data)
    }

    fn update<I, K, V>(db: &Database, data: I) -> Result<Query<Self>, QueryError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self::query(db)?.update(data)
    }

    fn delete(db: &Database, target: impl Into<DeleteTarget>) -> Result<bool, QueryError> {
        Self::query(db)?.delete(target)
    }
}

/// Build a `Vec<(String, Value)>` from `field => value` pairs of mixed types.
///
/// ```ignore
/// Articles::insert(&db, fields! { "title" => "Hello", "views" => 0 })?;
/// ```
#[macro_export]
macro_rules! fields {
    () => {
        ::std::vec::Vec::<(::std::string::String, $crate::db::Value)>::new()
    };
    ($($field:expr => $value:expr),+ $(,)?) => {
        vec![$((::std::string::String::from($field), $crate::db::Value::from($value))),+]
    };
}
