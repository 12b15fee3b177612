//! Data store access.
//!
//! # Data Flow
//! ```text
//! model::Query (sql text + bindings)
//!     → model::executor (transaction per statement)
//!     → Database (process-wide handle, serialises access)
//!     → Connection impl (sqlite.rs)
//!     → StatementOutcome (rows or affected count)
//! ```
//!
//! # Design Decisions
//! - One `Database` per process, created at startup and passed explicitly
//! - The connection sits behind a mutex; statements are synchronous
//! - `Connection` is the seam tests replace with a recording fake

pub mod sqlite;
pub mod value;

use std::any::TypeId;
use std::fmt;
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use thiserror::Error;

use crate::config::DatabaseConfig;
use crate::model::ModelSchema;

pub use sqlite::SqliteConnection;
pub use value::{Binding, ColumnMeta, Row, StatementOutcome, Value};

/// Errors raised by the data store.
#[derive(Debug, Error)]
pub enum DbError {
    /// The configured driver has no implementation.
    #[error("unsupported database driver '{0}'")]
    UnsupportedDriver(String),

    /// SQLite rejected an operation.
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A previous holder of the connection panicked.
    #[error("database connection lock poisoned")]
    Poisoned,

    /// Failure reported by a non-SQLite connection.
    #[error("statement failed: {0}")]
    Statement(String),
}

/// The narrow interface the query executor and schema resolution need.
pub trait Connection: Send {
    fn begin_transaction(&mut self) -> Result<(), DbError>;

    fn commit(&mut self) -> Result<(), DbError>;

    fn rollback(&mut self) -> Result<(), DbError>;

    fn in_transaction(&self) -> bool;

    /// Prepare `sql`, bind every value by its `:name`, and execute.
    fn run(&mut self, sql: &str, bindings: &[Binding]) -> Result<StatementOutcome, DbError>;

    /// Column list of `table`, in declaration order.
    fn fetch_columns(&mut self, table: &str) -> Result<Vec<ColumnMeta>, DbError>;
}

/// Shared handle to the process-wide connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Box<dyn Connection>>>,
    schemas: Arc<DashMap<TypeId, Arc<ModelSchema>>>,
}

impl Database {
    pub fn new(conn: impl Connection + 'static) -> Self {
        Self {
            conn: Arc::new(Mutex::new(Box::new(conn))),
            schemas: Arc::new(DashMap::new()),
        }
    }

    /// Open the database described by the configuration.
    pub fn open(config: &DatabaseConfig) -> Result<Self, DbError> {
        match config.driver.as_str() {
            "sqlite" => {
                let conn = SqliteConnection::open(&config.path)?;
                tracing::info!(driver = "sqlite", path = %config.path, "Database connected");
                Ok(Self::new(conn))
            }
            other => Err(DbError::UnsupportedDriver(other.to_string())),
        }
    }

    /// A private in-memory SQLite database.
    pub fn open_in_memory() -> Result<Self, DbError> {
        Ok(Self::new(SqliteConnection::open_in_memory()?))
    }

    /// Run `f` with exclusive access to the connection.
    pub fn with_connection<T>(
        &self,
        f: impl FnOnce(&mut dyn Connection) -> T,
    ) -> Result<T, DbError> {
        let mut guard = self.conn.lock().map_err(|_| DbError::Poisoned)?;
        Ok(f(guard.as_mut()))
    }

    /// Run a statement outside the query builder, without a transaction.
    ///
    /// Used for schema setup and seeding.
    pub fn run(&self, sql: &str, bindings: &[Binding]) -> Result<StatementOutcome, DbError> {
        self.with_connection(|conn| conn.run(sql, bindings))?
    }

    pub fn fetch_columns(&self, table: &str) -> Result<Vec<ColumnMeta>, DbError> {
        self.with_connection(|conn| conn.fetch_columns(table))?
    }

    pub(crate) fn schemas(&self) -> &DashMap<TypeId, Arc<ModelSchema>> {
        &self.schemas
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("cached_schemas", &self.schemas.len())
            .finish()
    }
}
