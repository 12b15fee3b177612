//! SQLite connection backed by rusqlite.

use std::sync::Arc;

use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::ToSql;

use crate::db::value::{Binding, ColumnMeta, Row, StatementOutcome, Value};
use crate::db::{Connection, DbError};

pub struct SqliteConnection {
    conn: rusqlite::Connection,
}

impl SqliteConnection {
    /// Open a database file; `:memory:` opens a private in-memory database.
    pub fn open(path: &str) -> Result<Self, DbError> {
        if path == ":memory:" {
            return Self::open_in_memory();
        }
        Ok(Self {
            conn: rusqlite::Connection::open(path)?,
        })
    }

    pub fn open_in_memory() -> Result<Self, DbError> {
        Ok(Self {
            conn: rusqlite::Connection::open_in_memory()?,
        })
    }
}

impl Connection for SqliteConnection {
    fn begin_transaction(&mut self) -> Result<(), DbError> {
        self.conn.execute_batch("BEGIN")?;
        Ok(())
    }

    fn commit(&mut self) -> Result<(), DbError> {
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), DbError> {
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }

    fn in_transaction(&self) -> bool {
        !self.conn.is_autocommit()
    }

    fn run(&mut self, sql: &str, bindings: &[Binding]) -> Result<StatementOutcome, DbError> {
        let mut stmt = self.conn.prepare(sql)?;

        let names: Vec<String> = bindings.iter().map(|b| format!(":{}", b.name)).collect();
        let params: Vec<(&str, &dyn ToSql)> = names
            .iter()
            .zip(bindings)
            .map(|(name, binding)| (name.as_str(), &binding.value as &dyn ToSql))
            .collect();

        if stmt.column_count() == 0 {
            let affected = stmt.execute(params.as_slice())?;
            return Ok(StatementOutcome::Affected(affected));
        }

        let columns: Arc<[String]> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();
        let mut rows = stmt.query(params.as_slice())?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(width);
            for index in 0..width {
                values.push(Value::from(row.get_ref(index)?));
            }
            out.push(Row::new(columns.clone(), values));
        }
        Ok(StatementOutcome::Rows(out))
    }

    fn fetch_columns(&mut self, table: &str) -> Result<Vec<ColumnMeta>, DbError> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, pk FROM pragma_table_info(?1) ORDER BY cid")?;
        let columns = stmt
            .query_map([table], |row| {
                Ok(ColumnMeta {
                    name: row.get(0)?,
                    primary_key: row.get::<_, i64>(1)? > 0,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(columns)
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Borrowed(ValueRef::Null),
            Value::Integer(v) => ToSqlOutput::Borrowed(ValueRef::Integer(*v)),
            Value::Real(v) => ToSqlOutput::Borrowed(ValueRef::Real(*v)),
            Value::Text(text) => ToSqlOutput::Borrowed(ValueRef::Text(text.as_bytes())),
            Value::Blob(bytes) => ToSqlOutput::Borrowed(ValueRef::Blob(bytes)),
        })
    }
}

impl From<ValueRef<'_>> for Value {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(v) => Value::Integer(v),
            ValueRef::Real(v) => Value::Real(v),
            ValueRef::Text(text) => Value::Text(String::from_utf8_lossy(text).into_owned()),
            ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
        }
    }
}
