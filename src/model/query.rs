//! Fluent query builder.
//!
//! # States
//! ```text
//! EMPTY → SELECT | INSERT | UPDATE | DELETE
//!       → [WHERE]* → [GROUP BY] → [ORDER BY] → [LIMIT]
//!       → EXECUTED (state reset to EMPTY)
//! ```
//!
//! # Transition Rules
//! - INSERT, UPDATE, DELETE and SELECT must be the first clause
//! - INSERT and DELETE execute immediately
//! - UPDATE executes only through `set()` and only after a WHERE
//! - WHERE follows a statement or another WHERE; a repeated call is joined
//!   with AND or OR depending on the method used
//! - GROUP BY, ORDER BY and LIMIT need a SELECT and appear at most once,
//!   in that order
//!
//! Every builder method that can fail returns the usage error to its caller
//! and marks the chain as failed, so nothing partial reaches the store.
//!
//! # Auto-flush
//! A chain that holds an unexecuted statement and never hit a usage error is
//! executed when it is dropped. Dropping a chain built by `select()` without
//! calling `get()`/`get_all()` therefore still runs the query.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use thiserror::Error;

use crate::db::{Binding, Database, Row, Value};
use crate::model::condition::{Condition, DeleteTarget};
use crate::model::executor;
use crate::model::schema::{ModelSchema, SchemaError};
use crate::model::Model;

/// The category of the last applied builder operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClauseKind {
    None,
    Select,
    Insert,
    Update,
    Delete,
    Where,
    Group,
    Order,
    Limit,
}

impl ClauseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClauseKind::None => "nothing",
            ClauseKind::Select => "SELECT",
            ClauseKind::Insert => "INSERT",
            ClauseKind::Update => "UPDATE",
            ClauseKind::Delete => "DELETE",
            ClauseKind::Where => "WHERE",
            ClauseKind::Group => "GROUP BY",
            ClauseKind::Order => "ORDER BY",
            ClauseKind::Limit => "LIMIT",
        }
    }
}

impl fmt::Display for ClauseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builder usage errors.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("{clause} cannot be used after {previous}")]
    OutOfOrder {
        clause: ClauseKind,
        previous: ClauseKind,
    },

    #[error("{clause} requires a SELECT, UPDATE or DELETE first")]
    NoStatement { clause: ClauseKind },

    #[error("{clause} can only be used with SELECT")]
    RequiresSelect { clause: ClauseKind },

    #[error("cannot {operation} empty data")]
    EmptyData { operation: &'static str },

    #[error("WHERE condition cannot be empty")]
    EmptyCondition,

    #[error("{clause} requires at least one column")]
    EmptyColumns { clause: ClauseKind },

    #[error("LIMIT cannot be empty")]
    EmptyLimit,

    #[error("primary key is not set for table '{table}'")]
    MissingPrimaryKey { table: String },

    #[error("invalid column name '{0}'")]
    InvalidColumn(String),

    #[error("UPDATE requires a WHERE clause before set()")]
    UnfilteredUpdate,

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Returned by a terminal call when no statement was executed: the chain
/// already ran, was never started, or the store rejected the statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("query was not executed")]
pub struct NotExecuted;

/// One query chain against model `M`.
pub struct Query<M: Model> {
    db: Database,
    schema: Arc<ModelSchema>,
    sql: String,
    bindings: Vec<Binding>,
    counters: HashMap<String, u32>,
    statement: ClauseKind,
    last: ClauseKind,
    filtered: bool,
    executed: bool,
    failed: bool,
    _model: PhantomData<fn() -> M>,
}

impl<M: Model> Query<M> {
    /// Start an empty chain, resolving the model schema if needed.
    pub fn new(db: &Database) -> Result<Self, QueryError> {
        let schema = M::schema(db)?;
        Ok(Self {
            db: db.clone(),
            schema,
            sql: String::new(),
            bindings: Vec::new(),
            counters: HashMap::new(),
            statement: ClauseKind::None,
            last: ClauseKind::None,
            filtered: false,
            executed: false,
            failed: false,
            _model: PhantomData,
        })
    }

    /// SQL text built so far.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Bound values, in binding order.
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn last_clause(&self) -> ClauseKind {
        self.last
    }

    /// True once a terminal call ran the statement successfully.
    pub fn is_executed(&self) -> bool {
        self.executed
    }

    pub fn schema(&self) -> &ModelSchema {
        &self.schema
    }

    // --- Statements ---

    /// `SELECT <fields> FROM <table>`.
    pub fn select<I>(mut self, fields: I) -> Result<Self, QueryError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.require_first(ClauseKind::Select)?;

        let fields: Vec<String> = fields
            .into_iter()
            .map(|field| field.as_ref().trim().to_string())
            .filter(|field| !field.is_empty())
            .collect();
        if fields.is_empty() {
            return Err(self.fail(QueryError::EmptyColumns {
                clause: ClauseKind::Select,
            }));
        }

        self.sql = format!("SELECT {} FROM {}", fields.join(","), self.schema.table);
        self.begin(ClauseKind::Select);
        Ok(self)
    }

    /// `INSERT INTO <table> (...) VALUES (...)`, executed immediately.
    pub fn insert<I, K, V>(mut self, data: I) -> Result<bool, QueryError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let data = collect_pairs(data);
        if data.is_empty() {
            return Err(self.fail(QueryError::EmptyData {
                operation: "insert",
            }));
        }
        self.require_first(ClauseKind::Insert)?;
        self.check_columns(&data)?;

        let mut columns = Vec::with_capacity(data.len());
        let mut placeholders = Vec::with_capacity(data.len());
        for (field, value) in data {
            placeholders.push(format!(":{}", self.bind(&field, value)));
            columns.push(field);
        }

        self.sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.schema.table,
            columns.join(","),
            placeholders.join(",")
        );
        self.begin(ClauseKind::Insert);
        Ok(self.run().is_some())
    }

    /// `UPDATE <table> SET ...`; needs a WHERE and `set()` to execute.
    pub fn update<I, K, V>(mut self, data: I) -> Result<Self, QueryError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let data = collect_pairs(data);
        if data.is_empty() {
            return Err(self.fail(QueryError::EmptyData {
                operation: "update",
            }));
        }
        self.require_first(ClauseKind::Update)?;
        self.check_columns(&data)?;

        let assignments: Vec<String> = data
            .into_iter()
            .map(|(field, value)| {
                let name = self.bind(&field, value);
                format!("{field} = :{name}")
            })
            .collect();

        self.sql = format!("UPDATE {} SET {}", self.schema.table, assignments.join(", "));
        self.begin(ClauseKind::Update);
        Ok(self)
    }

    /// `DELETE FROM <table> WHERE ...`, executed immediately.
    ///
    /// A bare key value deletes by primary key; `true` deletes every row.
    pub fn delete(mut self, target: impl Into<DeleteTarget>) -> Result<bool, QueryError> {
        let condition = match target.into() {
            DeleteTarget::Literal(value) => Condition::Literal(value),
            DeleteTarget::Fields(fields) if fields.is_empty() => {
                return Err(self.fail(QueryError::EmptyCondition));
            }
            DeleteTarget::Fields(fields) => Condition::Fields(fields),
            DeleteTarget::Key(value) => match self.schema.primary_key.clone() {
                Some(key) => Condition::Fields(vec![(key, value)]),
                None => {
                    let table = self.schema.table.clone();
                    return Err(self.fail(QueryError::MissingPrimaryKey { table }));
                }
            },
        };
        self.require_first(ClauseKind::Delete)?;

        self.sql = format!("DELETE FROM {}", self.schema.table);
        self.begin(ClauseKind::Delete);
        let mut query = self.push_where(condition, "AND")?;
        Ok(query.run().is_some())
    }

    // --- Filters ---

    /// Same as [`where_and`](Self::where_and).
    pub fn where_(self, condition: impl Into<Condition>) -> Result<Self, QueryError> {
        self.where_and(condition)
    }

    /// Fields joined with AND; joined to a previous WHERE with AND.
    pub fn where_and(self, condition: impl Into<Condition>) -> Result<Self, QueryError> {
        self.push_where(condition.into(), "AND")
    }

    /// Fields joined with OR; joined to a previous WHERE with OR.
    pub fn where_or(self, condition: impl Into<Condition>) -> Result<Self, QueryError> {
        self.push_where(condition.into(), "OR")
    }

    fn push_where(mut self, condition: Condition, joiner: &str) -> Result<Self, QueryError> {
        if condition.is_empty() {
            return Err(self.fail(QueryError::EmptyCondition));
        }
        self.require_after(
            ClauseKind::Where,
            &[
                ClauseKind::Select,
                ClauseKind::Update,
                ClauseKind::Delete,
                ClauseKind::Where,
            ],
        )?;

        let predicate = match condition {
            Condition::Literal(true) => "1".to_string(),
            Condition::Literal(false) => "0".to_string(),
            Condition::Fields(fields) => {
                let names: Vec<String> = fields.iter().map(|(field, _)| field.clone()).collect();
                self.check_names(&names)?;
                fields
                    .into_iter()
                    .map(|(field, value)| {
                        let name = self.bind(&field, value);
                        format!("{field} = :{name}")
                    })
                    .collect::<Vec<_>>()
                    .join(&format!(" {joiner} "))
            }
        };

        if self.last == ClauseKind::Where {
            self.sql.push_str(&format!(" {joiner} {predicate}"));
        } else {
            self.sql.push_str(&format!(" WHERE {predicate}"));
        }
        self.last = ClauseKind::Where;
        self.filtered = true;
        Ok(self)
    }

    // --- Modifiers ---

    /// `GROUP BY <columns>`.
    pub fn group_by<I>(mut self, columns: I) -> Result<Self, QueryError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.require_select(ClauseKind::Group, &[ClauseKind::Select, ClauseKind::Where])?;
        let columns = self.column_list(ClauseKind::Group, columns)?;
        self.sql.push_str(&format!(" GROUP BY {columns}"));
        self.last = ClauseKind::Group;
        Ok(self)
    }

    /// `ORDER BY <columns> ASC`.
    pub fn order_asc<I>(self, columns: I) -> Result<Self, QueryError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.order(columns, "ASC")
    }

    /// `ORDER BY <columns> DESC`.
    pub fn order_desc<I>(self, columns: I) -> Result<Self, QueryError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.order(columns, "DESC")
    }

    fn order<I>(mut self, columns: I, direction: &str) -> Result<Self, QueryError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.require_select(
            ClauseKind::Order,
            &[ClauseKind::Select, ClauseKind::Where, ClauseKind::Group],
        )?;
        let columns = self.column_list(ClauseKind::Order, columns)?;
        self.sql.push_str(&format!(" ORDER BY {columns} {direction}"));
        self.last = ClauseKind::Order;
        Ok(self)
    }

    /// `LIMIT <offset>` or `LIMIT <offset>, <length>`.
    ///
    /// With no length the single number is the row count.
    pub fn limit(mut self, offset: u64, length: Option<u64>) -> Result<Self, QueryError> {
        let length = length.filter(|length| *length > 0);
        if offset == 0 && length.is_none() {
            return Err(self.fail(QueryError::EmptyLimit));
        }
        self.require_select(
            ClauseKind::Limit,
            &[
                ClauseKind::Select,
                ClauseKind::Where,
                ClauseKind::Group,
                ClauseKind::Order,
            ],
        )?;

        match length {
            Some(length) => self.sql.push_str(&format!(" LIMIT {offset}, {length}")),
            None => self.sql.push_str(&format!(" LIMIT {offset}")),
        }
        self.last = ClauseKind::Limit;
        Ok(self)
    }

    // --- Terminals ---

    /// Execute and return the first row, or `Ok(None)` if there is none.
    pub fn get(&mut self) -> Result<Option<Row>, NotExecuted> {
        self.run().map(|rows| rows.into_iter().next()).ok_or(NotExecuted)
    }

    /// Execute and return every row.
    pub fn get_all(&mut self) -> Result<Vec<Row>, NotExecuted> {
        self.run().ok_or(NotExecuted)
    }

    /// Execute an UPDATE chain. Returns whether the store accepted it.
    pub fn set(&mut self) -> Result<bool, QueryError> {
        if self.statement != ClauseKind::None && self.statement != ClauseKind::Update {
            let previous = self.statement;
            return Err(self.fail(QueryError::OutOfOrder {
                clause: ClauseKind::Update,
                previous,
            }));
        }
        if self.statement == ClauseKind::Update && !self.filtered {
            return Err(self.fail(QueryError::UnfilteredUpdate));
        }
        Ok(self.run().is_some())
    }

    // --- Internals ---

    /// Execute the pending statement once, then reset the chain to EMPTY.
    fn run(&mut self) -> Option<Vec<Row>> {
        if self.statement == ClauseKind::None || self.failed {
            return None;
        }
        if self.statement == ClauseKind::Update && !self.filtered {
            tracing::warn!(table = %self.schema.table, "Refusing to execute UPDATE without WHERE");
            self.reset();
            return None;
        }

        let outcome = executor::execute(&self.db, self.statement, &self.sql, &self.bindings);
        self.executed = outcome.is_some();
        self.reset();
        outcome.map(|outcome| outcome.into_rows())
    }

    fn reset(&mut self) {
        self.sql.clear();
        self.bindings.clear();
        self.counters.clear();
        self.statement = ClauseKind::None;
        self.last = ClauseKind::None;
        self.filtered = false;
    }

    fn begin(&mut self, statement: ClauseKind) {
        self.statement = statement;
        self.last = statement;
    }

    fn fail(&mut self, err: QueryError) -> QueryError {
        self.failed = true;
        tracing::debug!(table = %self.schema.table, error = %err, "Query chain aborted");
        err
    }

    fn require_first(&mut self, clause: ClauseKind) -> Result<(), QueryError> {
        if self.last != ClauseKind::None || self.failed {
            let previous = self.last;
            return Err(self.fail(QueryError::OutOfOrder { clause, previous }));
        }
        Ok(())
    }

    fn require_after(&mut self, clause: ClauseKind, allowed: &[ClauseKind]) -> Result<(), QueryError> {
        if self.statement == ClauseKind::None {
            return Err(self.fail(QueryError::NoStatement { clause }));
        }
        if !allowed.contains(&self.last) {
            let previous = self.last;
            return Err(self.fail(QueryError::OutOfOrder { clause, previous }));
        }
        Ok(())
    }

    fn require_select(&mut self, clause: ClauseKind, allowed: &[ClauseKind]) -> Result<(), QueryError> {
        if self.statement != ClauseKind::None && self.statement != ClauseKind::Select {
            return Err(self.fail(QueryError::RequiresSelect { clause }));
        }
        self.require_after(clause, allowed)
    }

    fn column_list<I>(&mut self, clause: ClauseKind, columns: I) -> Result<String, QueryError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let columns: Vec<String> = columns
            .into_iter()
            .map(|column| column.as_ref().trim().to_string())
            .filter(|column| !column.is_empty())
            .collect();
        if columns.is_empty() {
            return Err(self.fail(QueryError::EmptyColumns { clause }));
        }
        Ok(columns.join(","))
    }

    fn check_columns(&mut self, data: &[(String, Value)]) -> Result<(), QueryError> {
        let names: Vec<String> = data.iter().map(|(field, _)| field.clone()).collect();
        self.check_names(&names)
    }

    fn check_names(&mut self, names: &[String]) -> Result<(), QueryError> {
        match names.iter().find(|name| !is_identifier(name)) {
            Some(bad) => {
                let bad = bad.clone();
                Err(self.fail(QueryError::InvalidColumn(bad)))
            }
            None => Ok(()),
        }
    }

    /// Bind `value` under a name unique within this chain: `field`, then
    /// `field1`, `field2`, ... for repeated uses of the same field.
    fn bind(&mut self, field: &str, value: Value) -> String {
        let counter = self.counters.entry(field.to_string()).or_insert(0);
        let mut name = if *counter == 0 {
            field.to_string()
        } else {
            format!("{field}{counter}")
        };
        // a literal column such as `id1` may already own the generated name
        while self.bindings.iter().any(|binding| binding.name == name) {
            *counter += 1;
            name = format!("{field}{counter}");
        }
        *counter += 1;

        self.bindings.push(Binding {
            name: name.clone(),
            value,
        });
        name
    }
}

impl<M: Model> Drop for Query<M> {
    fn drop(&mut self) {
        if self.statement == ClauseKind::None || self.failed {
            return;
        }
        if self.statement == ClauseKind::Update && !self.filtered {
            tracing::warn!(
                table = %self.schema.table,
                "UPDATE chain dropped without WHERE, skipping it"
            );
            return;
        }
        tracing::warn!(
            table = %self.schema.table,
            statement = %self.statement,
            "Query chain dropped without a terminal call, executing it now"
        );
        let _ = self.run();
    }
}

impl<M: Model> fmt::Debug for Query<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("table", &self.schema.table)
            .field("sql", &self.sql)
            .field("bindings", &self.bindings)
            .field("last", &self.last)
            .field("executed", &self.executed)
            .finish()
    }
}

fn collect_pairs<I, K, V>(data: I) -> Vec<(String, Value)>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    data.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Articles;
    impl Model for Articles {
        const TABLE: &'static str = "articles";
        const FIELDS: &'static [&'static str] = &["id", "title", "author", "views"];
        const PRIMARY_KEY: Option<&'static str> = Some("id");
    }

    struct Keyless;
    impl Model for Keyless {
        const TABLE: &'static str = "keyless";
        const FIELDS: &'static [&'static str] = &["a"];
    }

    fn query() -> Query<Articles> {
        let db = Database::open_in_memory().unwrap();
        Query::new(&db).unwrap()
    }

    /// Inspect the SQL without letting the chain auto-flush.
    fn inspect(mut query: Query<Articles>) -> (String, Vec<Binding>) {
        let sql = query.sql().to_string();
        let bindings = query.bindings().to_vec();
        query.reset();
        (sql, bindings)
    }

    #[test]
    fn test_select_where_order_limit() {
        let built = query()
            .select(["*"])
            .unwrap()
            .where_([("id", 4)])
            .unwrap()
            .order_desc(["id"])
            .unwrap()
            .limit(5, None)
            .unwrap();
        assert_eq!(built.last_clause(), ClauseKind::Limit);

        let (sql, bindings) = inspect(built);
        assert_eq!(sql, "SELECT * FROM articles WHERE id = :id ORDER BY id DESC LIMIT 5");
        assert_eq!(bindings, vec![Binding::new("id", 4)]);
    }

    #[test]
    fn test_repeated_field_gets_distinct_bind_names() {
        let built = query()
            .select(["*"])
            .unwrap()
            .where_([("id", 4)])
            .unwrap()
            .where_or([("id", 5)])
            .unwrap()
            .where_or([("id", 6)])
            .unwrap();

        let (sql, bindings) = inspect(built);
        assert_eq!(
            sql,
            "SELECT * FROM articles WHERE id = :id OR id = :id1 OR id = :id2"
        );
        let names: Vec<_> = bindings.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["id", "id1", "id2"]);
        assert_eq!(bindings[1].value, Value::Integer(5));
    }

    #[test]
    fn test_generated_name_skips_literal_column() {
        let built = query()
            .select(["*"])
            .unwrap()
            .where_(vec![("id", 1), ("id1", 2), ("id", 3)])
            .unwrap();
        let (_, bindings) = inspect(built);
        let names: Vec<_> = bindings.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["id", "id1", "id2"]);
    }

    #[test]
    fn test_where_and_or_joiners() {
        let built = query()
            .select(["*"])
            .unwrap()
            .where_or([("id", 4), ("author", 2)])
            .unwrap()
            .where_and([("views", 10)])
            .unwrap();
        let (sql, _) = inspect(built);
        assert_eq!(
            sql,
            "SELECT * FROM articles WHERE id = :id OR author = :author AND views = :views"
        );
    }

    #[test]
    fn test_literal_where() {
        let built = query().select(["id"]).unwrap().where_(true).unwrap();
        let (sql, bindings) = inspect(built);
        assert_eq!(sql, "SELECT id FROM articles WHERE 1");
        assert!(bindings.is_empty());
    }

    #[test]
    fn test_group_order_limit_with_offset() {
        let built = query()
            .select(["author", "SUM(views) AS total_views"])
            .unwrap()
            .group_by(["author"])
            .unwrap()
            .order_desc(["total_views"])
            .unwrap()
            .limit(0, Some(3))
            .unwrap();
        let (sql, _) = inspect(built);
        assert_eq!(
            sql,
            "SELECT author,SUM(views) AS total_views FROM articles GROUP BY author ORDER BY total_views DESC LIMIT 0, 3"
        );
    }

    #[test]
    fn test_update_set_clause() {
        let built = query()
            .update(vec![("title", Value::from("t")), ("views", Value::from(1))])
            .unwrap()
            .where_([("id", 7)])
            .unwrap();
        let (sql, bindings) = inspect(built);
        assert_eq!(
            sql,
            "UPDATE articles SET title = :title, views = :views WHERE id = :id"
        );
        assert_eq!(bindings.len(), 3);
    }

    #[test]
    fn test_update_binds_same_field_twice() {
        let built = query()
            .update([("title", "new")])
            .unwrap()
            .where_([("title", "old")])
            .unwrap();
        let (sql, bindings) = inspect(built);
        assert_eq!(sql, "UPDATE articles SET title = :title WHERE title = :title1");
        assert_eq!(bindings[1], Binding::new("title1", "old"));
    }

    #[test]
    fn test_usage_errors() {
        let err = query().select(["*"]).unwrap().insert([("title", "x")]).unwrap_err();
        assert!(matches!(
            err,
            QueryError::OutOfOrder { clause: ClauseKind::Insert, previous: ClauseKind::Select }
        ));

        let err = query().where_([("id", 1)]).unwrap_err();
        assert!(matches!(err, QueryError::NoStatement { clause: ClauseKind::Where }));

        let err = query().select(Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, QueryError::EmptyColumns { .. }));

        let err = query().insert(Vec::<(String, Value)>::new()).unwrap_err();
        assert!(matches!(err, QueryError::EmptyData { operation: "insert" }));

        let err = query().select(["*"]).unwrap().limit(0, None).unwrap_err();
        assert!(matches!(err, QueryError::EmptyLimit));

        let err = query()
            .select(["*"])
            .unwrap()
            .order_asc(["id"])
            .unwrap()
            .where_([("id", 1)])
            .unwrap_err();
        assert!(matches!(
            err,
            QueryError::OutOfOrder { clause: ClauseKind::Where, previous: ClauseKind::Order }
        ));

        let err = query().select(["*"]).unwrap().where_([("bad name", 1)]).unwrap_err();
        assert!(matches!(err, QueryError::InvalidColumn(ref c) if c == "bad name"));
    }

    #[test]
    fn test_modifiers_require_select() {
        let err = query()
            .update([("title", "x")])
            .unwrap()
            .where_([("id", 1)])
            .unwrap()
            .order_asc(["id"])
            .unwrap_err();
        assert!(matches!(err, QueryError::RequiresSelect { clause: ClauseKind::Order }));
    }

    #[test]
    fn test_delete_by_key_requires_primary_key() {
        let db = Database::open_in_memory().unwrap();
        let err = Query::<Keyless>::new(&db).unwrap().delete(4).unwrap_err();
        assert!(matches!(err, QueryError::MissingPrimaryKey { ref table } if table == "keyless"));
    }

    #[test]
    fn test_terminal_on_empty_chain() {
        let mut empty = query();
        assert_eq!(empty.get(), Err(NotExecuted));
        assert_eq!(empty.get_all(), Err(NotExecuted));
        assert!(!empty.set().unwrap());
    }

    #[test]
    fn test_set_only_runs_updates() {
        let mut select = query().select(["*"]).unwrap().where_([("id", 1)]).unwrap();
        let err = select.set().unwrap_err();
        assert!(matches!(
            err,
            QueryError::OutOfOrder { clause: ClauseKind::Update, previous: ClauseKind::Select }
        ));
        // the aborted chain is neither run nor flushed
        assert!(!select.is_executed());
        assert_eq!(select.get_all(), Err(NotExecuted));
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("article_title"));
        assert!(is_identifier("_x1"));
        assert!(!is_identifier("1x"));
        assert!(!is_identifier("a-b"));
        assert!(!is_identifier(""));
    }
}
