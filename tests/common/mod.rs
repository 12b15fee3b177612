//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex};

use tokio::net::TcpListener;

use roots::config::AppConfig;
use roots::db::{Binding, ColumnMeta, Connection, Database, DbError, StatementOutcome};
use roots::http::{Action, HttpServer, MiddlewareRegistry};
use roots::lifecycle::Shutdown;
use roots::routing::RouteTable;

/// One call observed by [`RecordingConnection`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Begin,
    Commit,
    Rollback,
    Run { sql: String, bindings: Vec<Binding> },
}

/// Fake connection that records every call and can be told to fail.
#[derive(Clone, Default)]
pub struct RecordingConnection {
    calls: Arc<Mutex<Vec<Call>>>,
    in_transaction: bool,
    fail_statements: bool,
    failing_commits: usize,
}

impl RecordingConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `run` fails with a statement error.
    pub fn failing() -> Self {
        Self {
            fail_statements: true,
            ..Self::default()
        }
    }

    /// The first `count` commits fail and leave the transaction open.
    pub fn failing_commit(count: usize) -> Self {
        Self {
            failing_commits: count,
            ..Self::default()
        }
    }

    /// Handle to the call log, shared with clones.
    pub fn log(&self) -> Arc<Mutex<Vec<Call>>> {
        Arc::clone(&self.calls)
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Connection for RecordingConnection {
    fn begin_transaction(&mut self) -> Result<(), DbError> {
        self.record(Call::Begin);
        self.in_transaction = true;
        Ok(())
    }

    fn commit(&mut self) -> Result<(), DbError> {
        self.record(Call::Commit);
        if self.failing_commits > 0 {
            self.failing_commits -= 1;
            return Err(DbError::Statement("deferred constraint failed".into()));
        }
        self.in_transaction = false;
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), DbError> {
        self.record(Call::Rollback);
        self.in_transaction = false;
        Ok(())
    }

    fn in_transaction(&self) -> bool {
        self.in_transaction
    }

    fn run(&mut self, sql: &str, bindings: &[Binding]) -> Result<StatementOutcome, DbError> {
        self.record(Call::Run {
            sql: sql.to_string(),
            bindings: bindings.to_vec(),
        });
        if self.fail_statements {
            return Err(DbError::Statement("constraint violated".into()));
        }
        if sql.starts_with("SELECT") {
            Ok(StatementOutcome::Rows(Vec::new()))
        } else {
            Ok(StatementOutcome::Affected(1))
        }
    }

    fn fetch_columns(&mut self, _table: &str) -> Result<Vec<ColumnMeta>, DbError> {
        Ok(Vec::new())
    }
}

/// Only the statements sent, in order.
pub fn statements(log: &Arc<Mutex<Vec<Call>>>) -> Vec<(String, Vec<Binding>)> {
    log.lock()
        .unwrap()
        .iter()
        .filter_map(|call| match call {
            Call::Run { sql, bindings } => Some((sql.clone(), bindings.clone())),
            _ => None,
        })
        .collect()
}

/// A database backed by a recording fake, plus its call log.
pub fn recording_database() -> (Database, Arc<Mutex<Vec<Call>>>) {
    let conn = RecordingConnection::new();
    let log = conn.log();
    (Database::new(conn), log)
}

/// In-memory SQLite with an `articles` table and three rows.
pub fn articles_database() -> Database {
    let db = Database::open_in_memory().unwrap();
    db.run(
        "CREATE TABLE articles (
            id INTEGER PRIMARY KEY,
            article_title TEXT NOT NULL,
            content TEXT NOT NULL DEFAULT '',
            author INTEGER,
            views INTEGER NOT NULL DEFAULT 0
        )",
        &[],
    )
    .unwrap();
    for (id, title, author, views) in [(1, "first", 1, 10), (2, "second", 2, 5), (3, "third", 1, 7)] {
        db.run(
            "INSERT INTO articles (id, article_title, author, views) VALUES (:id, :t, :a, :v)",
            &[
                Binding::new("id", id),
                Binding::new("t", title),
                Binding::new("a", author),
                Binding::new("v", views),
            ],
        )
        .unwrap();
    }
    db
}

/// Write `files` (relative path, contents) under `dir`.
pub fn write_views(dir: &Path, files: &[(&str, &str)]) {
    for (name, contents) in files {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, contents).unwrap();
    }
}

/// Serve `table` on an ephemeral port. Returns the address and the
/// coordinator that stops the server.
pub async fn start_server(
    config: AppConfig,
    table: RouteTable<Action>,
    middleware: MiddlewareRegistry,
) -> (SocketAddr, Arc<Shutdown>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Arc::new(Shutdown::new());
    let rx = shutdown.subscribe();

    let server = HttpServer::new(&config, table.into_router().unwrap(), middleware);
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    (addr, shutdown)
}
