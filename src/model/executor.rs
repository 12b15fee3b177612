//! Statement execution.
//!
//! Every statement runs inside its own transaction: begin, run, then commit
//! on success or roll back on failure. Failures are logged and counted, never
//! raised; callers only see whether anything came back.

use crate::db::{Binding, Connection, Database, DbError, StatementOutcome};
use crate::model::query::ClauseKind;
use crate::observability::metrics;

/// Run one statement transactionally. `None` means the statement failed.
pub fn execute(
    db: &Database,
    statement: ClauseKind,
    sql: &str,
    bindings: &[Binding],
) -> Option<StatementOutcome> {
    let result = db
        .with_connection(|conn| run_in_transaction(conn, sql, bindings))
        .and_then(|inner| inner);

    match result {
        Ok(outcome) => {
            tracing::debug!(statement = %statement, sql = %sql, "Statement executed");
            metrics::record_query(statement.as_str(), true);
            Some(outcome)
        }
        Err(e) => {
            // bound values stay out of the log
            tracing::error!(statement = %statement, sql = %sql, error = %e, "Statement failed");
            metrics::record_query(statement.as_str(), false);
            None
        }
    }
}

fn run_in_transaction(
    conn: &mut dyn Connection,
    sql: &str,
    bindings: &[Binding],
) -> Result<StatementOutcome, DbError> {
    conn.begin_transaction()?;

    // a failed COMMIT can leave the transaction open, so it rolls back too
    let result = conn.run(sql, bindings).and_then(|outcome| {
        if conn.in_transaction() {
            conn.commit()?;
        }
        Ok(outcome)
    });

    if result.is_err() && conn.in_transaction() {
        if let Err(rollback) = conn.rollback() {
            tracing::warn!(error = %rollback, "Rollback failed");
        }
    }
    result
}
