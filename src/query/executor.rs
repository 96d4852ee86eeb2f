//! Statement execution against the store.
//!
//! Provides isolated execution that can be tested independently of the chat
//! orchestrator.

use std::time::Instant;
use tracing::{debug, warn};

use super::classify::{count_statements, QueryKind};
use crate::db::{DatabaseClient, QueryResult};
use crate::error::ExecutionError;

/// What a successfully executed statement produced.
#[derive(Debug, Clone)]
pub enum ExecutionOutcome {
    /// Rows from a read statement.
    Rows(QueryResult),
    /// Change count from a write statement.
    Changes { kind: QueryKind, changes: u64 },
}

impl ExecutionOutcome {
    /// Returns the kind of statement that ran.
    pub fn kind(&self) -> QueryKind {
        match self {
            Self::Rows(_) => QueryKind::Select,
            Self::Changes { kind, .. } => *kind,
        }
    }

    /// Returns true if the statement may have changed the table layout.
    pub fn invalidates_schema(&self) -> bool {
        self.kind().is_write()
    }
}

/// Dispatches a classified statement to `query` or `run`.
pub struct QueryExecutor<'a> {
    db: &'a dyn DatabaseClient,
}

impl<'a> QueryExecutor<'a> {
    /// Creates a new query executor.
    pub fn new(db: &'a dyn DatabaseClient) -> Self {
        Self { db }
    }

    /// Executes `sql` according to `kind`.
    ///
    /// DDL statements always report zero changes.
    pub async fn execute(
        &self,
        sql: &str,
        kind: QueryKind,
    ) -> Result<ExecutionOutcome, ExecutionError> {
        if let Some(count) = count_statements(sql).filter(|count| *count > 1) {
            warn!(
                statements = count,
                %kind,
                "Statement text holds more than one statement; dispatching on the first keyword"
            );
        }

        let start = Instant::now();
        let outcome = match kind {
            QueryKind::Select => self.db.query(sql).await.map(ExecutionOutcome::Rows),
            QueryKind::Ddl => self.db.run(sql).await.map(|_| ExecutionOutcome::Changes {
                kind,
                changes: 0,
            }),
            _ => self
                .db
                .run(sql)
                .await
                .map(|changes| ExecutionOutcome::Changes { kind, changes }),
        };
        let duration_ms = start.elapsed().as_millis() as u64;

        match &outcome {
            Ok(ExecutionOutcome::Rows(result)) => debug!(
                %kind,
                rows = result.row_count,
                truncated = result.was_truncated,
                duration_ms,
                "Statement returned rows"
            ),
            Ok(ExecutionOutcome::Changes { changes, .. }) => {
                debug!(%kind, changes, duration_ms, "Statement applied")
            }
            Err(e) => debug!(%kind, code = %e.code, duration_ms, "Statement failed"),
        }

        outcome
    }
}
