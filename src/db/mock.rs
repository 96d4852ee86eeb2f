//! Mock database client for testing.
//!
//! Returns canned results and records every call so tests can assert on
//! what the chat pipeline asked the store to do.

use super::{ColumnInfo, DatabaseClient, QueryResult, SchemaSnapshot, TableDefinition, Value};
use crate::error::{ChatError, ExecutionError, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// A mock database client that returns predefined results.
#[derive(Debug, Default)]
pub struct MockDatabaseClient {
    schemas: Mutex<Vec<SchemaSnapshot>>,
    query_result: Option<QueryResult>,
    changes: u64,
    execution_error: Option<String>,
    schema_unavailable: bool,
    schema_loads: AtomicUsize,
    executed: Mutex<Vec<String>>,
}

impl MockDatabaseClient {
    /// Creates a new mock client with an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock client with a single `users` table holding Alice.
    pub fn with_users() -> Self {
        Self::new()
            .with_schema(SchemaSnapshot::new(vec![TableDefinition::new(
                "users",
                "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)",
            )]))
            .with_query_result(QueryResult::with_data(
                vec![
                    ColumnInfo::new("id", "INTEGER"),
                    ColumnInfo::new("name", "TEXT"),
                ],
                vec![vec![Value::Int(1), Value::from("Alice")]],
            ))
    }

    /// Queues a schema to be returned by the next `load_schema` call.
    ///
    /// The last queued schema keeps being returned once the queue drains.
    pub fn with_schema(self, schema: SchemaSnapshot) -> Self {
        self.schemas
            .lock()
            .expect("mock schema lock poisoned")
            .push(schema);
        self
    }

    /// Sets the rows returned by `query`.
    pub fn with_query_result(mut self, result: QueryResult) -> Self {
        self.query_result = Some(result);
        self
    }

    /// Sets the change count returned by `run`.
    pub fn with_changes(mut self, changes: u64) -> Self {
        self.changes = changes;
        self
    }

    /// Makes every `query` and `run` call fail with `message`.
    pub fn with_execution_error(mut self, message: impl Into<String>) -> Self {
        self.execution_error = Some(message.into());
        self
    }

    /// Makes every `load_schema` call fail.
    pub fn with_schema_unavailable(mut self) -> Self {
        self.schema_unavailable = true;
        self
    }

    /// Returns how many times the schema was loaded.
    pub fn schema_loads(&self) -> usize {
        self.schema_loads.load(Ordering::SeqCst)
    }

    /// Returns every statement passed to `query` or `run`, in order.
    pub fn executed(&self) -> Vec<String> {
        self.executed
            .lock()
            .expect("mock statement log poisoned")
            .clone()
    }

    fn record(&self, sql: &str) -> std::result::Result<(), ExecutionError> {
        self.executed
            .lock()
            .expect("mock statement log poisoned")
            .push(sql.to_string());

        match &self.execution_error {
            Some(message) => Err(ExecutionError::new(
                message.clone(),
                Some("SQLITE_ERROR".to_string()),
                sql,
            )),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DatabaseClient for MockDatabaseClient {
    async fn load_schema(&self) -> Result<SchemaSnapshot> {
        self.schema_loads.fetch_add(1, Ordering::SeqCst);

        if self.schema_unavailable {
            return Err(ChatError::store("mock store is unavailable"));
        }

        let mut schemas = self.schemas.lock().expect("mock schema lock poisoned");
        let schema = if schemas.len() > 1 {
            schemas.remove(0)
        } else {
            schemas.first().cloned().unwrap_or_default()
        };
        Ok(schema)
    }

    async fn query(&self, sql: &str) -> std::result::Result<QueryResult, ExecutionError> {
        self.record(sql)?;
        Ok(self.query_result.clone().unwrap_or_default())
    }

    async fn run(&self, sql: &str) -> std::result::Result<u64, ExecutionError> {
        self.record(sql)?;
        Ok(self.changes)
    }

    async fn close(&self) {}
}
