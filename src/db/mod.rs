//! Database abstraction layer for db-chat.
//!
//! Provides a trait-based interface over the relational store so the chat
//! pipeline can run against SQLite or an in-memory mock.

mod mock;
mod schema;
mod sqlite;
mod types;

pub use mock::MockDatabaseClient;
pub use schema::{SchemaSnapshot, TableDefinition};
pub use sqlite::SqliteClient;
pub use types::{ColumnInfo, QueryResult, Row, Value};

use crate::error::{ExecutionError, Result};
use async_trait::async_trait;

/// Trait defining the interface for database clients.
///
/// Catalog failures surface as `ChatError::StoreUnavailable`; statement
/// failures surface as a normalized [`ExecutionError`].
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// Reads every table name and definition from the catalog.
    async fn load_schema(&self) -> Result<SchemaSnapshot>;

    /// Executes a read statement and returns its rows.
    async fn query(&self, sql: &str) -> std::result::Result<QueryResult, ExecutionError>;

    /// Executes a write statement and returns the number of rows changed.
    async fn run(&self, sql: &str) -> std::result::Result<u64, ExecutionError>;

    /// Closes the underlying connections.
    async fn close(&self);
}
