//! SQLite database client implementation.
//!
//! Provides the `SqliteClient` struct that implements the `DatabaseClient`
//! trait for a local SQLite file using sqlx.

use crate::db::{ColumnInfo, DatabaseClient, QueryResult, Row, SchemaSnapshot, TableDefinition, Value};
use crate::error::{ChatError, ExecutionError, Result};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column as SqlxColumn, Row as SqlxRow, TypeInfo, ValueRef};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Maximum rows to return from a query.
const MAX_ROWS: usize = 1000;

/// How long a statement waits on a locked database before failing.
const BUSY_TIMEOUT_SECS: u64 = 5;

/// Catalog query listing user tables with their defining statements.
const CATALOG_QUERY: &str = r#"
    SELECT name, sql
    FROM sqlite_master
    WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
"#;

/// SQLite database client.
#[derive(Debug, Clone)]
pub struct SqliteClient {
    pool: SqlitePool,
}

impl SqliteClient {
    /// Opens (creating if missing) the SQLite database at `path`.
    pub async fn open(path: &Path) -> Result<Self> {
        let conn_str = format!("sqlite:{}", path.display());
        let options = SqliteConnectOptions::from_str(&conn_str)
            .map_err(|e| ChatError::store(format!("Invalid database path: {e}")))?
            .busy_timeout(Duration::from_secs(BUSY_TIMEOUT_SECS))
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await
            .map_err(|e| {
                ChatError::store(format!(
                    "Failed to open database {}: {e}",
                    path.display()
                ))
            })?;

        info!("Database opened at {}", path.display());
        Ok(Self { pool })
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl DatabaseClient for SqliteClient {
    async fn load_schema(&self) -> Result<SchemaSnapshot> {
        let rows: Vec<(String, Option<String>)> = sqlx::query_as(CATALOG_QUERY)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ChatError::store(format!("Failed to read schema catalog: {e}")))?;

        let tables = rows
            .into_iter()
            .map(|(name, sql)| TableDefinition::new(name, sql.unwrap_or_default()))
            .collect::<Vec<_>>();

        debug!(table_count = tables.len(), "Loaded schema snapshot");
        Ok(SchemaSnapshot::new(tables))
    }

    async fn query(&self, sql: &str) -> std::result::Result<QueryResult, ExecutionError> {
        let result = sqlx::query(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| normalize_error(e, sql))?;

        let columns: Vec<ColumnInfo> = result
            .first()
            .map(|first_row| {
                first_row
                    .columns()
                    .iter()
                    .map(|col| ColumnInfo::new(col.name(), col.type_info().name()))
                    .collect()
            })
            .unwrap_or_default();

        let total_rows = result.len();
        let was_truncated = total_rows > MAX_ROWS;

        if was_truncated {
            warn!(
                "Query returned {} rows, truncating to {} rows",
                total_rows, MAX_ROWS
            );
        }

        let rows: Vec<Row> = result.iter().take(MAX_ROWS).map(convert_row).collect();
        let row_count = rows.len();

        Ok(QueryResult {
            columns,
            rows,
            row_count,
            total_rows,
            was_truncated,
        })
    }

    async fn run(&self, sql: &str) -> std::result::Result<u64, ExecutionError> {
        let result = sqlx::query(sql)
            .execute(&self.pool)
            .await
            .map_err(|e| normalize_error(e, sql))?;

        Ok(result.rows_affected())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

/// Converts a SqliteRow to our Row type.
fn convert_row(row: &SqliteRow) -> Row {
    (0..row.columns().len())
        .map(|index| convert_value(row, index))
        .collect()
}

/// Converts a single column value using the value's runtime storage class.
fn convert_value(row: &SqliteRow, index: usize) -> Value {
    let type_name = match row.try_get_raw(index) {
        Ok(raw) if raw.is_null() => return Value::Null,
        Ok(raw) => raw.type_info().name().to_uppercase(),
        Err(_) => return Value::Null,
    };

    let decoded = match type_name.as_str() {
        "INTEGER" | "INT" | "BIGINT" | "INT4" | "INT8" => {
            row.try_get::<i64, _>(index).ok().map(Value::Int)
        }
        "REAL" | "FLOAT" | "DOUBLE" | "NUMERIC" => {
            row.try_get::<f64, _>(index).ok().map(Value::Float)
        }
        "BLOB" => row.try_get::<Vec<u8>, _>(index).ok().map(Value::Bytes),
        _ => None,
    };

    decoded
        .or_else(|| row.try_get::<String, _>(index).ok().map(Value::String))
        .unwrap_or(Value::Null)
}

/// Wraps a sqlx error into the normalized `{message, code, sql}` shape.
fn normalize_error(error: sqlx::Error, sql: &str) -> ExecutionError {
    match error.as_database_error() {
        Some(db_error) => {
            let code = db_error
                .code()
                .and_then(|code| code.parse::<i32>().ok())
                .and_then(result_code_name)
                .map(str::to_string);
            ExecutionError::new(db_error.message(), code, sql)
        }
        None => ExecutionError::new(error.to_string(), None, sql),
    }
}

/// Maps a SQLite (extended) result code to its primary symbolic name.
fn result_code_name(code: i32) -> Option<&'static str> {
    let name = match code & 0xff {
        1 => "SQLITE_ERROR",
        2 => "SQLITE_INTERNAL",
        3 => "SQLITE_PERM",
        4 => "SQLITE_ABORT",
        5 => "SQLITE_BUSY",
        6 => "SQLITE_LOCKED",
        7 => "SQLITE_NOMEM",
        8 => "SQLITE_READONLY",
        9 => "SQLITE_INTERRUPT",
        10 => "SQLITE_IOERR",
        11 => "SQLITE_CORRUPT",
        13 => "SQLITE_FULL",
        14 => "SQLITE_CANTOPEN",
        17 => "SQLITE_SCHEMA",
        18 => "SQLITE_TOOBIG",
        19 => "SQLITE_CONSTRAINT",
        20 => "SQLITE_MISMATCH",
        21 => "SQLITE_MISUSE",
        23 => "SQLITE_AUTH",
        25 => "SQLITE_RANGE",
        26 => "SQLITE_NOTADB",
        _ => return None,
    };
    Some(name)
}
