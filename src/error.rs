//! Error types for db-chat.
//!
//! Defines the main error enum used throughout the application, plus the
//! normalized execution error that flows back to the chat client.

use serde::Serialize;
use thiserror::Error;

/// Result code reported when the backend does not provide one.
pub const DEFAULT_STORE_ERROR_CODE: &str = "SQLITE_ERROR";

/// Main error type for db-chat operations.
#[derive(Error, Debug)]
pub enum ChatError {
    /// The database could not be reached or its catalog could not be read.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// A statement was rejected by the database.
    #[error("Query error: {0}")]
    Execution(#[from] ExecutionError),

    /// LLM API errors (rate limits, auth, timeouts, etc.)
    #[error("LLM error: {0}")]
    Llm(String),

    /// Configuration errors (invalid config file, bad values, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The incoming chat request was malformed.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ChatError {
    /// Creates a store-unavailable error with the given message.
    pub fn store(msg: impl Into<String>) -> Self {
        Self::StoreUnavailable(msg.into())
    }

    /// Creates an LLM error with the given message.
    pub fn llm(msg: impl Into<String>) -> Self {
        Self::Llm(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an invalid-request error with the given message.
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::StoreUnavailable(_) => "Store Error",
            Self::Execution(_) => "Query Error",
            Self::Llm(_) => "LLM Error",
            Self::Config(_) => "Configuration Error",
            Self::InvalidRequest(_) => "Request Error",
        }
    }
}

/// A database rejection normalized to `{message, code, sql}`.
///
/// `sql` is always the exact statement that was attempted.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{message}")]
pub struct ExecutionError {
    /// Backend error message.
    pub message: String,
    /// Symbolic backend result code (e.g. `SQLITE_CONSTRAINT`).
    pub code: String,
    /// The statement that failed.
    pub sql: String,
}

impl ExecutionError {
    /// Creates an execution error, falling back to the generic store code.
    pub fn new(message: impl Into<String>, code: Option<String>, sql: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.unwrap_or_else(|| DEFAULT_STORE_ERROR_CODE.to_string()),
            sql: sql.into(),
        }
    }
}

/// Result type alias using ChatError.
pub type Result<T> = std::result::Result<T, ChatError>;
