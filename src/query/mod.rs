//! Statement classification and execution.
//!
//! Isolates dispatching a sanitized statement to the store from the chat
//! orchestration so both halves can be tested on their own.

mod classify;
mod executor;

pub use classify::{classify_statement, count_statements, QueryKind};
pub use executor::{ExecutionOutcome, QueryExecutor};
