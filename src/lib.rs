//! db-chat - Chat with a SQLite database in plain language.
//!
//! This library exposes the core modules for use by the binary and the
//! integration tests.

pub mod chat;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod llm;
pub mod logging;
pub mod query;
pub mod server;
