//! Schema snapshot types for db-chat.
//!
//! A snapshot is the list of table definitions read from the store's
//! catalog at one point in time, rendered into text for LLM prompts.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// The structural description of the store at the time of the last load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SchemaSnapshot {
    /// Tables in catalog enumeration order.
    pub tables: Vec<TableDefinition>,
}

/// A table name together with its defining statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableDefinition {
    /// Table name.
    pub name: String,

    /// The `CREATE TABLE` statement stored in the catalog.
    pub definition: String,
}

impl TableDefinition {
    /// Creates a new table definition.
    pub fn new(name: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            definition: definition.into(),
        }
    }
}

impl SchemaSnapshot {
    /// Creates a snapshot from the given tables.
    pub fn new(tables: Vec<TableDefinition>) -> Self {
        Self { tables }
    }

    /// Returns true if the store has no tables.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Returns the table names in catalog order.
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }

    /// Formats the schema for inclusion in an LLM system prompt.
    ///
    /// One `Table: <name>\nSchema: <definition>` block per table.
    pub fn format_for_llm(&self) -> String {
        self.tables
            .iter()
            .map(|table| format!("Table: {}\nSchema: {}\n", table.name, table.definition))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Returns a hash of the snapshot contents.
    ///
    /// Used to detect when a pinned system instruction is stale.
    pub fn content_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}
