//! Leading-keyword classification of SQL statements.
//!
//! Dispatch only looks at the first keyword. sqlparser is used to notice
//! text that holds more than one statement, which is logged but not acted on.

use sqlparser::dialect::SQLiteDialect;
use sqlparser::parser::Parser;
use std::fmt;

/// The kind of statement, decided by its leading keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    Select,
    Insert,
    Update,
    Delete,
    /// CREATE, DROP or ALTER.
    Ddl,
    Unknown,
}

impl QueryKind {
    /// Returns true for kinds executed through `run` rather than `query`.
    pub fn is_write(&self) -> bool {
        !matches!(self, Self::Select)
    }

    /// Returns the kind as a lowercase label for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Ddl => "ddl",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies a statement by its leading keyword, ignoring case and
/// surrounding whitespace.
pub fn classify_statement(sql: &str) -> QueryKind {
    let normalized = sql.trim().to_lowercase();

    if normalized.starts_with("select") {
        QueryKind::Select
    } else if normalized.starts_with("insert") {
        QueryKind::Insert
    } else if normalized.starts_with("update") {
        QueryKind::Update
    } else if normalized.starts_with("delete") {
        QueryKind::Delete
    } else if ["create", "drop", "alter"]
        .iter()
        .any(|keyword| normalized.starts_with(keyword))
    {
        QueryKind::Ddl
    } else {
        QueryKind::Unknown
    }
}

/// Counts the statements in `sql` using the SQLite dialect.
///
/// Returns `None` when the text does not parse.
pub fn count_statements(sql: &str) -> Option<usize> {
    Parser::parse_sql(&SQLiteDialect {}, sql)
        .ok()
        .map(|statements| statements.len())
}
