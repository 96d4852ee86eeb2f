//! Pipeline tests over a real SQLite database, below the HTTP layer.

use std::sync::Arc;

use db_chat::chat::{ChatReply, ChatService};
use db_chat::config::ChatConfig;
use db_chat::db::DatabaseClient;
use db_chat::llm::MockLlmClient;

use super::seeded_database;

#[tokio::test]
async fn test_created_table_reaches_next_translation() {
    let dir = tempfile::tempdir().unwrap();
    let db = Arc::new(seeded_database(dir.path()).await);
    let llm = Arc::new(
        MockLlmClient::new()
            .then_reply("DATABASE_QUERY")
            .then_reply("CREATE TABLE orders (id INTEGER PRIMARY KEY, user_id INTEGER, placed_at TEXT)")
            .then_reply("I created the orders table.")
            .then_reply("DATABASE_QUERY")
            .then_reply("SELECT COUNT(*) AS total FROM orders")
            .then_reply("There are no orders yet."),
    );
    let service = ChatService::start(llm.clone(), db.clone(), &ChatConfig::default())
        .await
        .unwrap();

    let created = service
        .handle_message(None, "Make a table for orders")
        .await
        .unwrap();
    let counted = service
        .handle_message(None, "How many orders are there?")
        .await
        .unwrap();

    assert_eq!(created.text(), "I created the orders table.");
    assert_eq!(counted.text(), "There are no orders yet.");

    let second_translation = &llm.calls()[4];
    assert!(second_translation[0].content.contains("Table: orders"));
    assert!(second_translation[0].content.contains("placed_at TEXT"));

    let calls = llm.calls();
    let summary_input = &calls[5].last().unwrap().content;
    assert_eq!(
        summary_input,
        "Statement: SELECT COUNT(*) AS total FROM orders\nResult: [{\"total\":0}]"
    );
}

#[tokio::test]
async fn test_insert_reports_changes_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let db = Arc::new(seeded_database(dir.path()).await);
    let llm = Arc::new(
        MockLlmClient::new()
            .then_reply("DATABASE_QUERY")
            .then_reply("```sql\nINSERT INTO users (name) VALUES ('Bob');\n```")
            .then_reply("Bob was added."),
    );
    let service = ChatService::start(llm.clone(), db.clone(), &ChatConfig::default())
        .await
        .unwrap();

    let reply = service.handle_message(None, "Add Bob").await.unwrap();

    assert_eq!(reply, ChatReply::Answer("Bob was added.".to_string()));
    let calls = llm.calls();
    let summary_input = &calls[2].last().unwrap().content;
    assert!(summary_input.ends_with("\nResult: 1 row(s) affected"));

    let rows = db.query("SELECT name FROM users ORDER BY id").await.unwrap();
    assert_eq!(rows.row_count, 2);
}

#[tokio::test]
async fn test_constraint_violation_is_normalized() {
    let dir = tempfile::tempdir().unwrap();
    let db = Arc::new(seeded_database(dir.path()).await);
    let llm = Arc::new(
        MockLlmClient::new()
            .then_reply("DATABASE_QUERY")
            .then_reply("INSERT INTO users (id, name) VALUES (1, 'Alice again')")
            .then_reply("Sorry, a user with that id already exists."),
    );
    let service = ChatService::start(llm.clone(), db.clone(), &ChatConfig::default())
        .await
        .unwrap();

    let reply = service
        .handle_message(None, "Add Alice again with id 1")
        .await
        .unwrap();

    match reply {
        ChatReply::ExecutionFailed { error, reply } => {
            assert_eq!(error.code, "SQLITE_CONSTRAINT");
            assert_eq!(error.sql, "INSERT INTO users (id, name) VALUES (1, 'Alice again')");
            assert!(error.message.contains("UNIQUE constraint failed"));
            assert_eq!(reply, "Sorry, a user with that id already exists.");
        }
        other => panic!("expected execution failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_start_fails_on_unreadable_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("not-a-database.db");
    std::fs::write(&path, b"this is plain text, not sqlite").unwrap();

    // Opening is lazy about the header; reading the catalog is not.
    let opened = db_chat::db::SqliteClient::open(&path).await;
    let result = match opened {
        Ok(db) => {
            ChatService::start(
                Arc::new(MockLlmClient::new()),
                Arc::new(db),
                &ChatConfig::default(),
            )
            .await
            .map(|_| ())
        }
        Err(e) => Err(e),
    };

    assert!(result.is_err());
}
