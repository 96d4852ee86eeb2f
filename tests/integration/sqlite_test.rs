//! SQLite client tests against on-disk databases.

use db_chat::db::{DatabaseClient, SqliteClient, Value};
use serde_json::json;

use super::seeded_database;

#[tokio::test]
async fn test_large_results_are_capped() {
    let dir = tempfile::tempdir().unwrap();
    let client = SqliteClient::open(&dir.path().join("numbers.db")).await.unwrap();
    client
        .run("CREATE TABLE numbers (n INTEGER NOT NULL)")
        .await
        .unwrap();
    let inserted = client
        .run(
            "WITH RECURSIVE seq(n) AS (SELECT 1 UNION ALL SELECT n + 1 FROM seq WHERE n < 1500) \
             INSERT INTO numbers (n) SELECT n FROM seq",
        )
        .await
        .unwrap();
    assert_eq!(inserted, 1500);

    let result = client.query("SELECT n FROM numbers ORDER BY n").await.unwrap();

    assert!(result.was_truncated);
    assert_eq!(result.row_count, 1000);
    assert_eq!(result.total_rows, 1500);
    assert_eq!(result.rows[999][0], Value::Int(1000));
    assert_eq!(
        result.truncation_note().as_deref(),
        Some("(only the first 1000 of 1500 rows are shown)")
    );
}

#[tokio::test]
async fn test_rows_render_as_json_objects() {
    let dir = tempfile::tempdir().unwrap();
    let client = seeded_database(dir.path()).await;
    client
        .run("INSERT INTO users (id, name) VALUES (2, 'Bob')")
        .await
        .unwrap();

    let result = client
        .query("SELECT id, name, NULL AS note FROM users ORDER BY id")
        .await
        .unwrap();

    assert_eq!(
        result.to_json(),
        json!([
            { "id": 1, "name": "Alice", "note": null },
            { "id": 2, "name": "Bob", "note": null },
        ])
    );
}

#[tokio::test]
async fn test_schema_follows_ddl() {
    let dir = tempfile::tempdir().unwrap();
    let client = seeded_database(dir.path()).await;

    client
        .run("CREATE TABLE orders (id INTEGER PRIMARY KEY, total REAL)")
        .await
        .unwrap();
    client
        .run("CREATE INDEX idx_orders_total ON orders (total)")
        .await
        .unwrap();

    let schema = client.load_schema().await.unwrap();

    assert_eq!(schema.table_names(), vec!["users", "orders"]);
    assert!(schema.format_for_llm().contains("Schema: CREATE TABLE orders"));

    client.run("DROP TABLE orders").await.unwrap();
    assert_eq!(client.load_schema().await.unwrap().table_names(), vec!["users"]);
}

#[tokio::test]
async fn test_unknown_table_error_keeps_statement() {
    let dir = tempfile::tempdir().unwrap();
    let client = seeded_database(dir.path()).await;

    let err = client.query("SELECT * FROM nonexistent").await.unwrap_err();

    assert_eq!(err.code, "SQLITE_ERROR");
    assert_eq!(err.message, "no such table: nonexistent");
    assert_eq!(err.sql, "SELECT * FROM nonexistent");
}
