//! HTTP-level tests for `POST /api/chat` and the surrounding routes.

use axum::body::Body;
use axum::http::Request;
use pretty_assertions::assert_eq;
use serde_json::json;

use db_chat::chat::NOT_DATABASE_QUERY_REPLY;
use db_chat::config::{ChatConfig, SessionMode};
use db_chat::db::DatabaseClient;
use db_chat::llm::MockLlmClient;
use db_chat::server::build_router;
use tower::ServiceExt;

use super::{test_app, test_app_with_config, test_app_with_mode};

#[tokio::test]
async fn test_small_talk_short_circuits() {
    let app = test_app(MockLlmClient::new().then_reply("NOT_DATABASE_QUERY")).await;

    let (status, body) = app.post_chat(r#"{"message": "Tell me a joke"}"#).await;

    assert_eq!(status, 200);
    assert_eq!(body, json!({ "reply": NOT_DATABASE_QUERY_REPLY }));
    assert_eq!(app.llm.call_count(), 1);
}

#[tokio::test]
async fn test_select_is_summarized() {
    let llm = MockLlmClient::new()
        .then_reply("DATABASE_QUERY")
        .then_reply("```sql\nSELECT * FROM users;\n```")
        .then_reply("There is one user, Alice.");
    let app = test_app(llm).await;

    let (status, body) = app.post_chat(r#"{"message": "Show me all users"}"#).await;

    assert_eq!(status, 200);
    assert_eq!(body, json!({ "reply": "There is one user, Alice." }));

    let summary_input = app.llm.calls()[2].last().unwrap().content.clone();
    assert_eq!(
        summary_input,
        "Statement: SELECT * FROM users;\nResult: [{\"id\":1,\"name\":\"Alice\"}]"
    );
}

#[tokio::test]
async fn test_drop_table_refreshes_schema() {
    let llm = MockLlmClient::new()
        .then_reply("DATABASE_QUERY")
        .then_reply("DROP TABLE users;")
        .then_reply("Done, the users table is gone.");
    let app = test_app(llm).await;
    assert_eq!(app.service.schema().await.table_names(), vec!["users"]);

    let (status, body) = app
        .post_chat(r#"{"message": "Delete the users table"}"#)
        .await;

    assert_eq!(status, 200);
    assert_eq!(body["reply"], "Done, the users table is gone.");
    assert!(app.service.schema().await.is_empty());
    assert!(app.db.load_schema().await.unwrap().is_empty());

    let summary_input = app.llm.calls()[2].last().unwrap().content.clone();
    assert!(summary_input.ends_with("\nResult: 0 row(s) affected"));
}

#[tokio::test]
async fn test_rejected_statement_returns_400_with_details() {
    let llm = MockLlmClient::new()
        .then_reply("DATABASE_QUERY")
        .then_reply("INSERT INTO users (nonexistent) VALUES (1);")
        .then_reply("Sorry, the users table has no column called nonexistent.");
    let app = test_app(llm).await;

    let (status, body) = app
        .post_chat(r#"{"message": "Add a row with a nonexistent column"}"#)
        .await;

    assert_eq!(status, 400);
    assert_eq!(body["error"], "Failed to execute SQL query");
    assert!(body["details"]
        .as_str()
        .unwrap()
        .contains("no column named nonexistent"));
    assert_eq!(body["code"], "SQLITE_ERROR");
    assert_eq!(body["sql"], "INSERT INTO users (nonexistent) VALUES (1);");
    assert_eq!(
        body["reply"],
        "Sorry, the users table has no column called nonexistent."
    );
    // The schema is untouched.
    assert_eq!(app.service.schema().await.table_names(), vec!["users"]);
}

#[tokio::test]
async fn test_missing_message_is_rejected() {
    let app = test_app(MockLlmClient::new()).await;

    let (status, body) = app.post_chat("{}").await;

    assert_eq!(status, 400);
    assert_eq!(body, json!({ "error": "No message provided in request body" }));
    assert_eq!(app.llm.call_count(), 0);
}

#[tokio::test]
async fn test_blank_message_is_rejected() {
    let app = test_app(MockLlmClient::new()).await;

    for body in [r#"{"message": ""}"#, r#"{"message": "   \n"}"#, r#"{"message": null}"#] {
        let (status, response) = app.post_chat(body).await;
        assert_eq!(status, 400, "body {body}");
        assert_eq!(response["error"], "No message provided in request body");
    }
    assert_eq!(app.llm.call_count(), 0);
}

#[tokio::test]
async fn test_malformed_json_is_rejected() {
    let app = test_app(MockLlmClient::new()).await;

    let (status, body) = app.post_chat(r#"{"message": "Show me"#).await;

    assert_eq!(status, 400);
    assert_eq!(body, json!({ "error": "Invalid JSON in request body" }));
}

#[tokio::test]
async fn test_llm_failure_returns_500() {
    let app = test_app(MockLlmClient::new().then_fail("connection refused")).await;

    let (status, body) = app.post_chat(r#"{"message": "Show me all users"}"#).await;

    assert_eq!(status, 500);
    assert_eq!(body, json!({ "error": "Failed to process chat message" }));
}

#[tokio::test]
async fn test_follow_up_uses_shared_history() {
    let app = test_app(MockLlmClient::new()).await;

    app.post_chat(r#"{"message": "Show me all users"}"#).await;
    let (status, _) = app.post_chat(r#"{"message": "Count the users"}"#).await;

    assert_eq!(status, 200);
    let second_translation = &app.llm.calls()[4];
    assert_eq!(second_translation.len(), 4);
    assert_eq!(second_translation[1].content, "Show me all users");
}

#[tokio::test]
async fn test_per_client_sessions_do_not_share_history() {
    let app = test_app_with_mode(MockLlmClient::new(), SessionMode::PerClient).await;

    let (first, _) = app.post_chat_as("alice", "Show me all users").await;
    let (second, _) = app.post_chat_as("bob", "Show me all users").await;

    assert_eq!(first, 200);
    assert_eq!(second, 200);
    // Bob's translation call carries only the instruction and his message.
    assert_eq!(app.llm.calls()[4].len(), 2);
    assert_eq!(app.service.sessions().len().await, 2);
}

#[tokio::test]
async fn test_session_ids_beyond_cap_evict_oldest() {
    let config = ChatConfig {
        session_mode: SessionMode::PerClient,
        max_sessions: 20,
        ..ChatConfig::default()
    };
    let app = test_app_with_config(MockLlmClient::new(), config).await;

    for i in 0..200 {
        let (status, _) = app
            .post_chat_as(&format!("visitor-{i}"), "Show me all users")
            .await;
        assert_eq!(status, 200);
    }

    assert_eq!(app.service.sessions().len().await, 20);
    assert!(app.service.sessions().contains("visitor-199").await);
    assert!(!app.service.sessions().contains("visitor-0").await);
}

#[tokio::test]
async fn test_healthz() {
    let app = test_app(MockLlmClient::new()).await;

    let response = app
        .send(Request::get("/healthz").body(Body::empty()).unwrap())
        .await;

    assert_eq!(response.status().as_u16(), 200);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn test_static_widget_is_served() {
    let app = test_app(MockLlmClient::new()).await;
    assert!(app.dir.path().join("static/index.html").exists());

    let response = app
        .send(Request::get("/").body(Body::empty()).unwrap())
        .await;

    assert_eq!(response.status().as_u16(), 200);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains("db-chat widget"));
}

#[tokio::test]
async fn test_bundled_widget_sends_session_id() {
    let app = test_app(MockLlmClient::new()).await;
    let static_dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("static");
    let router = build_router(app.service.clone(), &static_dir);

    let response = router
        .oneshot(Request::get("/chatWindow.js").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let script = String::from_utf8_lossy(&bytes);
    assert!(script.contains("crypto.randomUUID()"));
    assert!(script.contains("\"X-Session-Id\": sessionId"));
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let app = test_app(MockLlmClient::new().then_reply("NOT_DATABASE_QUERY")).await;

    let response = app
        .send(
            Request::post("/api/chat")
                .header("origin", "http://example.com")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"message": "hello"}"#))
                .unwrap(),
        )
        .await;

    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "*"
    );
}
