//! Integration tests for db-chat.
//!
//! Shared fixtures: a seeded temporary SQLite database, a scripted mock
//! LLM and the application router built on top of them.

pub mod chat_api_test;
pub mod pipeline_test;
pub mod sqlite_test;

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use tempfile::TempDir;
use tower::ServiceExt;

use db_chat::chat::ChatService;
use db_chat::config::{ChatConfig, SessionMode};
use db_chat::db::SqliteClient;
use db_chat::llm::MockLlmClient;
use db_chat::server::build_router;

/// A running pipeline over a throwaway database.
pub struct TestApp {
    pub router: Router,
    pub service: Arc<ChatService>,
    pub llm: Arc<MockLlmClient>,
    pub db: Arc<SqliteClient>,
    pub dir: TempDir,
}

/// Opens a database in `dir` holding a `users` table with Alice in it.
pub async fn seeded_database(dir: &Path) -> SqliteClient {
    let client = SqliteClient::open(&dir.join("database.db")).await.unwrap();
    sqlx::query("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL)")
        .execute(client.pool())
        .await
        .unwrap();
    sqlx::query("INSERT INTO users (id, name) VALUES (1, 'Alice')")
        .execute(client.pool())
        .await
        .unwrap();
    client
}

/// Builds the app with the given mock LLM in shared session mode.
pub async fn test_app(llm: MockLlmClient) -> TestApp {
    test_app_with_mode(llm, SessionMode::Shared).await
}

/// Builds the app with the given mock LLM and session mode.
pub async fn test_app_with_mode(llm: MockLlmClient, mode: SessionMode) -> TestApp {
    let config = ChatConfig {
        session_mode: mode,
        ..ChatConfig::default()
    };
    test_app_with_config(llm, config).await
}

/// Builds the app with the given mock LLM and chat settings.
pub async fn test_app_with_config(llm: MockLlmClient, config: ChatConfig) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let db = Arc::new(seeded_database(dir.path()).await);
    let llm = Arc::new(llm);

    let service = Arc::new(
        ChatService::start(llm.clone(), db.clone(), &config)
            .await
            .unwrap(),
    );

    let static_dir = dir.path().join("static");
    std::fs::create_dir_all(&static_dir).unwrap();
    std::fs::write(
        static_dir.join("index.html"),
        "<html><body>db-chat widget</body></html>",
    )
    .unwrap();

    let router = build_router(service.clone(), &static_dir);
    TestApp {
        router,
        service,
        llm,
        db,
        dir,
    }
}

impl TestApp {
    /// Sends a raw request through the router.
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Posts `body` to `/api/chat` as JSON.
    pub async fn post_chat(&self, body: &str) -> (u16, serde_json::Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        read_json(self.send(request).await).await
    }

    /// Posts `{message}` to `/api/chat` under a session id.
    pub async fn post_chat_as(&self, session_id: &str, message: &str) -> (u16, serde_json::Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header("content-type", "application/json")
            .header("x-session-id", session_id)
            .body(Body::from(serde_json::json!({ "message": message }).to_string()))
            .unwrap();
        read_json(self.send(request).await).await
    }
}

/// Reads a response's status and JSON body.
pub async fn read_json(response: Response<Body>) -> (u16, serde_json::Value) {
    let status = response.status().as_u16();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}
