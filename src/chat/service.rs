//! Chat orchestration.
//!
//! Drives one message through intent classification, translation,
//! sanitization, execution and summarization, and keeps the schema snapshot
//! current after statements that may have changed it.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::intent::{classify_intent, Intent};
use super::session::{ChatSession, SessionRegistry};
use super::summarizer::{summarize, Outcome};
use super::translator::translate;
use crate::config::ChatConfig;
use crate::db::{DatabaseClient, SchemaSnapshot};
use crate::error::{ChatError, ExecutionError, Result};
use crate::llm::{sanitize_statement, LlmClient};
use crate::query::{classify_statement, QueryExecutor};

/// Reply sent when a message does not need the database.
pub const NOT_DATABASE_QUERY_REPLY: &str =
    "This is not a database query. Please ask a question about the database.";

/// The result of handling one chat message.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatReply {
    /// The statement ran and was summarized.
    Answer(String),
    /// The message was not a database request.
    ShortCircuit,
    /// The store rejected the statement; `reply` explains the failure.
    ExecutionFailed { error: ExecutionError, reply: String },
}

impl ChatReply {
    /// Returns the text to show the user.
    pub fn text(&self) -> &str {
        match self {
            Self::Answer(reply) | Self::ExecutionFailed { reply, .. } => reply,
            Self::ShortCircuit => NOT_DATABASE_QUERY_REPLY,
        }
    }
}

/// Reply used when the summarizer cannot explain an execution error.
fn fallback_error_reply(error: &ExecutionError) -> String {
    format!(
        "Sorry, I couldn't run that against the database. The database reported: {}",
        error.message
    )
}

/// Owns the pipeline's shared state: LLM, store, schema and sessions.
pub struct ChatService {
    llm: Arc<dyn LlmClient>,
    db: Arc<dyn DatabaseClient>,
    schema: RwLock<SchemaSnapshot>,
    sessions: SessionRegistry,
    max_pairs: usize,
}

impl ChatService {
    /// Loads the initial schema and creates the service.
    ///
    /// Fails if the catalog cannot be read.
    pub async fn start(
        llm: Arc<dyn LlmClient>,
        db: Arc<dyn DatabaseClient>,
        config: &ChatConfig,
    ) -> Result<Self> {
        let schema = db.load_schema().await?;
        info!(
            tables = schema.tables.len(),
            names = ?schema.table_names(),
            "Loaded database schema"
        );

        Ok(Self {
            llm,
            db,
            schema: RwLock::new(schema),
            sessions: SessionRegistry::new(config.session_mode, config.max_sessions),
            max_pairs: config.max_history_pairs,
        })
    }

    /// Returns a copy of the current schema snapshot.
    pub async fn schema(&self) -> SchemaSnapshot {
        self.schema.read().await.clone()
    }

    /// Returns the session registry.
    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Handles one chat message for the caller identified by `session_id`.
    ///
    /// Execution failures are part of the reply, not an error. Errors are
    /// reserved for empty messages and LLM failures on the success path.
    pub async fn handle_message(&self, session_id: Option<&str>, message: &str) -> Result<ChatReply> {
        if message.trim().is_empty() {
            return Err(ChatError::invalid_request("No message provided"));
        }

        if classify_intent(self.llm.as_ref(), message).await? == Intent::NotDatabaseQuery {
            return Ok(ChatReply::ShortCircuit);
        }

        let key = self.sessions.key_for(session_id);
        let session = {
            let schema = self.schema.read().await;
            self.sessions.get_or_create(&key, &schema).await
        };
        let mut session = session.lock().await;
        {
            let schema = self.schema.read().await;
            if session.sync_schema(&schema) {
                debug!(session = %key, "Refreshed stale translation instruction");
            }
        }

        let raw = translate(
            self.llm.as_ref(),
            &mut session.translation,
            self.max_pairs,
            message,
        )
        .await?;
        let sql = sanitize_statement(&raw);
        let kind = classify_statement(&sql);
        debug!(session = %key, %kind, sql = %sql, "Dispatching statement");

        let executor = QueryExecutor::new(self.db.as_ref());
        match executor.execute(&sql, kind).await {
            Ok(outcome) => {
                if outcome.invalidates_schema() {
                    self.refresh_schema(&mut session).await;
                }
                let reply = summarize(
                    self.llm.as_ref(),
                    &mut session.summarization,
                    self.max_pairs,
                    &sql,
                    Outcome::Success(&outcome),
                )
                .await?;
                Ok(ChatReply::Answer(reply))
            }
            Err(error) => {
                let reply = match summarize(
                    self.llm.as_ref(),
                    &mut session.summarization,
                    self.max_pairs,
                    &sql,
                    Outcome::Failure(&error),
                )
                .await
                {
                    Ok(reply) => reply,
                    Err(e) => {
                        warn!(error = %e, "Could not summarize execution error, using fallback reply");
                        fallback_error_reply(&error)
                    }
                };
                Ok(ChatReply::ExecutionFailed { error, reply })
            }
        }
    }

    /// Reloads the schema and rewrites `session`'s translation instruction.
    ///
    /// On failure the last-known snapshot stays in place.
    async fn refresh_schema(&self, session: &mut ChatSession) {
        match self.db.load_schema().await {
            Ok(schema) => {
                info!(tables = schema.tables.len(), "Reloaded database schema");
                session.apply_schema(&schema);
                *self.schema.write().await = schema;
            }
            Err(e) => {
                warn!(error = %e, "Schema refresh failed, keeping the last-known schema");
            }
        }
    }

    /// Closes the store's connections.
    pub async fn shutdown(&self) {
        self.db.close().await;
    }
}
