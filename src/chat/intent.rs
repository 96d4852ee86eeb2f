//! Intent classification: does a message need the database at all?

use tracing::{debug, warn};

use crate::error::Result;
use crate::llm::prompt::{build_intent_messages, DATABASE_QUERY_LABEL, NOT_DATABASE_QUERY_LABEL};
use crate::llm::LlmClient;

/// Whether a chat message should go through the SQL pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    DatabaseQuery,
    NotDatabaseQuery,
}

impl Intent {
    /// Maps a classifier reply onto an intent.
    ///
    /// Anything other than the two exact labels counts as a database query.
    fn from_label(label: &str) -> Self {
        match label.trim() {
            NOT_DATABASE_QUERY_LABEL => Self::NotDatabaseQuery,
            DATABASE_QUERY_LABEL => Self::DatabaseQuery,
            other => {
                warn!(reply = other, "Unexpected intent label, treating as a database query");
                Self::DatabaseQuery
            }
        }
    }
}

/// Classifies `message` with a single, stateless LLM call.
pub async fn classify_intent(llm: &dyn LlmClient, message: &str) -> Result<Intent> {
    let reply = llm.complete(&build_intent_messages(message)).await?;
    let intent = Intent::from_label(&reply);
    debug!(?intent, message_len = message.len(), "Classified intent");
    Ok(intent)
}
