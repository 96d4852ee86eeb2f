//! Per-caller conversational state.
//!
//! A session owns the translation and summarization contexts. Sessions live
//! in a bounded registry keyed by caller; in shared mode every caller maps
//! to the same session.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::SessionMode;
use crate::db::SchemaSnapshot;
use crate::llm::prompt::{build_summary_prompt, build_translation_prompt};
use crate::llm::ConversationContext;

/// Registry key used for every caller in shared mode, and for callers that
/// send no session id in per-client mode.
pub const SHARED_SESSION_KEY: &str = "shared";

/// The two conversation histories kept for one caller.
#[derive(Debug, Clone)]
pub struct ChatSession {
    /// History of questions and generated statements.
    pub translation: ConversationContext,
    /// History of rendered outcomes and their explanations.
    pub summarization: ConversationContext,
    /// Hash of the schema embedded in the translation instruction.
    schema_hash: u64,
}

impl ChatSession {
    /// Creates a session whose translation instruction embeds `schema`.
    pub fn new(schema: &SchemaSnapshot) -> Self {
        Self {
            translation: ConversationContext::new(build_translation_prompt(schema)),
            summarization: ConversationContext::new(build_summary_prompt()),
            schema_hash: schema.content_hash(),
        }
    }

    /// Rewrites the translation instruction if `schema` differs from the one
    /// it embeds. Returns true when a rewrite happened.
    pub fn sync_schema(&mut self, schema: &SchemaSnapshot) -> bool {
        if schema.content_hash() == self.schema_hash {
            return false;
        }
        self.apply_schema(schema);
        true
    }

    /// Rewrites the translation instruction with `schema`.
    pub fn apply_schema(&mut self, schema: &SchemaSnapshot) {
        self.translation
            .set_system_instruction(build_translation_prompt(schema));
        self.schema_hash = schema.content_hash();
    }
}

/// A registered session and the tick of its last use.
#[derive(Debug)]
struct SessionEntry {
    session: Arc<Mutex<ChatSession>>,
    last_used: u64,
}

#[derive(Debug, Default)]
struct RegistryState {
    entries: HashMap<String, SessionEntry>,
    clock: u64,
}

/// Sessions keyed by caller, capped at `max_sessions` entries.
///
/// When a new session would exceed the cap, the least recently used one is
/// dropped. A request still holding a dropped session finishes with it.
#[derive(Debug)]
pub struct SessionRegistry {
    mode: SessionMode,
    max_sessions: usize,
    state: Mutex<RegistryState>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    pub fn new(mode: SessionMode, max_sessions: usize) -> Self {
        Self {
            mode,
            max_sessions: max_sessions.max(1),
            state: Mutex::new(RegistryState::default()),
        }
    }

    /// Maps a caller-supplied session id onto a registry key.
    pub fn key_for(&self, session_id: Option<&str>) -> String {
        match self.mode {
            SessionMode::Shared => SHARED_SESSION_KEY.to_string(),
            SessionMode::PerClient => session_id
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .unwrap_or(SHARED_SESSION_KEY)
                .to_string(),
        }
    }

    /// Returns the session for `key`, creating it from `schema` if needed.
    pub async fn get_or_create(&self, key: &str, schema: &SchemaSnapshot) -> Arc<Mutex<ChatSession>> {
        let mut state = self.state.lock().await;
        state.clock += 1;
        let tick = state.clock;

        if let Some(entry) = state.entries.get_mut(key) {
            entry.last_used = tick;
            return entry.session.clone();
        }

        while state.entries.len() >= self.max_sessions {
            let Some(oldest) = state
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(key, _)| key.clone())
            else {
                break;
            };
            state.entries.remove(&oldest);
            debug!(session = %oldest, "Evicted least recently used chat session");
        }

        let session = Arc::new(Mutex::new(ChatSession::new(schema)));
        state.entries.insert(
            key.to_string(),
            SessionEntry {
                session: session.clone(),
                last_used: tick,
            },
        );
        debug!(session = key, "Created chat session");
        session
    }

    /// Returns true if a session is registered under `key`.
    pub async fn contains(&self, key: &str) -> bool {
        self.state.lock().await.entries.contains_key(key)
    }

    /// Returns the number of registered sessions.
    pub async fn len(&self) -> usize {
        self.state.lock().await.entries.len()
    }

    /// Returns true if no session is registered.
    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.entries.is_empty()
    }
}
