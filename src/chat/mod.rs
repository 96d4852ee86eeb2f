//! The chat pipeline.
//!
//! A message is classified for intent, translated into SQL, sanitized,
//! executed and summarized. Translation and summarization each keep their
//! own bounded conversation per session.

mod intent;
mod service;
mod session;
mod summarizer;
mod translator;

pub use intent::{classify_intent, Intent};
pub use service::{ChatReply, ChatService, NOT_DATABASE_QUERY_REPLY};
pub use session::{ChatSession, SessionRegistry, SHARED_SESSION_KEY};
pub use summarizer::{render_outcome, summarize, Outcome};
pub use translator::translate;

use crate::error::Result;
use crate::llm::{ConversationContext, LlmClient};

/// Sends one user turn through `context`.
///
/// The context is trimmed first. The turn and the reply are recorded only
/// when the call succeeds.
async fn converse(
    llm: &dyn LlmClient,
    context: &mut ConversationContext,
    max_pairs: usize,
    user_turn: &str,
) -> Result<String> {
    context.trim(max_pairs);
    let reply = llm.complete(&context.with_user_turn(user_turn)).await?;
    context.push_exchange(user_turn, reply.clone());
    Ok(reply)
}
