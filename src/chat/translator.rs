//! Natural language to SQL translation.

use tracing::debug;

use super::converse;
use crate::error::Result;
use crate::llm::{ConversationContext, LlmClient};

/// Translates `message` into statement text using the session's
/// translation context.
///
/// The reply is returned verbatim; fences are removed by the sanitizer.
pub async fn translate(
    llm: &dyn LlmClient,
    context: &mut ConversationContext,
    max_pairs: usize,
    message: &str,
) -> Result<String> {
    let reply = converse(llm, context, max_pairs, message).await?;
    debug!(history = context.len(), reply_len = reply.len(), "Translated message");
    Ok(reply)
}
