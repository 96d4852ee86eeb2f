//! Plain-language summaries of execution outcomes.

use tracing::debug;

use super::converse;
use crate::error::{ExecutionError, Result};
use crate::llm::{ConversationContext, LlmClient};
use crate::query::ExecutionOutcome;

/// What the summarizer is asked to explain.
#[derive(Debug, Clone, Copy)]
pub enum Outcome<'a> {
    Success(&'a ExecutionOutcome),
    Failure(&'a ExecutionError),
}

/// Renders a statement and its outcome as the summarizer's user turn.
pub fn render_outcome(sql: &str, outcome: Outcome<'_>) -> String {
    let mut text = format!("Statement: {sql}");
    match outcome {
        Outcome::Success(ExecutionOutcome::Rows(result)) => {
            text.push_str(&format!("\nResult: {}", result.to_json()));
            if let Some(note) = result.truncation_note() {
                text.push('\n');
                text.push_str(&note);
            }
        }
        Outcome::Success(ExecutionOutcome::Changes { changes, .. }) => {
            text.push_str(&format!("\nResult: {changes} row(s) affected"));
        }
        Outcome::Failure(error) => {
            text.push_str(&format!("\nError: {} ({})", error.message, error.code));
        }
    }
    text
}

/// Explains `outcome` using the session's summarization context.
pub async fn summarize(
    llm: &dyn LlmClient,
    context: &mut ConversationContext,
    max_pairs: usize,
    sql: &str,
    outcome: Outcome<'_>,
) -> Result<String> {
    let rendered = render_outcome(sql, outcome);
    let reply = converse(llm, context, max_pairs, &rendered).await?;
    debug!(history = context.len(), reply_len = reply.len(), "Summarized outcome");
    Ok(reply)
}
