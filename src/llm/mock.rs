//! Mock LLM client for testing.
//!
//! Provides deterministic responses: scripted replies first, then canned
//! responses based on input patterns. Every call is recorded.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::{ChatError, Result};
use crate::llm::prompt::{DATABASE_QUERY_LABEL, NOT_DATABASE_QUERY_LABEL};
use crate::llm::types::{Message, Role};
use crate::llm::LlmClient;

/// A scripted reply.
#[derive(Debug, Clone)]
enum ScriptedReply {
    Text(String),
    Failure(String),
}

/// Mock LLM client that returns canned responses.
///
/// Used for unit testing and for running the server without an API key.
#[derive(Debug, Default)]
pub struct MockLlmClient {
    /// Custom response mappings (pattern -> response).
    custom_responses: Vec<(String, String)>,
    /// Replies consumed in order before pattern matching applies.
    script: Mutex<VecDeque<ScriptedReply>>,
    /// Every message list received, in call order.
    calls: Mutex<Vec<Vec<Message>>>,
}

impl MockLlmClient {
    /// Creates a new mock client with default responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a custom response mapping.
    ///
    /// When the last user message contains `pattern`, the mock returns `response`.
    pub fn with_response(
        mut self,
        pattern: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        self.custom_responses
            .push((pattern.into(), response.into()));
        self
    }

    /// Queues a reply for the next unscripted call.
    pub fn then_reply(self, reply: impl Into<String>) -> Self {
        self.push(ScriptedReply::Text(reply.into()));
        self
    }

    /// Queues a failure for the next unscripted call.
    pub fn then_fail(self, message: impl Into<String>) -> Self {
        self.push(ScriptedReply::Failure(message.into()));
        self
    }

    /// Returns how many completions were requested.
    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("mock call log poisoned").len()
    }

    /// Returns the message lists received, in call order.
    pub fn calls(&self) -> Vec<Vec<Message>> {
        self.calls.lock().expect("mock call log poisoned").clone()
    }

    fn push(&self, reply: ScriptedReply) {
        self.script
            .lock()
            .expect("mock script poisoned")
            .push_back(reply);
    }

    /// Generates a mock response based on the input.
    fn mock_response(&self, messages: &[Message]) -> String {
        let input = Self::extract_user_input(messages);
        let input_lower = input.to_lowercase();

        for (pattern, response) in &self.custom_responses {
            if input_lower.contains(&pattern.to_lowercase()) {
                return response.clone();
            }
        }

        let is_intent_request = messages
            .first()
            .is_some_and(|m| m.role == Role::System && m.content.contains(NOT_DATABASE_QUERY_LABEL));
        if is_intent_request {
            let chatter = ["joke", "hello", "how are you", "weather", "thank"];
            return if chatter.iter().any(|word| input_lower.contains(word)) {
                NOT_DATABASE_QUERY_LABEL.to_string()
            } else {
                DATABASE_QUERY_LABEL.to_string()
            };
        }

        if input.starts_with("Statement:") {
            return if input.contains("\nError:") {
                "Sorry, the database rejected that request.".to_string()
            } else {
                "The request completed successfully.".to_string()
            };
        }

        if input_lower.contains("all users") || input_lower.contains("show users") {
            return "```sql\nSELECT * FROM users;\n```".to_string();
        }

        if input_lower.contains("count") && input_lower.contains("users") {
            return "```sql\nSELECT COUNT(*) FROM users;\n```".to_string();
        }

        if (input_lower.contains("insert") || input_lower.contains("add"))
            && input_lower.contains("user")
        {
            return "```sql\nINSERT INTO users (name) VALUES ('Test User');\n```".to_string();
        }

        if input_lower.contains("update") && input_lower.contains("user") {
            return "```sql\nUPDATE users SET name = 'Updated Name' WHERE id = 1;\n```".to_string();
        }

        if input_lower.contains("delete") && input_lower.contains("user") {
            return "```sql\nDELETE FROM users WHERE id = 1;\n```".to_string();
        }

        "SELECT 'I could not map that question to the schema' AS answer;".to_string()
    }

    /// Extracts the last user message content from a message list.
    fn extract_user_input(messages: &[Message]) -> String {
        messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        self.calls
            .lock()
            .expect("mock call log poisoned")
            .push(messages.to_vec());

        let scripted = self.script.lock().expect("mock script poisoned").pop_front();
        match scripted {
            Some(ScriptedReply::Text(text)) => Ok(text),
            Some(ScriptedReply::Failure(message)) => Err(ChatError::llm(message)),
            None => Ok(self.mock_response(messages)),
        }
    }
}
