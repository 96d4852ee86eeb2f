//! Message types for LLM communication.
//!
//! Defines the role-tagged messages sent to LLM providers and the bounded
//! conversational context that keeps a pinned system instruction.

use serde::{Deserialize, Serialize};

/// Role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System message providing context and instructions.
    System,
    /// User message (human input).
    User,
    /// Assistant message (LLM response).
    Assistant,
}

impl Role {
    /// Returns the role as a string for API requests.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A single message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// The role of the message sender.
    pub role: Role,
    /// The content of the message.
    pub content: String,
}

impl Message {
    /// Creates a new message with the given role and content.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Creates a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Creates an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// An ordered conversation anchored by a pinned system instruction.
///
/// Entry 0 is always the system instruction. It is never evicted and is the
/// only entry ever rewritten in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationContext {
    messages: Vec<Message>,
}

impl ConversationContext {
    /// Creates a context holding only the given system instruction.
    pub fn new(system_instruction: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(system_instruction)],
        }
    }

    /// Returns the pinned system instruction.
    pub fn system_instruction(&self) -> &str {
        &self.messages[0].content
    }

    /// Rewrites the pinned system instruction.
    pub fn set_system_instruction(&mut self, instruction: impl Into<String>) {
        self.messages[0].content = instruction.into();
    }

    /// Removes the oldest user/assistant pairs until at most `max_pairs`
    /// pairs remain after the pinned instruction.
    pub fn trim(&mut self, max_pairs: usize) {
        let limit = 1 + 2 * max_pairs;
        while self.messages.len() > limit {
            // Entries 1 and 2 are the oldest exchange.
            self.messages.drain(1..3.min(self.messages.len()));
        }
    }

    /// Appends one completed exchange.
    pub fn push_exchange(&mut self, user: impl Into<String>, assistant: impl Into<String>) {
        self.messages.push(Message::user(user));
        self.messages.push(Message::assistant(assistant));
    }

    /// Returns the messages to send for a new user turn, without recording it.
    pub fn with_user_turn(&self, content: &str) -> Vec<Message> {
        let mut messages = Vec::with_capacity(self.messages.len() + 1);
        messages.extend(self.messages.iter().cloned());
        messages.push(Message::user(content));
        messages
    }

    /// Returns all messages in the context.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns the number of messages, including the pinned instruction.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true if no exchanges have been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.messages.len() <= 1
    }
}
