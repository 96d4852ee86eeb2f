//! Prompt construction for LLM requests.
//!
//! Holds the fixed instructions for intent classification, SQL translation
//! and result summarization.

use crate::db::SchemaSnapshot;
use crate::llm::types::Message;

/// Label the intent classifier returns for database requests.
pub const DATABASE_QUERY_LABEL: &str = "DATABASE_QUERY";

/// Label the intent classifier returns for everything else.
pub const NOT_DATABASE_QUERY_LABEL: &str = "NOT_DATABASE_QUERY";

const INTENT_INSTRUCTION: &str = r#"You decide whether a chat message is a request that needs the database.
Answer with exactly one label and nothing else:
- DATABASE_QUERY if the message asks to read, add, change or remove stored data, or to change tables
- NOT_DATABASE_QUERY for greetings, small talk, jokes and anything unrelated to the stored data"#;

/// Worked examples: one temporal filter request, one conversational message.
const INTENT_EXAMPLES: [(&str, &str); 2] = [
    (
        "Show me all orders placed in the last 7 days",
        DATABASE_QUERY_LABEL,
    ),
    ("Hi there, how is your day going?", NOT_DATABASE_QUERY_LABEL),
];

/// System prompt template for SQL translation.
const TRANSLATION_PROMPT_TEMPLATE: &str = r#"You translate questions and instructions about a SQLite database into SQL.

DATABASE SCHEMA:
{schema}

INSTRUCTIONS:
- Generate a single valid SQLite statement
- Return ONLY the SQL statement: no explanations, no commentary, no prose
- Use only tables and columns from the schema above
- Earlier messages in this conversation may be referenced by the user"#;

/// System prompt for result summarization.
const SUMMARY_PROMPT: &str = r#"You explain the outcome of SQL statements to people who do not know SQL.
Each message gives the statement that ran and either its result or the error it produced.
- For results, describe what was found or changed in plain, friendly language
- For errors, apologize briefly and explain what went wrong and how the request could be rephrased
- Never show SQL unless the user asks for it"#;

/// Builds the message list for one intent classification call.
pub fn build_intent_messages(message: &str) -> Vec<Message> {
    let mut messages = Vec::with_capacity(2 + INTENT_EXAMPLES.len() * 2);
    messages.push(Message::system(INTENT_INSTRUCTION));
    for (example, label) in INTENT_EXAMPLES {
        messages.push(Message::user(example));
        messages.push(Message::assistant(label));
    }
    messages.push(Message::user(message));
    messages
}

/// Builds the translation system instruction with the schema injected.
pub fn build_translation_prompt(schema: &SchemaSnapshot) -> String {
    let schema_text = if schema.is_empty() {
        "(the database has no tables yet)".to_string()
    } else {
        schema.format_for_llm()
    };
    TRANSLATION_PROMPT_TEMPLATE.replace("{schema}", &schema_text)
}

/// Returns the summarization system instruction.
pub fn build_summary_prompt() -> String {
    SUMMARY_PROMPT.to_string()
}
