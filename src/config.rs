//! Configuration management for db-chat.
//!
//! Handles loading configuration from a TOML file, with server, database,
//! LLM, chat-history and logging sections. Every field has a default so a
//! missing file is a valid configuration.

use crate::error::{ChatError, Result};
use crate::llm::LlmProvider;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for db-chat.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Relational store configuration.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// LLM provider configuration.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Conversation handling configuration.
    #[serde(default)]
    pub chat: ChatConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding the chat widget assets.
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

impl ServerConfig {
    /// Returns the `host:port` bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Relational store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub path: PathBuf,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("database.db")
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

/// LLM provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// LLM provider: "openai", "ollama" or "mock".
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Model name; each provider has its own default.
    #[serde(default)]
    pub model: Option<String>,

    /// Override for the provider's API base URL.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            base_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// How conversational state is partitioned between callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    /// Every caller shares one session.
    #[default]
    Shared,
    /// Callers are separated by the `X-Session-Id` header.
    PerClient,
}

/// Conversation handling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Exchanges kept in each context besides the pinned instruction.
    #[serde(default = "default_max_history_pairs")]
    pub max_history_pairs: usize,

    /// Session partitioning.
    #[serde(default)]
    pub session_mode: SessionMode,

    /// Sessions kept in per-client mode before the least recently used one
    /// is dropped.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

fn default_max_history_pairs() -> usize {
    10
}

fn default_max_sessions() -> usize {
    100
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_history_pairs: default_max_history_pairs(),
            session_mode: SessionMode::default(),
            max_sessions: default_max_sessions(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoggingConfig {
    /// Write logs to this file instead of stderr.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("db-chat")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file.
    ///
    /// A missing file yields the default configuration.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ChatError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            ChatError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }

    /// Checks values that parse but cannot work.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(ChatError::config("server.port must be greater than 0"));
        }
        if self.chat.max_history_pairs == 0 {
            return Err(ChatError::config(
                "chat.max_history_pairs must be at least 1",
            ));
        }
        if self.chat.max_sessions == 0 {
            return Err(ChatError::config("chat.max_sessions must be at least 1"));
        }
        if self.llm.timeout_secs == 0 {
            return Err(ChatError::config("llm.timeout_secs must be at least 1"));
        }
        self.llm
            .provider
            .parse::<LlmProvider>()
            .map_err(|e| ChatError::config(format!("llm.provider: {e}")))?;
        Ok(())
    }
}
