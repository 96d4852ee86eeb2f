//! LLM client factory.
//!
//! Centralizes provider-specific logic for creating LLM clients.

use std::sync::Arc;

use crate::config::LlmConfig;
use crate::error::{ChatError, Result};
use crate::llm::ollama::DEFAULT_OLLAMA_MODEL;
use crate::llm::openai::DEFAULT_OPENAI_MODEL;
use crate::llm::{
    LlmClient, LlmProvider, MockLlmClient, OllamaClient, OllamaConfig, OpenAiClient,
    OpenAiConfig,
};

/// Creates an LLM client from the `[llm]` configuration.
///
/// The OpenAI API key is read from `OPENAI_API_KEY`; it is never taken from
/// the config file.
pub fn create_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>> {
    let provider: LlmProvider = config.provider.parse().map_err(ChatError::config)?;
    create_client_with_key(provider, config, std::env::var("OPENAI_API_KEY").ok())
}

fn create_client_with_key(
    provider: LlmProvider,
    config: &LlmConfig,
    api_key: Option<String>,
) -> Result<Arc<dyn LlmClient>> {
    match provider {
        LlmProvider::OpenAi => {
            let key = api_key
                .filter(|key| !key.trim().is_empty())
                .ok_or_else(|| ChatError::llm("No API key configured. Set OPENAI_API_KEY."))?;
            let model = config
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string());
            let mut openai = OpenAiConfig::new(key, model).with_timeout(config.timeout_secs);
            if let Some(url) = &config.base_url {
                openai = openai.with_url(url.clone());
            }
            Ok(Arc::new(OpenAiClient::new(openai)?))
        }
        LlmProvider::Ollama => {
            let model = config
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string());
            let mut ollama = OllamaConfig::new(model).with_timeout(config.timeout_secs);
            if let Some(url) = &config.base_url {
                ollama = ollama.with_url(url.clone());
            }
            Ok(Arc::new(OllamaClient::new(ollama)?))
        }
        LlmProvider::Mock => Ok(Arc::new(MockLlmClient::new())),
    }
}
