//! Completion clients: the black-box text-completion boundary.
//!
//! Every stage of the pipeline is a single `complete` call. Clients never
//! retry: a failure is reported once and the pipeline carries it forward.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::llm_subprocess::ClaudeCliClient;
use crate::config::{CompletionConfig, CompletionProvider};
use crate::{AiError, AiResult};

/// Abstraction du service de completion
pub trait CompletionClient: Send + Sync {
    fn id(&self) -> &str;
    fn complete(&self, prompt: &str) -> AiResult<String>;
}

/// Build the client selected in the config.
pub fn client_from_config(config: &CompletionConfig) -> Box<dyn CompletionClient> {
    match config.provider {
        CompletionProvider::ChatApi => Box::new(ChatCompletionClient::from_config(config)),
        CompletionProvider::ClaudeCli => Box::new(ClaudeCliClient::new(&config.model)),
    }
}

/// OpenAI-compatible `/chat/completions` client (Groq, OpenAI, local gateways).
pub struct ChatCompletionClient {
    api_key: Option<String>,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
}

pub(crate) fn chat_endpoint(base_url: &str) -> String {
    let normalized = base_url.trim_end_matches('/');
    if normalized.ends_with("/chat/completions") {
        normalized.to_string()
    } else {
        format!("{normalized}/chat/completions")
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletionClient {
    pub fn from_config(config: &CompletionConfig) -> Self {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty());
        Self {
            api_key,
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

impl CompletionClient for ChatCompletionClient {
    fn id(&self) -> &str {
        &self.model
    }

    fn complete(&self, prompt: &str) -> AiResult<String> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AiError::ExternalService("completion API key not set".into()))?;

        tracing::info!(model = %self.model, prompt_len = prompt.len(), "Chat completion call starting");

        let req = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let mut response = ureq::post(&chat_endpoint(&self.base_url))
            .header("Authorization", &format!("Bearer {}", key))
            .config()
            .timeout_global(Some(self.timeout))
            .build()
            .send_json(&req)
            .map_err(|e| AiError::ExternalService(format!("chat completion request failed: {}", e)))?;

        let body: ChatResponse = response
            .body_mut()
            .read_json()
            .map_err(|e| AiError::ExternalService(format!("invalid chat completion response: {}", e)))?;

        let text = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(AiError::ExternalService("completion returned empty response".into()));
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_endpoint() {
        assert_eq!(
            chat_endpoint("https://api.groq.com/openai/v1"),
            "https://api.groq.com/openai/v1/chat/completions"
        );
        assert_eq!(
            chat_endpoint("https://api.openai.com/v1/chat/completions/"),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_missing_key_is_external_service_error() {
        let config = CompletionConfig {
            api_key_env: "MATH_MENTOR_TEST_UNSET_COMPLETION_KEY".into(),
            ..CompletionConfig::default()
        };
        let client = ChatCompletionClient::from_config(&config);
        assert!(matches!(client.complete("2+2"), Err(AiError::ExternalService(_))));
    }

    #[test]
    fn test_client_from_config_selects_provider() {
        let mut config = CompletionConfig::default();
        config.provider = CompletionProvider::ClaudeCli;
        config.model = "haiku".into();
        assert_eq!(client_from_config(&config).id(), "claude-cli:haiku");
    }
}
