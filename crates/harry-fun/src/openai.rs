//! OpenAI-compatible chat completion client used for comebacks.

use async_trait::async_trait;
use harry_common::{redact_api_key, with_retry, HarryError, RetryPolicy};
use harry_config::AiConfig;
use harry_monitoring::CostTracker;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{FunError, FunResult};
use crate::traits::TextGenerator;

const TEMPERATURE: f32 = 0.9;

/// Generates text through a `/chat/completions` endpoint.
///
/// Transient failures (connection errors, 429 and 5xx) are retried with
/// backoff. Token usage of every successful call is recorded against the
/// AI budget when a cost tracker is attached.
#[derive(Clone)]
pub struct OpenAiGenerator {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    retry: RetryPolicy,
    costs: Option<Arc<CostTracker>>,
}

impl std::fmt::Debug for OpenAiGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiGenerator")
            .field("endpoint", &self.endpoint)
            .field("api_key", &redact_api_key(&self.api_key))
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl OpenAiGenerator {
    /// Creates a client from configuration.
    pub fn new(config: &AiConfig, costs: Option<Arc<CostTracker>>) -> harry_common::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| HarryError::config_with_source("Failed to build HTTP client", e))?;

        info!(
            "Text generation enabled with model {} (key {})",
            config.model,
            redact_api_key(&config.api_key)
        );

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            retry: RetryPolicy::default(),
            costs,
        })
    }

    /// Replaces the retry policy.
    #[must_use]
    pub const fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Sends `prompt` and returns the first choice's content.
    pub async fn complete(&self, prompt: &str) -> harry_common::Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.max_tokens,
            temperature: TEMPERATURE,
        };

        let response = with_retry(self.retry, "chat completion", || self.send(&request)).await?;

        if let (Some(costs), Some(usage)) = (&self.costs, &response.usage) {
            let alerts = costs
                .record_ai_usage(usage.prompt_tokens, usage.completion_tokens)
                .await;
            if !alerts.is_empty() {
                debug!("Chat completion crossed {} budget thresholds", alerts.len());
            }
        }

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();
        debug!("Chat completion returned {} chars", content.chars().count());
        Ok(content)
    }

    async fn send(&self, request: &ChatRequest<'_>) -> harry_common::Result<ChatResponse> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HarryError::network_status(
                format!("Chat completion failed: {}", harry_common::truncate_string(&body, 200)),
                status.as_u16(),
            ));
        }

        response.json::<ChatResponse>().await.map_err(|e| {
            HarryError::network_status(format!("Unreadable chat completion: {e}"), status.as_u16())
        })
    }
}

fn transport_error(err: &reqwest::Error) -> HarryError {
    let message = format!("Chat completion request failed: {err}");
    match err.status() {
        Some(status) => HarryError::network_status(message, status.as_u16()),
        None => HarryError::network(message),
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate(&self, prompt: &str) -> FunResult<String> {
        self.complete(prompt)
            .await
            .map_err(|e| FunError::Generation(e.to_string()))
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> AiConfig {
        AiConfig {
            api_key: "sk-test-0123456789abcdef".into(),
            base_url: base_url.into(),
            timeout_seconds: 2,
            ..AiConfig::default()
        }
    }

    #[test]
    fn test_parse_chat_response() {
        let body = r#"{
            "id": "chatcmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Sod off, ya muppet 🖕"}}],
            "usage": {"prompt_tokens": 120, "completion_tokens": 18, "total_tokens": 138}
        }"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("Sod off, ya muppet 🖕")
        );
        let usage = parsed.usage.unwrap();
        assert_eq!((usage.prompt_tokens, usage.completion_tokens), (120, 18));
    }

    #[test]
    fn test_request_shape() {
        let request = ChatRequest {
            model: "gpt-4o-mini",
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
            max_tokens: 150,
            temperature: TEMPERATURE,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["max_tokens"], 150);
    }

    #[test]
    fn test_endpoint_and_debug_redacts_key() {
        let generator = OpenAiGenerator::new(&config("https://api.example.com/v1/"), None).unwrap();
        assert_eq!(generator.endpoint, "https://api.example.com/v1/chat/completions");
        let debug = format!("{generator:?}");
        assert!(!debug.contains("sk-test-0123456789abcdef"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_a_generation_error() {
        let generator = OpenAiGenerator::new(&config("http://127.0.0.1:9"), None)
            .unwrap()
            .with_retry_policy(RetryPolicy::immediate(2));
        let err = generator.generate("hello").await.unwrap_err();
        assert!(matches!(err, FunError::Generation(_)));
    }
}
