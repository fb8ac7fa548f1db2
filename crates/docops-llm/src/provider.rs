//! JSON-mode chat completion against hosted providers.
//!
//! OpenAI and Groq share the chat-completions format; Anthropic uses the
//! messages API. One request per call, no retries.

use std::time::Duration;

use async_trait::async_trait;
use docops_analyze::ClassificationClient;
use docops_core::{Error, Result};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::config::{
    LlmConfig, LlmProvider, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT_SECS,
};

const ANTHROPIC_VERSION: &str = "2023-06-01";

fn default_base_url(provider: LlmProvider) -> &'static str {
    match provider {
        LlmProvider::Groq => "https://api.groq.com/openai/v1",
        LlmProvider::OpenAI => "https://api.openai.com/v1",
        LlmProvider::Anthropic => "https://api.anthropic.com/v1",
    }
}

/// [`ClassificationClient`] backed by a hosted chat model.
pub struct LlmClassifier {
    http: Client,
    provider: LlmProvider,
    model: String,
    api_key: String,
    base_url: String,
    temperature: f64,
    max_tokens: u32,
}

impl LlmClassifier {
    pub fn new(provider: LlmProvider, model: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        Self::with_timeout(provider, model, api_key, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(
        provider: LlmProvider,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            provider,
            model: model.into(),
            api_key: api_key.into(),
            base_url: default_base_url(provider).to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        })
    }

    /// Build from stored config. `Ok(None)` when no provider has a key.
    pub fn from_config(config: &LlmConfig) -> Result<Option<Self>> {
        let Some(resolved) = config.resolve_provider() else {
            return Ok(None);
        };
        let classifier = Self::with_timeout(
            resolved.provider,
            resolved.model,
            resolved.api_key,
            Duration::from_secs(config.timeout_secs),
        )?
        .with_sampling(config.temperature, config.max_tokens);
        Ok(Some(classifier))
    }

    pub fn with_sampling(mut self, temperature: f64, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    /// Point at a different API root, e.g. a proxy or a local stub.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn provider(&self) -> LlmProvider {
        self.provider
    }

    fn request_body(&self, system: &str, user: &str) -> Value {
        match self.provider {
            LlmProvider::Anthropic => json!({
                "model": self.model,
                "system": system,
                "messages": [{"role": "user", "content": user}],
                "temperature": self.temperature,
                "max_tokens": self.max_tokens,
            }),
            LlmProvider::Groq | LlmProvider::OpenAI => json!({
                "model": self.model,
                "messages": [
                    {"role": "system", "content": system},
                    {"role": "user", "content": user},
                ],
                "response_format": {"type": "json_object"},
                "temperature": self.temperature,
                "max_tokens": self.max_tokens,
            }),
        }
    }

    async fn post(&self, body: &Value) -> Result<Value> {
        let request = match self.provider {
            LlmProvider::Anthropic => self
                .http
                .post(format!("{}/messages", self.base_url))
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION),
            LlmProvider::Groq | LlmProvider::OpenAI => self
                .http
                .post(format!("{}/chat/completions", self.base_url))
                .header("Authorization", format!("Bearer {}", self.api_key)),
        };

        let response = request
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Llm(format!("{} request failed: {e}", self.provider)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            error!(provider = %self.provider, %status, "Model API returned an error");
            return Err(Error::Llm(format!("{} API error {status}: {text}", self.provider)));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Llm(format!("{} returned an unreadable body: {e}", self.provider)))
    }
}

/// `choices[0].message.content` from a chat-completions response.
pub fn chat_completion_content(body: &Value) -> Option<&str> {
    body.pointer("/choices/0/message/content")?.as_str()
}

/// `content[0].text` from a messages response.
pub fn anthropic_content(body: &Value) -> Option<&str> {
    body.pointer("/content/0/text")?.as_str()
}

#[async_trait]
impl ClassificationClient for LlmClassifier {
    async fn complete_json(&self, system: &str, user: &str) -> Result<String> {
        debug!(provider = %self.provider, model = %self.model, "Requesting JSON completion");

        let body = self.post(&self.request_body(system, user)).await?;
        let content = match self.provider {
            LlmProvider::Anthropic => anthropic_content(&body),
            LlmProvider::Groq | LlmProvider::OpenAI => chat_completion_content(&body),
        };

        match content.map(str::trim) {
            Some(text) if !text.is_empty() => Ok(text.to_string()),
            _ => Err(Error::Llm(format!("No response content from {}", self.provider))),
        }
    }

    fn provider_name(&self) -> &str {
        match self.provider {
            LlmProvider::Groq => "groq",
            LlmProvider::OpenAI => "openai",
            LlmProvider::Anthropic => "anthropic",
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::post, Json, Router};

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[test]
    fn test_request_bodies() {
        let groq = LlmClassifier::new(LlmProvider::Groq, "m", "k").unwrap();
        let body = groq.request_body("sys", "usr");
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["max_tokens"], 8000);

        let anthropic = LlmClassifier::new(LlmProvider::Anthropic, "m", "k").unwrap();
        let body = anthropic.request_body("sys", "usr");
        assert_eq!(body["system"], "sys");
        assert_eq!(body["messages"][0]["role"], "user");
        assert!(body.get("response_format").is_none());
    }

    #[test]
    fn test_content_extraction() {
        let chat = json!({"choices": [{"message": {"content": "{\"a\":1}"}}]});
        assert_eq!(chat_completion_content(&chat), Some("{\"a\":1}"));
        assert_eq!(chat_completion_content(&json!({"choices": []})), None);

        let messages = json!({"content": [{"type": "text", "text": "{}"}]});
        assert_eq!(anthropic_content(&messages), Some("{}"));
    }

    #[test]
    fn test_from_config_without_keys() {
        assert!(LlmClassifier::from_config(&LlmConfig::default())
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_chat_completion_round_trip() {
        let router = Router::new().route(
            "/chat/completions",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["response_format"]["type"], "json_object");
                Json(json!({"choices": [{"message": {"content": " {\"docType\":\"invoice\"} "}}]}))
            }),
        );
        let base = serve(router).await;
        let client = LlmClassifier::new(LlmProvider::Groq, "m", "k")
            .unwrap()
            .with_base_url(base);
        let content = client.complete_json("s", "u").await.unwrap();
        assert_eq!(content, "{\"docType\":\"invoice\"}");
    }

    #[tokio::test]
    async fn test_error_status_and_empty_content() {
        let router = Router::new()
            .route(
                "/chat/completions",
                post(|| async { (axum::http::StatusCode::UNAUTHORIZED, "bad key") }),
            )
            .route(
                "/messages",
                post(|| async { Json(json!({"content": []})) }),
            );
        let base = serve(router).await;

        let openai = LlmClassifier::new(LlmProvider::OpenAI, "m", "k")
            .unwrap()
            .with_base_url(base.clone());
        let err = openai.complete_json("s", "u").await.unwrap_err();
        assert!(matches!(err, Error::Llm(msg) if msg.contains("401")));

        let anthropic = LlmClassifier::new(LlmProvider::Anthropic, "m", "k")
            .unwrap()
            .with_base_url(base);
        let err = anthropic.complete_json("s", "u").await.unwrap_err();
        assert!(matches!(err, Error::Llm(_)));
    }
}
