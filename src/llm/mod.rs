// src/llm/mod.rs
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::LlmConfig;
use crate::error::LlmError;
use crate::http_client::RateLimitedHttpClient;

/// Strips an optional markdown code fence (```json ... ``` or ``` ... ```)
/// from a model response. Models add these despite instructions not to.
pub fn strip_code_fences(text: &str) -> &str {
    let mut cleaned = text.trim();
    if let Some(rest) = cleaned.strip_prefix("```json") {
        cleaned = rest.trim_start();
    } else if let Some(rest) = cleaned.strip_prefix("```") {
        cleaned = rest.trim_start();
    }
    if let Some(rest) = cleaned.strip_suffix("```") {
        cleaned = rest.trim_end();
    }
    cleaned
}

/// Black-box text completion collaborator. Returns raw text that may or may
/// not be valid JSON; callers own all parsing and validation.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(
        &self,
        prompt: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, LlmError>;
}

/// Gemini REST implementation of the completion collaborator.
pub struct GeminiClient {
    http: RateLimitedHttpClient,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(http: RateLimitedHttpClient, config: &LlmConfig, api_key: String) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        }
    }
}

#[async_trait]
impl CompletionClient for GeminiClient {
    async fn complete(
        &self,
        prompt: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let body = json!({
            "contents": [{"parts": [{"text": prompt}]}],
            "generationConfig": {
                "temperature": temperature,
                "topP": 0.8,
                "topK": 40,
                "maxOutputTokens": max_tokens,
            }
        });

        debug!("Requesting completion ({} prompt chars)", prompt.len());
        let response = self.http.post_json(&url, &[], &body).await?;
        let payload: Value = response
            .json()
            .await
            .map_err(|e| LlmError::EmptyResponse(e.to_string()))?;

        let text = payload
            .get("candidates")
            .and_then(Value::as_array)
            .and_then(|c| c.first())
            .and_then(|c| c.pointer("/content/parts/0/text"))
            .and_then(Value::as_str)
            .map(|s| s.to_string());

        text.ok_or_else(|| LlmError::EmptyResponse(payload.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpConfig;
    use wiremock::matchers::{method, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gemini(base_url: &str) -> GeminiClient {
        let http = RateLimitedHttpClient::new(
            &HttpConfig {
                rate_limit_calls: 100,
                rate_limit_window_ms: 1000,
                max_retries: 0,
                retry_base_delay_ms: 1,
                timeout_seconds: 5,
            },
            "test-agent",
        )
        .unwrap();
        GeminiClient::new(
            http,
            &LlmConfig {
                base_url: base_url.to_string(),
                model: "gemini-pro".to_string(),
                transform_temperature: 0.2,
                transform_max_tokens: 8192,
                draft_temperature: 0.7,
                draft_max_tokens: 1000,
            },
            "test-key".to_string(),
        )
    }

    #[tokio::test]
    async fn extracts_candidate_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(r"/models/gemini-pro:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [
                    {"content": {"parts": [{"text": "hello from the model"}]}}
                ]
            })))
            .mount(&server)
            .await;

        let text = gemini(&server.uri())
            .complete("say hello", 0.2, 100)
            .await
            .unwrap();
        assert_eq!(text, "hello from the model");
    }

    #[tokio::test]
    async fn missing_candidates_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(r":generateContent"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"candidates": []})),
            )
            .mount(&server)
            .await;

        let err = gemini(&server.uri())
            .complete("say hello", 0.2, 100)
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::EmptyResponse(_)));
    }
}
