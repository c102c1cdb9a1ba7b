//! Groq provider implementation.
//!
//! Speaks the OpenAI-compatible `/chat/completions` protocol, so any
//! endpoint exposing that surface works by pointing `base_url` at it.
//! A single retry against the configured fallback model covers rate
//! limits and model outages on the primary.

use async_trait::async_trait;
use priceowl_core::error::ProviderError;
use priceowl_core::message::{ChatMessage, Role};
use priceowl_core::provider::CompletionProvider;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// A Groq-backed (OpenAI-compatible) completion provider.
pub struct GroqProvider {
    base_url: String,
    api_key: String,
    model: String,
    fallback_model: String,
    client: reqwest::Client,
}

impl GroqProvider {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        fallback_model: impl Into<String>,
        timeout_secs: u64,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            fallback_model: fallback_model.into(),
            client,
        }
    }

    fn to_api_messages(system_prompt: &str, history: &[ChatMessage]) -> Vec<ApiMessage> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(ApiMessage {
            role: "system".into(),
            content: system_prompt.to_string(),
        });
        messages.extend(history.iter().map(|m| ApiMessage {
            role: match m.role {
                Role::User => "user".into(),
                Role::Assistant => "assistant".into(),
                Role::System => "system".into(),
            },
            content: m.content.clone(),
        }));
        messages
    }

    async fn complete_with_model(
        &self,
        model: &str,
        messages: &[ApiMessage],
        max_tokens: u32,
    ) -> Result<Option<String>, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);

        let body = serde_json::json!({
            "model": model,
            "messages": messages,
            "temperature": 0.7,
            "max_tokens": max_tokens,
            "stream": false,
        });

        debug!(provider = "groq", model, "Sending completion request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout
                } else {
                    ProviderError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(ProviderError::RateLimited {
                retry_after_secs: 5,
            });
        }

        if status == 401 || status == 403 {
            return Err(ProviderError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ));
        }

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Provider returned error");
            return Err(ProviderError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let api_response: ApiResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status_code: 200,
                message: format!("Failed to parse response: {e}"),
            })?;

        Ok(api_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty()))
    }
}

#[async_trait]
impl CompletionProvider for GroqProvider {
    fn name(&self) -> &str {
        "groq"
    }

    async fn complete(
        &self,
        history: &[ChatMessage],
        system_prompt: &str,
        max_tokens: u32,
    ) -> Result<Option<String>, ProviderError> {
        let messages = Self::to_api_messages(system_prompt, history);

        match self
            .complete_with_model(&self.model, &messages, max_tokens)
            .await
        {
            Ok(reply) => Ok(reply),
            Err(e) if self.fallback_model != self.model => {
                warn!(
                    model = %self.model,
                    fallback = %self.fallback_model,
                    error = %e,
                    "Primary model failed, retrying with fallback"
                );
                self.complete_with_model(&self.fallback_model, &messages, max_tokens)
                    .await
            }
            Err(e) => Err(e),
        }
    }
}

// --- OpenAI-compatible API types (internal) ---

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ApiResponseMessage {
    #[serde(default)]
    content: Option<String>,
}
