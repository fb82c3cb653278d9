//! Anthropic Messages API client.
//!
//! Single endpoint: `POST {base}/v1/messages` with `x-api-key` auth and a
//! pinned `anthropic-version` header.

use std::time::{Duration, Instant};

use reqwest::Client;
use tracing::debug;

use crate::config::AnthropicConfig;
use crate::errors::LlmError;
use crate::llm::types::{MessagesRequest, MessagesResponse};

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Clone)]
pub struct AnthropicClient {
    http: Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl AnthropicClient {
    pub fn new(http: Client, cfg: AnthropicConfig) -> Self {
        Self {
            http,
            base_url: cfg.base_api.trim_end_matches('/').to_string(),
            api_key: cfg.api_key,
            timeout: Duration::from_secs(cfg.timeout_secs),
        }
    }

    /// One model turn. Non-2xx responses surface as [`LlmError::HttpStatus`]
    /// with a body snippet so auth and quota problems are diagnosable from
    /// the logs.
    pub async fn create_message(
        &self,
        request: &MessagesRequest<'_>,
    ) -> Result<MessagesResponse, LlmError> {
        let url = format!("{}/v1/messages", self.base_url);
        let started = Instant::now();

        let resp = self
            .http
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .timeout(self.timeout)
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(300).collect();
            return Err(LlmError::HttpStatus {
                status: status.as_u16(),
                snippet,
            });
        }

        let parsed: MessagesResponse = resp.json().await?;

        debug!(
            model = request.model,
            latency_ms = started.elapsed().as_millis() as u64,
            stop_reason = parsed.stop_reason.as_deref().unwrap_or("none"),
            input_tokens = parsed.usage.input_tokens,
            output_tokens = parsed.usage.output_tokens,
            "messages call completed"
        );

        if parsed.content.is_empty() {
            return Err(LlmError::EmptyContent);
        }
        Ok(parsed)
    }
}
