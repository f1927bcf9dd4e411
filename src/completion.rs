//! Chat-completion client abstraction and the OpenAI-backed implementation.
//!
//! [`CompletionClient`] is the second of the crate's two remote-API
//! boundaries: an assembled prompt goes in, the assistant's reply text
//! comes out. Transport behavior mirrors the embedding client: bounded
//! timeout, exponential backoff on 429/5xx/network errors, fail-fast on
//! other client errors.

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::time::Duration;

use crate::config::CompletionConfig;
use crate::models::ChatMessage;

/// Produces a reply for an ordered sequence of role-tagged messages.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
        max_output_tokens: u32,
    ) -> Result<String>;
}

/// Completion client backed by the OpenAI `/v1/chat/completions` endpoint.
///
/// Requires the `OPENAI_API_KEY` environment variable.
pub struct OpenAiCompletions {
    model: String,
    api_key: String,
    max_retries: u32,
    client: reqwest::Client,
}

impl OpenAiCompletions {
    pub fn new(config: &CompletionConfig) -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY environment variable not set"))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            model: config.model.clone(),
            api_key,
            max_retries: config.max_retries,
            client,
        })
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompletions {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
        max_output_tokens: u32,
    ) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "temperature": temperature,
            "max_tokens": max_output_tokens,
        });

        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                tokio::time::sleep(delay).await;
            }

            let resp = self
                .client
                .post("https://api.openai.com/v1/chat/completions")
                .header("Authorization", format!("Bearer {}", self.api_key))
                .header("Content-Type", "application/json")
                .json(&body)
                .send()
                .await;

            match resp {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let json: serde_json::Value = response.json().await?;
                        return parse_completion_response(&json);
                    }

                    if status.as_u16() == 429 || status.is_server_error() {
                        let body_text = response.text().await.unwrap_or_default();
                        last_err = Some(anyhow::anyhow!(
                            "completions API error {}: {}",
                            status,
                            body_text
                        ));
                        continue;
                    }

                    let body_text = response.text().await.unwrap_or_default();
                    bail!("completions API error {}: {}", status, body_text);
                }
                Err(e) => {
                    last_err = Some(e.into());
                    continue;
                }
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow::anyhow!("completion failed after retries")))
    }
}

fn parse_completion_response(json: &serde_json::Value) -> Result<String> {
    let content = json
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|t| t.as_str())
        .ok_or_else(|| anyhow::anyhow!("invalid completions response: missing message content"))?;

    Ok(content.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_response_extracts_reply_text() {
        let json = serde_json::json!({
            "choices": [
                {"message": {"role": "assistant", "content": "  Start small. \n"}}
            ]
        });
        assert_eq!(parse_completion_response(&json).unwrap(), "Start small.");
    }

    #[test]
    fn parse_response_rejects_missing_choices() {
        let json = serde_json::json!({"object": "chat.completion"});
        assert!(parse_completion_response(&json).is_err());
    }
}
