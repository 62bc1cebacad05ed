use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::config::Config;

/// Why a single model round trip failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AiFailure {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("model endpoint returned {status}")]
    NonSuccess { status: u16, body: String },
    #[error("malformed model response: {0}")]
    MalformedJson(String),
}

/// One prompt in, one text body out. The seam between orchestration and the network.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, AiFailure>;
}

/// Chat-completion client for OpenAI-compatible endpoints.
#[derive(Clone)]
pub struct OpenAiChatClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl OpenAiChatClient {
    pub fn new(config: &Config) -> Self {
        let mut builder = Client::builder();
        // No timeout unless configured; the endpoint bounds request duration
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Self {
            client: builder.build().unwrap_or_default(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
            model: config.model.clone(),
            temperature: config.temperature,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl ChatBackend for OpenAiChatClient {
    async fn complete(&self, prompt: &str) -> Result<String, AiFailure> {
        // Missing credentials surface on first use, not at startup
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AiFailure::Transport("no API key configured".to_string()))?;

        let request_body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| AiFailure::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AiFailure::NonSuccess {
                status: status.as_u16(),
                body,
            });
        }

        let resp_json: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AiFailure::MalformedJson(e.to_string()))?;

        let content = resp_json
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        debug!("Model {} replied with {} chars", self.model, content.len());
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_key_fails_on_first_use() {
        let config = Config {
            api_key: Some("  ".to_string()),
            ..Config::default()
        };
        let client = OpenAiChatClient::new(&config);
        let err = client.complete("hello").await.unwrap_err();
        assert_eq!(err, AiFailure::Transport("no API key configured".to_string()));
    }

    #[test]
    fn request_shape_is_single_user_message() {
        let body = ChatCompletionRequest {
            model: "gpt-4",
            messages: vec![ChatMessage { role: "user", content: "hi" }],
            temperature: 0.7,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"].as_array().unwrap().len(), 1);
    }
}
