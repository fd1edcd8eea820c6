use crate::application_port::*;
use crate::domain_port::CompletionClient;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct CompletionConfig {
    /// Full chat-completions URL, including deployment and api-version.
    pub endpoint: String,
    pub api_key: String,
    pub temperature: f32,
    pub top_p: f32,
    pub timeout_secs: u64,
}

/// Azure-OpenAI-style chat completions over a keep-alive reqwest client.
pub struct HttpCompletionClient {
    client: reqwest::Client,
    cfg: CompletionConfig,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

impl HttpCompletionClient {
    pub fn try_new(cfg: CompletionConfig) -> Result<Self, AssistantError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|e| AssistantError::InternalError(e.to_string()))?;
        Ok(HttpCompletionClient { client, cfg })
    }
}

#[async_trait::async_trait]
impl CompletionClient for HttpCompletionClient {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, AssistantError> {
        let body = serde_json::json!({
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": self.cfg.temperature,
            "top_p": self.cfg.top_p,
            "max_tokens": max_tokens,
        });

        let response = self
            .client
            .post(&self.cfg.endpoint)
            .header("api-key", &self.cfg.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AssistantError::Upstream(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AssistantError::Upstream(format!(
                "completion endpoint returned {}: {:.200}",
                status, detail
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AssistantError::MalformedResponse(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AssistantError::MalformedResponse("no choices returned".to_string()))?;

        debug!(chars = content.len(), "completion received");
        Ok(content)
    }
}
