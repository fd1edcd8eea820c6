use crate::application_port::*;

/// Outbound port to a chat-completions endpoint. Stateless: one prompt in,
/// the raw assistant message text out.
#[async_trait::async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, AssistantError>;
}
