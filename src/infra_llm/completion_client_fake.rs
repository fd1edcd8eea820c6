use crate::application_port::*;
use crate::domain_port::CompletionClient;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Canned completion client for tests and the `fake` backend. Responses are
/// consumed in push order; when the queue is empty an empty JSON array is
/// returned.
pub struct FakeCompletionClient {
    responses: Mutex<VecDeque<String>>,
}

impl FakeCompletionClient {
    pub fn new() -> Self {
        FakeCompletionClient {
            responses: Mutex::new(VecDeque::new()),
        }
    }

    pub fn push_response(&self, response: impl Into<String>) {
        self.responses
            .lock()
            .expect("fake completion queue poisoned")
            .push_back(response.into());
    }
}

impl Default for FakeCompletionClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CompletionClient for FakeCompletionClient {
    async fn complete(&self, _prompt: &str, _max_tokens: u32) -> Result<String, AssistantError> {
        let next = self
            .responses
            .lock()
            .map_err(|_| AssistantError::InternalError("completion queue poisoned".to_string()))?
            .pop_front();
        Ok(next.unwrap_or_else(|| "[]".to_string()))
    }
}
