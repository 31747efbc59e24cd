use async_trait::async_trait;

use super::stream::FragmentStream;
use super::types::ChatMessage;
use crate::utils::LmiResult;

/// The model-serving process every front-end talks to
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Backend: Send + Sync {
    /// Identifiers of every installed model, in the order the backend reports them
    async fn list_models(&self) -> LmiResult<Vec<String>>;

    /// Start a streaming chat completion over the full message history
    async fn chat_stream(&self, model: &str, messages: &[ChatMessage]) -> LmiResult<FragmentStream>;
}
