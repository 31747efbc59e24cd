// Gateway module for models - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod ollama;
mod stream;
mod traits;
mod types;

// Public re-exports - the ONLY way to access model functionality
pub use ollama::OllamaBackend;
pub use stream::{stream_reply, stream_reply_observed, FragmentStream, LineDecoder};
pub use traits::Backend;
pub use types::{ChatMessage, MessageRole};

#[cfg(test)]
pub use traits::MockBackend;
