pub mod app;
pub mod cli;
pub mod constants;
pub mod dashboard;
pub mod models;
pub mod runtime;
pub mod session;
pub mod utils;

pub use app::{load_config, Config};
pub use models::{Backend, ChatMessage, MessageRole, OllamaBackend};
pub use runtime::ResponseStore;
pub use utils::{LmiError, LmiResult};
