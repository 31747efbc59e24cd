/// Terminal interaction - Gateway
mod chat;
mod input;
mod selector;

pub use chat::{run_chat, ChatSession, ReplCommand};
pub use input::{prompt, prompt_unused_name, read_line};
pub use selector::{choose_model, parse_selection, print_models, select_model, SelectionError};
