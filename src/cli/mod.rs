/// CLI argument parsing and command handling - Gateway
mod args;
mod commands;

pub use args::{Cli, Commands, DashboardArgs, QueryArgs, SupersetArgs};
pub use commands::{apply_overrides, handle_command, list_models, show_version};
