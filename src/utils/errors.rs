use std::path::PathBuf;
use thiserror::Error;

/// Main error type for lmi
#[derive(Error, Debug)]
pub enum LmiError {
    #[error("Ollama server not running at {0}. Start it with: ollama serve")]
    BackendNotRunning(String),

    #[error("Ollama API error: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Malformed stream line: {0}")]
    StreamError(String),

    #[error("No language models installed. Pull one with: ollama pull <model>")]
    NoModels,

    #[error("Output file already exists: {}", .0.display())]
    OutputExists(PathBuf),

    #[error("Invalid output file name '{0}': use a plain file name without directories")]
    InvalidOutputName(String),

    #[error("Input closed before a selection was made")]
    InputClosed,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type LmiResult<T> = std::result::Result<T, LmiError>;
