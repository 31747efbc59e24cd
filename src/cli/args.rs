use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "lmi")]
#[command(version)]
#[command(about = "Chat with, compare and combine your local Ollama models", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Ollama server host (overrides configuration)
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Ollama server port (overrides configuration)
    #[arg(long, global = true)]
    pub port: Option<u16>,

    /// Directory output files are written to (overrides configuration)
    #[arg(long, global = true)]
    pub responses_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive chat session (default)
    Chat,
    /// List installed models
    List,
    /// Ask every installed model the same question
    Query(QueryArgs),
    /// Merge a responses file into one refined document
    Superset(SupersetArgs),
    /// Serve the web dashboard
    Dashboard(DashboardArgs),
    /// Write a default configuration file
    Init,
    /// Check that Ollama is installed and reachable
    Status,
    /// Show version information
    Version,
}

#[derive(Args, Debug, Default)]
pub struct QueryArgs {
    /// Question to send to every model (asked interactively if omitted)
    #[arg(short, long)]
    pub prompt: Option<String>,

    /// Output file name inside the responses directory
    #[arg(short, long)]
    pub output: Option<String>,

    /// Build a superset document afterwards without asking
    #[arg(long, conflicts_with = "no_superset")]
    pub superset: bool,

    /// Skip the superset document question
    #[arg(long)]
    pub no_superset: bool,

    /// Model that writes the superset document
    #[arg(long)]
    pub superset_model: Option<String>,

    /// Output file name for the superset document
    #[arg(long)]
    pub superset_output: Option<String>,
}

#[derive(Args, Debug)]
pub struct SupersetArgs {
    /// Responses file to merge
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output file name inside the responses directory
    #[arg(short, long)]
    pub output: Option<String>,

    /// Model that writes the document (menu if omitted)
    #[arg(short, long)]
    pub model: Option<String>,
}

#[derive(Args, Debug)]
pub struct DashboardArgs {
    /// Address to listen on (overrides configuration)
    #[arg(short, long)]
    pub bind: Option<String>,
}
