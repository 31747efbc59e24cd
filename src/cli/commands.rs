use anyhow::Result;
use colored::Colorize;
use std::io;
use std::sync::Arc;

use crate::{
    app::{get_config_dir, init_config, Config},
    dashboard::{serve, DashboardState},
    models::{Backend, OllamaBackend},
    runtime::{run_query_workflow, run_superset_workflow, QueryOptions},
    session::{print_models, run_chat},
};

use super::{Cli, Commands, QueryArgs};

/// Fold command-line overrides into the loaded configuration
pub fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(host) = &cli.host {
        config.ollama.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.ollama.port = port;
    }
    if let Some(dir) = &cli.responses_dir {
        config.output.responses_dir = dir.clone();
    }
    if let Some(Commands::Dashboard(args)) = &cli.command {
        if let Some(bind) = &args.bind {
            config.dashboard.bind = bind.clone();
        }
    }
}

impl From<QueryArgs> for QueryOptions {
    fn from(args: QueryArgs) -> Self {
        let superset = if args.superset {
            Some(true)
        } else if args.no_superset {
            Some(false)
        } else {
            None
        };

        QueryOptions {
            prompt: args.prompt,
            output: args.output,
            superset,
            superset_model: args.superset_model,
            superset_output: args.superset_output,
        }
    }
}

/// Handle CLI subcommands; no subcommand starts a chat
pub async fn handle_command(command: Option<Commands>, config: Config) -> Result<()> {
    let command = command.unwrap_or(Commands::Chat);

    let backend = OllamaBackend::from_config(&config.ollama)?;
    tracing::info!("Using Ollama at {}", backend.base_url());

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();

    match command {
        Commands::Chat => run_chat(&backend, &mut input, &mut out).await?,
        Commands::List => list_models(&backend).await?,
        Commands::Query(args) => {
            run_query_workflow(&backend, &config, args.into(), &mut input, &mut out).await?
        }
        Commands::Superset(args) => {
            run_superset_workflow(
                &backend,
                &config,
                &args.input,
                args.model,
                args.output,
                &mut input,
                &mut out,
            )
            .await?
        }
        Commands::Dashboard(_) => {
            let bind = config.dashboard.bind.clone();
            let state = DashboardState::new(Arc::new(backend), config);
            serve(state, &bind).await?
        }
        Commands::Status => show_status(&backend).await?,
        Commands::Init => {
            let path = init_config()?;
            println!("Configuration ready at {}", path.display());
        }
        Commands::Version => show_version(),
    }

    Ok(())
}

/// List installed models
pub async fn list_models(backend: &dyn Backend) -> Result<()> {
    let models = backend.list_models().await?;
    println!("***** You have {} model(s) installed *****", models.len());
    print_models(&mut io::stdout(), &models)?;
    Ok(())
}

/// Show version information
pub fn show_version() {
    println!("lmi v{}", env!("CARGO_PKG_VERSION"));
    println!("   Chat with, compare and combine your local Ollama models");
}

/// Show status of the backend and configuration
async fn show_status(backend: &OllamaBackend) -> Result<()> {
    println!("lmi Status:");
    println!();

    match which::which("ollama") {
        Ok(path) => println!("  {} Ollama binary: {}", "[OK]".green(), path.display()),
        Err(_) => println!(
            "  {} Ollama binary: not found on PATH (install from https://ollama.com/download)",
            "[WARNING]".yellow()
        ),
    }

    if backend.is_running().await {
        let models = backend.list_models().await.unwrap_or_default();
        if models.is_empty() {
            println!(
                "  {} Server: running at {} (no models installed)",
                "[WARNING]".yellow(),
                backend.base_url()
            );
        } else {
            println!(
                "  {} Server: running at {} ({} models installed)",
                "[OK]".green(),
                backend.base_url(),
                models.len()
            );
            for model in models.iter().take(3) {
                println!("      • {}", model);
            }
            if models.len() > 3 {
                println!("      ... and {} more", models.len() - 3);
            }
        }
    } else {
        println!(
            "  {} Server: not reachable at {} (start it with: ollama serve)",
            "[ERROR]".red(),
            backend.base_url()
        );
    }

    let config_path = get_config_dir()?.join("config.toml");
    if config_path.exists() {
        println!("  {} Configuration: {}", "[OK]".green(), config_path.display());
    } else {
        println!(
            "  {} Configuration: not found (using defaults, run `lmi init`)",
            "[WARNING]".yellow()
        );
    }

    println!();
    Ok(())
}
