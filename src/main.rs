use anyhow::Result;
use clap::Parser;

use lmi::{
    app::load_config,
    cli::{apply_overrides, handle_command, Cli},
    utils::init_logger,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    init_logger(cli.verbose);

    // Load configuration, then let flags override it
    let mut config = load_config(cli.config.as_deref())?;
    apply_overrides(&mut config, &cli);
    tracing::debug!("Effective configuration: {:?}", config);

    handle_command(cli.command, config).await
}
