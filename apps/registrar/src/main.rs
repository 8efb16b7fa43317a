mod cli;
mod commands;

use anyhow::Context;
use clap::Parser;
use scholar::domain::config::AppConfig;
use scholar::kernel::config::load_config_or_default;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    let config: AppConfig =
        load_config_or_default(cli.config.as_ref()).context("Critical: Configuration is malformed")?;

    let _logger = scholar::init_logging(env!("CARGO_BIN_NAME"), &config.logging)?;

    let (mut records, _report) = scholar::open(&config).await.context("Failed to open records")?;

    commands::run(&mut records, cli.command, &mut std::io::stdout().lock()).await
}
