//! initjob - seed a package-analysis deployment

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use initjob_cli::ops::{self, Context};
use initjob_cli::{Cli, default_log_directives};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_directives(cli.verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();

    let ctx = Context::from_config(cli.into_config())?;
    if ctx.config.dry_run {
        tracing::info!("Dry run: no changes will be made");
    }

    ops::run(&ctx).await?;
    Ok(())
}
