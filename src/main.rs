//! Mortality Dashboard - serves the charts or exports them to a directory.

use anyhow::{Context, Result};
use clap::Parser;
use mortality_dashboard::config::Cli;
use mortality_dashboard::data::DataLoader;
use mortality_dashboard::{export, server};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        log::error!("{:#}", e);
        return Err(e);
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let paths = cli.source_paths();
    let data = tokio::task::spawn_blocking(move || DataLoader::load(&paths))
        .await
        .context("Loader task failed")?
        .context("Failed to load mortality data")?;
    log::info!("Mortality table ready: {} rows", data.table.len());

    if let Some(dir) = &cli.export {
        export::export_static(&data, dir)?;
        return Ok(());
    }

    server::serve(Arc::new(data), &cli.bind_address(), cli.open).await
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .init();
}
