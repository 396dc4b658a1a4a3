mod auth;
mod ci;
mod cli;
mod error;
mod git;
mod github;
mod http;
mod template;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    info!("Starting prkit");
    cli.execute().await?;

    Ok(())
}
