mod api;
mod cli;
mod config;
mod download;
mod error;
mod install;
mod models;
mod shell;
mod utils;
mod version_manager;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use config::Config;
use models::Platform;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use utils::print_error;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so `mocv bin` output stays clean
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let platform = match Platform::current() {
        Ok(platform) => platform,
        Err(e) => {
            print_error(&e.to_string());
            std::process::exit(1);
        }
    };

    // Arguments first: --help and usage errors never touch the cache root
    let cli = Cli::parse();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            print_error(&e.to_string());
            std::process::exit(1);
        }
    };

    if let Err(e) = cli.with_config(config).run(platform).await {
        print_error(&e.to_string());
        std::process::exit(1);
    }

    Ok(())
}
