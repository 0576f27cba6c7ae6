pub mod cli;
pub mod clients;
mod commands;
pub mod config;
pub mod error;
pub mod extract;
pub mod generator;
pub mod pipeline;
pub mod processor;
pub mod sink;
pub mod watcher;

#[cfg(test)]
mod test_support;

use anyhow::Result;
use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt;

use crate::{
    cli::Cli,
    commands::{CommandContext, run_command},
};

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let max = match cli.global.verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    fmt().with_max_level(max).without_time().try_init().ok();

    let context = CommandContext {
        api_key: config::api_key_from_env(),
    };

    run_command(cli.into_command(), context).await
}
