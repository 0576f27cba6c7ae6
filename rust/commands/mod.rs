use anyhow::Result;
use secrecy::SecretString;

use crate::cli::Command;

pub mod extract;
pub mod generate;
pub mod watch;

#[derive(Clone, Default)]
pub struct CommandContext {
    pub api_key: Option<SecretString>,
}

pub async fn run_command(command: Command, ctx: CommandContext) -> Result<()> {
    match command {
        Command::Watch(args) => watch::handle(args, &ctx).await,
        Command::Extract(args) => extract::handle(args).await,
        Command::Generate(args) => generate::handle(args, &ctx).await,
    }
}
