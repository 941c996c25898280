use anyhow::Result;
use clap::Parser;

use idlewatch::config::FileConfig;

mod cli;
mod handlers;

use cli::{Cli, Commands};
use handlers::CommandContext;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    idlewatch_common::init_tracing("idlewatch", cli.verbose)?;

    let file_config = FileConfig::load()?;
    let ctx = CommandContext::new(cli.backend, cli.model, cli.verbose, file_config);

    match cli.command {
        Commands::Profiles { command } => handlers::run_profiles_command(&ctx, command).await,
        Commands::Sync => handlers::run_sync(&ctx).await,
        Commands::Agents {
            search,
            status,
            presence,
        } => handlers::run_agents(&ctx, search, status, presence).await,
        Commands::Analyze => handlers::run_analyze(&ctx).await,
        Commands::Watch { interval, analyze } => handlers::run_watch(&ctx, interval, analyze).await,
    }
}
