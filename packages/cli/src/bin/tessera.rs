use clap::{Parser, Subcommand};
use colored::*;
use std::process;

mod cli;

use cli::tokens::{handle_tokens_command, TokensCommands};
use tessera_cli::config::Config;

#[derive(Parser)]
#[command(name = "tessera")]
#[command(about = "Tessera - token management service")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service
    Serve {
        /// Override PORT
        #[arg(long)]
        port: Option<u16>,
    },
    /// Manage tokens in the configured database
    #[command(subcommand)]
    Tokens(TokensCommands),
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tessera_cli::init_tracing();

    let cli = Cli::parse();

    if let Err(e) = handle_command(cli.command).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

async fn handle_command(command: Commands) -> anyhow::Result<()> {
    let mut config = Config::from_env()?;

    match command {
        Commands::Serve { port } => {
            config.override_port(port)?;
            tessera_cli::run_server(config).await
        }
        Commands::Tokens(command) => handle_tokens_command(command, &config).await,
    }
}
