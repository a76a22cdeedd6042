mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "flexinfra")]
#[command(about = "Provider-agnostic cloud infrastructure provisioning", long_about = None)]
struct Cli {
    /// Path to the manifest (discovered automatically when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and validate the manifest without touching any provider
    Validate,
    /// Provision every declared resource
    Provision {
        /// Actually provision (without this only the plan is printed)
        #[arg(short, long)]
        yes: bool,
    },
    /// Provision, then run the post-provision deploy hook
    Deploy {
        /// Actually provision (without this only the plan is printed)
        #[arg(short, long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Validate => commands::validate::handle(cli.config.as_deref()),
        Commands::Provision { yes } => {
            commands::provision::handle(cli.config.as_deref(), yes, false).await
        }
        Commands::Deploy { yes } => {
            commands::provision::handle(cli.config.as_deref(), yes, true).await
        }
    }
}
