mod config;
mod server;

use clap::{Parser, Subcommand};
use config::Config;
use server::run_server;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "dummys3")]
#[command(about = "Local filesystem stand-in for an S3-style object store")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Server {
        /// Path to configuration file
        #[arg(short, long, default_value = "config.yaml")]
        config: String,

        /// Storage root, overriding the configuration file
        #[arg(long)]
        root: Option<PathBuf>,

        /// Listen address, overriding the configuration file
        #[arg(long)]
        bind: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dummys3=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Server { config, root, bind } => {
            tracing::info!("Starting Dummys3 server with config: {}", config);

            let cfg = match Config::from_file(&config) {
                Ok(c) => c.with_overrides(root, bind),
                Err(e) => {
                    tracing::error!("Failed to load config: {}", e);
                    std::process::exit(1);
                }
            };

            if let Err(e) = cfg.validate() {
                tracing::error!("Invalid config: {}", e);
                std::process::exit(1);
            }

            if let Err(e) = run_server(cfg).await {
                tracing::error!("Server error: {:#}", e);
                std::process::exit(1);
            }
        }
    }
}
