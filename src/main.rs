//! FrameDeck CLI
//!
//! Samples a video at a fixed stride, keeps the frames that differ from the
//! previous kept frame, and lays the chosen ones out as a paginated PDF.
//!
//! # Usage
//!
//! ```bash
//! framedeck run --input lecture.mp4
//! framedeck extract --input lecture.mp4 --out-dir frames/
//! framedeck export --manifest frames/manifest.json --select 0,2,5 --title "Week 3"
//! framedeck inspect --manifest frames/manifest.json --json
//! ```

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use framedeck::cli::{commands, Cli, Commands};
use framedeck::config_initialization::initialize_configuration_hierarchy;
use framedeck::utils::logging::LoggingSystem;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = initialize_configuration_hierarchy(&cli).await?;

    let logging = LoggingSystem::new(config.logging.clone());
    logging.initialize();
    logging.log_system_info();

    let result = match cli.command {
        Commands::Extract(args) => {
            info!("Executing extract command");
            commands::extract(args, &config).await
        }
        Commands::Export(args) => {
            info!("Executing export command");
            commands::export(args, &config).await
        }
        Commands::Run(args) => {
            info!("Executing run command");
            commands::run(args, &config).await
        }
        Commands::Inspect(args) => {
            info!("Executing inspect command");
            commands::inspect(args).await
        }
    };

    if let Err(e) = &result {
        error!("{:#}", e);
    }
    result
}
