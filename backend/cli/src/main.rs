mod doctor_cmd;
mod serve_cmd;
mod terminal_output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "morejpeg")]
#[command(about = "morejpeg: a Telegram bot that makes your pictures worse on request")]
#[command(version)]
struct Cli {
    /// Path to config.yaml (default: $MOREJPEG_CONFIG_DIR/config.yaml or ~/.morejpeg/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bot until interrupted
    Serve,
    /// Check config, token and media directories
    Doctor,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config_path = cli
        .config
        .unwrap_or_else(|| morejpeg_config::config_file_path(&morejpeg_config::config_dir()));

    match cli.command {
        Commands::Serve => {
            serve_cmd::run(&config_path).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Doctor => {
            let healthy = doctor_cmd::run(&config_path).await;
            Ok(if healthy {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}
