// SPDX-License-Identifier: GPL-3.0-only

use bodysnap::upload::ImageCategory;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

use cli::CaptureArgs;

#[derive(Parser)]
#[command(name = "bodysnap")]
#[command(about = "Capture body photos and prepare them for upload")]
#[command(version)]
struct Cli {
    /// Configuration file (default: ~/.config/bodysnap/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available cameras
    List,

    /// Take a photo and save it
    Photo {
        #[command(flatten)]
        capture: CaptureArgs,

        /// Output file or directory (default: ~/Pictures/Bodysnap/)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Take a photo and send it to the upload endpoint
    Upload {
        #[command(flatten)]
        capture: CaptureArgs,

        /// Subject identifier sent as `userId`
        #[arg(short, long)]
        user: String,

        /// Image category sent as `type` (front, side, general)
        #[arg(short = 't', long = "type", default_value = "general")]
        category: ImageCategory,

        /// Upload endpoint URL (overrides the configuration)
        #[arg(long)]
        endpoint: Option<String>,

        /// Write the multipart body to this file instead of sending it
        #[arg(long)]
        dry_run: Option<PathBuf>,
    },

    /// Print the effective configuration
    Config {
        /// Write the effective configuration back to the config file
        #[arg(long)]
        write: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=bodysnap=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();
    let config = cli::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::List => cli::list_cameras(&config),
        Commands::Photo { capture, output } => cli::take_photo(&config, &capture, output),
        Commands::Upload {
            capture,
            user,
            category,
            endpoint,
            dry_run,
        } => cli::upload_photo(&config, &capture, &user, category, endpoint, dry_run),
        Commands::Config { write } => cli::show_config(&config, cli.config.as_deref(), write),
    }
}
