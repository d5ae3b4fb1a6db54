//! Livecast CLI
//!
//! Camera queries and remote control of a livecast host daemon.
//!
//! # Usage
//!
//! ```bash
//! # List local cameras
//! livecast cameras
//!
//! # Configure, preview and go live
//! livecast configure --preset 1080p30
//! livecast preview
//! livecast stream rtmp://live.example.com/app/KEY
//!
//! # Stop streaming
//! livecast stop
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Livecast - live camera streaming control
#[derive(Parser)]
#[command(name = "livecast")]
#[command(version)]
#[command(about = "Live camera streaming over RTMP and SRT", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Daemon socket path (overrides the config file)
    #[arg(long, global = true)]
    socket: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List cameras and their characteristics
    #[command(alias = "ls")]
    Cameras(commands::CamerasArgs),

    /// Show status of the running session
    Status,

    /// Apply video and audio configuration
    Configure(commands::ConfigureArgs),

    /// Switch the capture camera
    Camera {
        /// Camera identifier (see `livecast cameras`)
        id: String,
    },

    /// Start the preview
    Preview,

    /// Stop the preview
    StopPreview,

    /// Start streaming
    Stream {
        /// Destination URL (defaults to [stream] url in config.toml)
        url: Option<String>,
    },

    /// Stop streaming
    Stop,

    /// Show or set the microphone mute state
    Mute {
        /// on or off
        state: Option<commands::Toggle>,
    },

    /// Show or set the camera zoom ratio
    Zoom {
        /// Zoom ratio, e.g. 2.0
        ratio: Option<f64>,
    },

    /// Print session events as they happen
    Watch,

    /// Dispose the session and release the engine
    Dispose,

    /// Stop the daemon
    Shutdown,

    /// Manage configuration files
    Config(commands::ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(format!("livecast={}", level).parse()?),
        )
        .with_target(false)
        .init();

    let remote = commands::Remote::new(cli.socket);

    match cli.command {
        Commands::Cameras(args) => commands::cameras(args, &remote).await?,
        Commands::Status => commands::status(&remote).await?,
        Commands::Configure(args) => commands::configure(args, &remote).await?,
        Commands::Camera { id } => commands::camera(&remote, &id).await?,
        Commands::Preview => commands::preview(&remote).await?,
        Commands::StopPreview => commands::stop_preview(&remote).await?,
        Commands::Stream { url } => commands::stream(&remote, url).await?,
        Commands::Stop => commands::stop(&remote).await?,
        Commands::Mute { state } => commands::mute(&remote, state).await?,
        Commands::Zoom { ratio } => commands::zoom(&remote, ratio).await?,
        Commands::Watch => commands::watch(&remote).await?,
        Commands::Dispose => commands::dispose(&remote).await?,
        Commands::Shutdown => commands::shutdown(&remote).await?,
        Commands::Config(args) => commands::config(args).await?,
    }

    Ok(())
}
