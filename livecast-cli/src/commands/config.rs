//! Config command - inspect and create the configuration file

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use livecast_core::config::{sample_config, ConfigFile};
use livecast_core::destination::{mask_stream_url, StreamProtocol};
use std::path::Path;

/// Arguments for the config command
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print where the config file is read from
    Path,

    /// Print the effective configuration
    Show,

    /// Write a commented config file to the default location
    Init {
        /// Replace an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Print the commented sample configuration
    Sample,
}

/// Run config subcommand
pub async fn config(args: ConfigArgs) -> Result<()> {
    let path = ConfigFile::default_path();
    match args.command {
        ConfigCommand::Path => {
            let state = if path.exists() { "present" } else { "missing" };
            println!("{} ({})", path.display(), state);
        }
        ConfigCommand::Show => show(&path)?,
        ConfigCommand::Init { force } => init(&path, force)?,
        ConfigCommand::Sample => print!("{}", sample_config()),
    }
    Ok(())
}

fn show(path: &Path) -> Result<()> {
    let file = if path.exists() {
        println!("# {}", path.display());
        ConfigFile::load_from(path.to_path_buf())
            .with_context(|| format!("Failed to load {}", path.display()))?
    } else {
        println!("# {} not found, built-in defaults", path.display());
        ConfigFile::default()
    };

    let video = file.video.to_video_config()?;
    let audio = file.audio.to_audio_config()?;

    println!("video        {}", video);
    match audio {
        Some(audio) => println!("audio        {}", audio),
        None => println!("audio        off"),
    }
    match file.stream.url.as_deref() {
        Some(url) => {
            let protocol = StreamProtocol::from_url(url)
                .map(|p| p.to_string())
                .unwrap_or_else(|| "unsupported".to_string());
            println!("destination  {} [{}]", mask_stream_url(url), protocol);
        }
        None => println!("destination  unset"),
    }
    println!(
        "permissions  camera {:?}, microphone {:?}",
        file.permissions.camera, file.permissions.record_audio
    );
    if let Some(socket) = &file.ipc.socket_path {
        println!("socket       {}", socket.display());
    }
    Ok(())
}

fn init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists; pass --force to replace it", path.display());
    }

    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    std::fs::write(path, sample_config())
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("Wrote {}", path.display());
    Ok(())
}
