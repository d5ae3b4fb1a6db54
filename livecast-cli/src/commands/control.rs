//! Session control commands

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use livecast_core::config::{ChannelLayout, ConfigFile, Preset};
use livecast_core::destination::{mask_stream_url, StreamProtocol};

use super::Remote;

/// Arguments for the configure command
#[derive(Args)]
pub struct ConfigureArgs {
    /// Quality preset (e.g., 720p30, 1080p60). Defaults to the config file.
    #[arg(short, long)]
    pub preset: Option<String>,

    /// Video bitrate in kbps (0 = preset default)
    #[arg(short, long)]
    pub bitrate: Option<u32>,

    /// Override the preset framerate
    #[arg(long)]
    pub fps: Option<u32>,

    /// Keyframe interval in seconds
    #[arg(long)]
    pub gop: Option<f32>,

    /// Audio bitrate in kbps
    #[arg(long)]
    pub audio_bitrate: Option<u32>,

    /// Audio sample rate in Hz
    #[arg(long)]
    pub sample_rate: Option<u32>,

    /// Audio channels (mono, stereo)
    #[arg(long)]
    pub channels: Option<ChannelLayout>,

    /// Skip audio configuration
    #[arg(long)]
    pub no_audio: bool,
}

/// On/off switch argument
#[derive(Clone, Copy, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

/// Apply video and audio configuration
pub async fn configure(args: ConfigureArgs, remote: &Remote) -> Result<()> {
    let file = ConfigFile::load_or_default();

    let mut video_settings = file.video.clone();
    if let Some(preset) = args.preset {
        if Preset::from_preset_str(&preset).is_none() {
            bail!(
                "Unknown preset '{}'. Use: 360p30, 480p30, 720p30, 720p60, 1080p30, 1080p60, 4k30",
                preset
            );
        }
        video_settings.preset = preset;
    }
    if let Some(bitrate) = args.bitrate {
        video_settings.bitrate = bitrate;
    }
    if let Some(gop) = args.gop {
        video_settings.gop_duration = gop;
    }
    let mut video = video_settings.to_video_config()?;
    if let Some(fps) = args.fps {
        video = video.with_fps(fps);
    }

    let mut audio_settings = file.audio.clone();
    if args.no_audio {
        audio_settings.enabled = false;
    }
    if let Some(bitrate) = args.audio_bitrate {
        audio_settings.bitrate = bitrate;
    }
    if let Some(sample_rate) = args.sample_rate {
        audio_settings.sample_rate = sample_rate;
    }
    if let Some(channels) = args.channels {
        audio_settings.channels = channels.to_string();
    }
    let audio = audio_settings.to_audio_config()?;

    for warning in video.warnings() {
        println!("Warning: {}", warning);
    }

    let mut client = remote.connect().await?;
    client
        .set_video_config(video.clone())
        .await
        .context("Failed to apply video configuration")?;
    println!("Video: {}", video);

    if let Some(audio) = audio {
        client
            .set_audio_config(audio.clone())
            .await
            .context("Failed to apply audio configuration")?;
        println!("Audio: {}", audio);
    }

    Ok(())
}

/// Switch the capture camera
pub async fn camera(remote: &Remote, id: &str) -> Result<()> {
    let mut client = remote.connect().await?;
    client.set_camera(id).await?;
    println!("Camera switched to {}", id);
    Ok(())
}

/// Start the preview
pub async fn preview(remote: &Remote) -> Result<()> {
    let mut client = remote.connect().await?;
    client.start_preview().await?;
    println!("Preview started");
    Ok(())
}

/// Stop the preview
pub async fn stop_preview(remote: &Remote) -> Result<()> {
    let mut client = remote.connect().await?;
    client.stop_preview().await?;
    println!("Preview stopped");
    Ok(())
}

/// Start streaming to a destination
pub async fn stream(remote: &Remote, url: Option<String>) -> Result<()> {
    let url = match url.or_else(|| ConfigFile::load_or_default().stream.url) {
        Some(url) => url,
        None => bail!("No destination URL. Pass one or set [stream] url in config.toml"),
    };

    let Some(protocol) = StreamProtocol::from_url(&url) else {
        bail!("Unsupported destination '{}'. Use rtmp://, rtmps:// or srt://", mask_stream_url(&url));
    };

    println!("Connecting to {} ({})...", mask_stream_url(&url), protocol);
    let mut client = remote.connect().await?;
    client.start_stream(&url).await?;
    println!("Streaming");
    Ok(())
}

/// Stop streaming
pub async fn stop(remote: &Remote) -> Result<()> {
    let mut client = remote.connect().await?;
    client.stop_stream().await?;
    println!("Stream stopped");
    Ok(())
}

/// Show or set the mute state
pub async fn mute(remote: &Remote, state: Option<Toggle>) -> Result<()> {
    let mut client = remote.connect().await?;
    if let Some(state) = state {
        client.set_muted(matches!(state, Toggle::On)).await?;
    }
    let muted = client.is_muted().await?;
    println!("Microphone {}", if muted { "muted" } else { "live" });
    Ok(())
}

/// Show or set the zoom ratio
pub async fn zoom(remote: &Remote, ratio: Option<f64>) -> Result<()> {
    let mut client = remote.connect().await?;
    if let Some(ratio) = ratio {
        client.set_zoom_ratio(ratio).await?;
    }
    println!("Zoom {:.2}x", client.zoom_ratio().await?);
    Ok(())
}

/// Dispose the session
pub async fn dispose(remote: &Remote) -> Result<()> {
    let mut client = remote.connect().await?;
    client.dispose().await?;
    println!("Session disposed");
    Ok(())
}

/// Stop the daemon
pub async fn shutdown(remote: &Remote) -> Result<()> {
    let mut client = remote.connect().await?;
    client.shutdown().await?;
    println!("Daemon stopping");
    Ok(())
}
