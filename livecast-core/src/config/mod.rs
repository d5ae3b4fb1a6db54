//! Configuration types for Livecast
//!
//! Provides the encoder input value objects (video and audio), resolution
//! presets and the user configuration file.

mod file;

pub use file::{
    sample_config, AudioSettings, ConfigFile, IpcSettings, PermissionSettings, StreamSettings,
    VideoSettings,
};

use serde::{Deserialize, Serialize};

use crate::error::{LivecastError, Result};

/// Frame dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Total pixel count
    pub fn pixels(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl std::str::FromStr for Resolution {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("Invalid resolution '{}', expected WIDTHxHEIGHT", s))?;
        let width = w
            .trim()
            .parse()
            .map_err(|_| format!("Invalid width in '{}'", s))?;
        let height = h
            .trim()
            .parse()
            .map_err(|_| format!("Invalid height in '{}'", s))?;
        Ok(Self { width, height })
    }
}

/// Video codec handed to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VideoCodec {
    /// H.264 / AVC
    #[default]
    H264,
}

impl VideoCodec {
    /// MIME type understood by encoders
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::H264 => "video/avc",
        }
    }
}

impl std::fmt::Display for VideoCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::H264 => write!(f, "H.264"),
        }
    }
}

/// Audio codec handed to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AudioCodec {
    /// AAC
    #[default]
    Aac,
}

impl AudioCodec {
    /// MIME type understood by encoders
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Aac => "audio/mp4a-latm",
        }
    }
}

impl std::fmt::Display for AudioCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Aac => write!(f, "AAC"),
        }
    }
}

/// Audio channel layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChannelLayout {
    Mono,
    #[default]
    Stereo,
}

impl ChannelLayout {
    /// Number of channels
    pub fn channel_count(&self) -> u32 {
        match self {
            Self::Mono => 1,
            Self::Stereo => 2,
        }
    }
}

impl std::fmt::Display for ChannelLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mono => write!(f, "mono"),
            Self::Stereo => write!(f, "stereo"),
        }
    }
}

impl std::str::FromStr for ChannelLayout {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mono" | "1" => Ok(Self::Mono),
            "stereo" | "2" => Ok(Self::Stereo),
            _ => Err(format!("Unknown channel layout: {}", s)),
        }
    }
}

/// PCM sample format fed to the audio encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SampleFormat {
    /// 16-bit signed integer PCM
    #[default]
    Pcm16,
}

impl SampleFormat {
    /// Bytes per sample
    pub fn bytes_per_sample(&self) -> usize {
        match self {
            Self::Pcm16 => 2,
        }
    }
}

/// Common resolution presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Preset {
    /// 640x360 @ 30fps
    #[serde(rename = "360p30")]
    P360_30,
    /// 854x480 @ 30fps
    #[serde(rename = "480p30")]
    P480_30,
    /// 1280x720 @ 30fps
    #[default]
    #[serde(rename = "720p30")]
    P720_30,
    /// 1280x720 @ 60fps
    #[serde(rename = "720p60")]
    P720_60,
    /// 1920x1080 @ 30fps
    #[serde(rename = "1080p30")]
    P1080_30,
    /// 1920x1080 @ 60fps
    #[serde(rename = "1080p60")]
    P1080_60,
    /// 3840x2160 @ 30fps
    #[serde(rename = "4k30")]
    P4k30,
    /// Custom resolution and framerate
    Custom { width: u32, height: u32, fps: u32 },
}

impl Preset {
    /// Get the resolution
    pub fn resolution(&self) -> Resolution {
        match self {
            Self::P360_30 => Resolution::new(640, 360),
            Self::P480_30 => Resolution::new(854, 480),
            Self::P720_30 | Self::P720_60 => Resolution::new(1280, 720),
            Self::P1080_30 | Self::P1080_60 => Resolution::new(1920, 1080),
            Self::P4k30 => Resolution::new(3840, 2160),
            Self::Custom { width, height, .. } => Resolution::new(*width, *height),
        }
    }

    /// Get the framerate
    pub fn fps(&self) -> u32 {
        match self {
            Self::P720_60 | Self::P1080_60 => 60,
            Self::Custom { fps, .. } => *fps,
            _ => 30,
        }
    }

    /// Suggested bitrate in kbps
    pub fn suggested_bitrate(&self) -> u32 {
        match self {
            Self::P360_30 => 800,
            Self::P480_30 => 1200,
            Self::P720_30 => 2000,
            Self::P720_60 => 3500,
            Self::P1080_30 => 4500,
            Self::P1080_60 => 6000,
            Self::P4k30 => 15000,
            Self::Custom { width, height, fps } => {
                // Rough estimate: pixels * fps * 0.1 bits per pixel / 1000
                let pixels = *width as u64 * *height as u64;
                let kbps = pixels.saturating_mul(*fps as u64) / 10000;
                u32::try_from(kbps).unwrap_or(u32::MAX)
            }
        }
    }

    /// Parse preset from string like "1080p30"
    pub fn from_preset_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "360p30" | "360p" => Some(Self::P360_30),
            "480p30" | "480p" => Some(Self::P480_30),
            "720p30" | "720p" => Some(Self::P720_30),
            "720p60" => Some(Self::P720_60),
            "1080p30" | "1080p" => Some(Self::P1080_30),
            "1080p60" => Some(Self::P1080_60),
            "4k30" | "2160p30" | "4k" => Some(Self::P4k30),
            _ => None,
        }
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::P360_30 => write!(f, "360p30"),
            Self::P480_30 => write!(f, "480p30"),
            Self::P720_30 => write!(f, "720p30"),
            Self::P720_60 => write!(f, "720p60"),
            Self::P1080_30 => write!(f, "1080p30"),
            Self::P1080_60 => write!(f, "1080p60"),
            Self::P4k30 => write!(f, "4k30"),
            Self::Custom { width, height, fps } => write!(f, "{}x{}@{}", width, height, fps),
        }
    }
}

impl std::str::FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_preset_str(s).ok_or_else(|| format!("Unknown preset: {}", s))
    }
}

/// Video encoder input parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoConfig {
    /// Output resolution
    pub resolution: Resolution,
    /// Target bitrate in bits per second
    pub bitrate: u32,
    /// Frames per second
    pub fps: u32,
    /// Keyframe interval in seconds
    pub gop_duration_secs: f32,
    /// Codec (always H.264)
    #[serde(default)]
    pub codec: VideoCodec,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self::from_preset(Preset::default())
    }
}

impl VideoConfig {
    /// Build a configuration from a preset with its suggested bitrate
    pub fn from_preset(preset: Preset) -> Self {
        Self {
            resolution: preset.resolution(),
            bitrate: preset.suggested_bitrate().saturating_mul(1000),
            fps: preset.fps(),
            gop_duration_secs: 1.0,
            codec: VideoCodec::H264,
        }
    }

    /// Set the bitrate in bits per second
    pub fn with_bitrate(mut self, bitrate: u32) -> Self {
        self.bitrate = bitrate;
        self
    }

    /// Set the keyframe interval in seconds
    pub fn with_gop_duration(mut self, secs: f32) -> Self {
        self.gop_duration_secs = secs;
        self
    }

    /// Set the framerate
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    /// Keyframe interval in frames
    pub fn gop_frames(&self) -> u32 {
        (self.gop_duration_secs * self.fps as f32).round().max(1.0) as u32
    }

    /// Validate and return an error if the configuration cannot work
    pub fn validate(&self) -> Result<()> {
        if self.resolution.width == 0 || self.resolution.height == 0 {
            return Err(LivecastError::invalid_config("Resolution cannot be zero"));
        }
        if self.bitrate == 0 {
            return Err(LivecastError::invalid_config("Video bitrate cannot be zero"));
        }
        if self.fps == 0 {
            return Err(LivecastError::invalid_config("Framerate cannot be zero"));
        }
        if !self.gop_duration_secs.is_finite() || self.gop_duration_secs <= 0.0 {
            return Err(LivecastError::invalid_config(format!(
                "GOP duration must be positive, got {}",
                self.gop_duration_secs
            )));
        }
        Ok(())
    }

    /// Return warnings for settings that work but are probably unintended
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        let kbps = u64::from(self.bitrate / 1000);
        // 0.02 bits per pixel is where H.264 falls apart
        let floor = self.resolution.pixels().saturating_mul(u64::from(self.fps)) / 50_000;
        if kbps < floor {
            warnings.push(format!(
                "Bitrate {} kbps is very low for {} @ {}fps. Quality may suffer.",
                kbps, self.resolution, self.fps
            ));
        }
        if self.fps > 60 {
            warnings.push(format!(
                "{}fps exceeds what most ingest servers accept (60fps).",
                self.fps
            ));
        }
        if self.gop_duration_secs > 4.0 {
            warnings.push(format!(
                "Keyframe interval of {}s is above the 4s most platforms require.",
                self.gop_duration_secs
            ));
        }

        warnings
    }
}

impl std::fmt::Display for VideoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} @ {}fps, {} kbps, GOP {}s",
            self.codec,
            self.resolution,
            self.fps,
            self.bitrate / 1000,
            self.gop_duration_secs
        )
    }
}

/// Audio encoder input parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Target bitrate in bits per second
    pub bitrate: u32,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Channel layout
    pub channel: ChannelLayout,
    /// Codec (always AAC)
    #[serde(default)]
    pub codec: AudioCodec,
    /// Encoder input sample format (always 16-bit PCM)
    #[serde(default)]
    pub sample_format: SampleFormat,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            bitrate: 128_000,
            sample_rate: 44_100,
            channel: ChannelLayout::Stereo,
            codec: AudioCodec::Aac,
            sample_format: SampleFormat::Pcm16,
        }
    }
}

impl AudioConfig {
    /// Validate and return an error if the configuration cannot work
    pub fn validate(&self) -> Result<()> {
        if self.bitrate == 0 {
            return Err(LivecastError::invalid_config("Audio bitrate cannot be zero"));
        }
        if self.sample_rate == 0 {
            return Err(LivecastError::invalid_config("Sample rate cannot be zero"));
        }
        Ok(())
    }
}

impl std::fmt::Display for AudioConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} Hz {}, {} kbps",
            self.codec,
            self.sample_rate,
            self.channel,
            self.bitrate / 1000
        )
    }
}
