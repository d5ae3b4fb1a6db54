//! Configuration file loading and merging
//!
//! Loads user configuration from `~/.config/livecast/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use super::{AudioConfig, ChannelLayout, Preset, VideoConfig};
use crate::error::{LivecastError, Result};
use crate::permission::{PermissionPolicy, PolicyPrompt};

/// Configuration file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Video defaults
    #[serde(default)]
    pub video: VideoSettings,

    /// Audio defaults
    #[serde(default)]
    pub audio: AudioSettings,

    /// Stream destination
    #[serde(default)]
    pub stream: StreamSettings,

    /// Permission policies for hosts without a prompt UI
    #[serde(default)]
    pub permissions: PermissionSettings,

    /// IPC settings
    #[serde(default)]
    pub ipc: IpcSettings,
}

/// Default video settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoSettings {
    /// Output preset (e.g., "720p30")
    #[serde(default = "default_preset")]
    pub preset: String,

    /// Bitrate in kbps (0 = auto)
    #[serde(default)]
    pub bitrate: u32,

    /// Keyframe interval in seconds
    #[serde(default = "default_gop_duration")]
    pub gop_duration: f32,
}

/// Default audio settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioSettings {
    /// Capture audio at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Bitrate in kbps
    #[serde(default = "default_audio_bitrate")]
    pub bitrate: u32,

    /// Sample rate in Hz
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Channel layout (mono, stereo)
    #[serde(default = "default_channels")]
    pub channels: String,
}

/// Stream destination settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamSettings {
    /// Default destination (rtmp://, rtmps:// or srt://)
    #[serde(default)]
    pub url: Option<String>,
}

/// Permission policies
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PermissionSettings {
    /// Camera access policy
    #[serde(default)]
    pub camera: PermissionPolicy,

    /// Microphone access policy
    #[serde(default)]
    pub record_audio: PermissionPolicy,

    /// Message returned when a policy asks for a rationale
    #[serde(default)]
    pub rationale: Option<String>,
}

/// IPC settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IpcSettings {
    /// Override the socket path
    #[serde(default)]
    pub socket_path: Option<PathBuf>,
}

fn default_preset() -> String {
    "720p30".to_string()
}

fn default_gop_duration() -> f32 {
    1.0
}

fn default_true() -> bool {
    true
}

fn default_audio_bitrate() -> u32 {
    128
}

fn default_sample_rate() -> u32 {
    44_100
}

fn default_channels() -> String {
    "stereo".to_string()
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            preset: default_preset(),
            bitrate: 0,
            gop_duration: default_gop_duration(),
        }
    }
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            bitrate: default_audio_bitrate(),
            sample_rate: default_sample_rate(),
            channels: default_channels(),
        }
    }
}

impl VideoSettings {
    /// Build the video configuration these settings describe
    pub fn to_video_config(&self) -> Result<VideoConfig> {
        let preset = Preset::from_preset_str(&self.preset)
            .ok_or_else(|| LivecastError::config(format!("Unknown preset '{}'", self.preset)))?;

        let mut config = VideoConfig::from_preset(preset).with_gop_duration(self.gop_duration);
        if self.bitrate > 0 {
            config = config.with_bitrate(self.bitrate.saturating_mul(1000));
        }
        config.validate()?;
        Ok(config)
    }
}

impl AudioSettings {
    /// Build the audio configuration these settings describe
    ///
    /// Returns `None` when audio is disabled.
    pub fn to_audio_config(&self) -> Result<Option<AudioConfig>> {
        if !self.enabled {
            return Ok(None);
        }

        let channel: ChannelLayout = self.channels.parse().map_err(LivecastError::config)?;
        let config = AudioConfig {
            bitrate: self.bitrate.saturating_mul(1000),
            sample_rate: self.sample_rate,
            channel,
            ..AudioConfig::default()
        };
        config.validate()?;
        Ok(Some(config))
    }
}

impl PermissionSettings {
    /// Build a prompt answering from these policies
    pub fn to_prompt(&self) -> PolicyPrompt {
        PolicyPrompt::new(self.camera, self.record_audio).with_rationale(self.rationale.clone())
    }
}

impl ConfigFile {
    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("livecast").join("config.toml")
        } else if let Ok(home) = std::env::var("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("livecast")
                .join("config.toml")
        } else {
            PathBuf::from("/etc/livecast/config.toml")
        }
    }

    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        Self::load_from(Self::default_path())
    }

    /// Load configuration from a specific path
    pub fn load_from(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            debug!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|e| LivecastError::Config(format!("Failed to read config file: {}", e)))?;

        let config: ConfigFile = toml::from_str(&content)
            .map_err(|e| LivecastError::Config(format!("Failed to parse config file: {}", e)))?;

        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Load configuration, logging warnings but returning defaults on error
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to load config file: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    LivecastError::Config(format!("Failed to create config directory: {}", e))
                })?;
            }
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| LivecastError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(&path, content)
            .map_err(|e| LivecastError::Config(format!("Failed to write config file: {}", e)))?;

        info!("Saved configuration to {:?}", path);
        Ok(())
    }
}

/// Generate a sample configuration file
pub fn sample_config() -> String {
    r#"# Livecast Configuration

[video]
# Output preset: 360p30, 480p30, 720p30, 720p60, 1080p30, 1080p60, 4k30
preset = "720p30"

# Bitrate in kbps (0 = automatic based on preset)
bitrate = 0

# Keyframe interval in seconds
gop_duration = 1.0

[audio]
# Capture microphone audio
enabled = true

# Bitrate in kbps
bitrate = 128

# Sample rate in Hz
sample_rate = 44100

# Channel layout: mono, stereo
channels = "stereo"

[stream]
# Default destination, e.g. "rtmp://live.example.com/app/STREAM_KEY"
# url = "rtmp://localhost/live/test"

[permissions]
# Policy for hosts without a permission prompt: grant, deny, rationale
camera = "grant"
record_audio = "grant"

[ipc]
# Override the control socket path (defaults to $XDG_RUNTIME_DIR/livecast.sock)
# socket_path = "/run/user/1000/livecast.sock"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ConfigFile::default();
        assert_eq!(config.video.preset, "720p30");
        assert_eq!(config.audio.channels, "stereo");
        assert!(config.stream.url.is_none());
    }

    #[test]
    fn test_sample_config_parses() {
        let sample = sample_config();
        let config: ConfigFile = toml::from_str(&sample).unwrap();
        assert_eq!(config.video.preset, "720p30");
        assert_eq!(config.audio.sample_rate, 44_100);
        assert_eq!(config.permissions.camera, PermissionPolicy::Grant);
    }

    #[test]
    fn test_unknown_preset_is_config_error() {
        let settings = VideoSettings {
            preset: "8k240".into(),
            ..VideoSettings::default()
        };
        assert!(matches!(
            settings.to_video_config(),
            Err(LivecastError::Config(_))
        ));
    }
}
