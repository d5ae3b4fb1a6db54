//! IPC client for CLI commands
//!
//! Connects to the running daemon to send commands and receive responses.
//! Timeouts bound the transport only; a slow engine operation on the
//! daemon side surfaces here as a read timeout.

use std::path::Path;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::UnixStream;
use tracing::debug;

use super::protocol::{IpcMessage, IpcResponse, SessionStatus};
use super::socket_path;
use crate::config::{AudioConfig, VideoConfig};
use crate::error::{LivecastError, Result};
use crate::types::{CaptureDeviceDescriptor, SessionEvent};

/// Default connection timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default read/write timeout
const IO_TIMEOUT: Duration = Duration::from_secs(30);

/// IPC client for communicating with the daemon
pub struct IpcClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    io_timeout: Duration,
}

impl IpcClient {
    /// Connect to the daemon on the default socket path
    pub async fn connect() -> Result<Self> {
        Self::connect_to(&socket_path()).await
    }

    /// Connect to the daemon at a specific socket path
    pub async fn connect_to(path: &Path) -> Result<Self> {
        Self::connect_with_timeout(path, CONNECT_TIMEOUT).await
    }

    /// Connect to the daemon with custom timeout
    pub async fn connect_with_timeout(path: &Path, timeout: Duration) -> Result<Self> {
        if !path.exists() {
            return Err(LivecastError::ipc(format!(
                "No livecast daemon socket at {:?}",
                path
            )));
        }

        let stream = tokio::time::timeout(timeout, UnixStream::connect(path))
            .await
            .map_err(|_| LivecastError::ipc("Connection timed out"))?
            .map_err(|e| LivecastError::ipc(format!("Failed to connect to daemon: {}", e)))?;

        debug!("Connected to daemon at {:?}", path);

        let (reader, writer) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(reader),
            writer,
            io_timeout: IO_TIMEOUT,
        })
    }

    /// Override the read/write timeout
    pub fn with_io_timeout(mut self, timeout: Duration) -> Self {
        self.io_timeout = timeout;
        self
    }

    /// Send a message and receive a response
    async fn send(&mut self, msg: IpcMessage) -> Result<IpcResponse> {
        let msg_bytes = msg.to_bytes();
        tokio::time::timeout(self.io_timeout, self.writer.write_all(&msg_bytes))
            .await
            .map_err(|_| LivecastError::ipc("Write timed out"))?
            .map_err(|e| LivecastError::ipc(format!("Failed to send message: {}", e)))?;

        match tokio::time::timeout(self.io_timeout, self.read_response()).await {
            Ok(response) => response,
            Err(_) => Err(LivecastError::ipc("Read timed out")),
        }
    }

    async fn read_response(&mut self) -> Result<IpcResponse> {
        let mut line = String::new();
        let read = self
            .reader
            .read_line(&mut line)
            .await
            .map_err(|e| LivecastError::ipc(format!("Failed to read response: {}", e)))?;
        if read == 0 {
            return Err(LivecastError::ipc("Daemon closed the connection"));
        }

        IpcResponse::from_bytes(line.trim().as_bytes())
            .map_err(|e| LivecastError::ipc(format!("Invalid response: {}", e)))
    }

    /// Send a message that is acknowledged with `Ok`
    async fn expect_ok(&mut self, msg: IpcMessage) -> Result<()> {
        match self.send(msg).await? {
            IpcResponse::Ok => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    /// Ping the daemon to check if it's alive
    pub async fn ping(&mut self) -> Result<bool> {
        match self.send(IpcMessage::Ping).await {
            Ok(IpcResponse::Pong) => Ok(true),
            Ok(_) => Ok(false),
            Err(_) => Ok(false),
        }
    }

    /// Get the current status
    pub async fn status(&mut self) -> Result<SessionStatus> {
        match self.send(IpcMessage::Status).await? {
            IpcResponse::Status(status) => Ok(status),
            other => Err(unexpected(other)),
        }
    }

    /// List the daemon's cameras
    pub async fn list_cameras(&mut self) -> Result<Vec<CaptureDeviceDescriptor>> {
        match self.send(IpcMessage::ListCameras).await? {
            IpcResponse::Cameras { cameras } => Ok(cameras),
            other => Err(unexpected(other)),
        }
    }

    /// Describe one camera
    pub async fn describe_camera(&mut self, camera_id: &str) -> Result<CaptureDeviceDescriptor> {
        let msg = IpcMessage::DescribeCamera {
            camera_id: camera_id.to_string(),
        };
        match self.send(msg).await? {
            IpcResponse::Camera { camera } => Ok(camera),
            other => Err(unexpected(other)),
        }
    }

    pub async fn set_video_config(&mut self, config: VideoConfig) -> Result<()> {
        self.expect_ok(IpcMessage::SetVideoConfig { config }).await
    }

    pub async fn set_audio_config(&mut self, config: AudioConfig) -> Result<()> {
        self.expect_ok(IpcMessage::SetAudioConfig { config }).await
    }

    pub async fn set_camera(&mut self, camera_id: &str) -> Result<()> {
        self.expect_ok(IpcMessage::SetCamera {
            camera_id: camera_id.to_string(),
        })
        .await
    }

    pub async fn start_preview(&mut self) -> Result<()> {
        self.expect_ok(IpcMessage::StartPreview).await
    }

    pub async fn stop_preview(&mut self) -> Result<()> {
        self.expect_ok(IpcMessage::StopPreview).await
    }

    pub async fn start_stream(&mut self, url: &str) -> Result<()> {
        self.expect_ok(IpcMessage::StartStream {
            url: url.to_string(),
        })
        .await
    }

    pub async fn stop_stream(&mut self) -> Result<()> {
        self.expect_ok(IpcMessage::StopStream).await
    }

    pub async fn set_muted(&mut self, muted: bool) -> Result<()> {
        self.expect_ok(IpcMessage::SetMuted { muted }).await
    }

    pub async fn is_muted(&mut self) -> Result<bool> {
        match self.send(IpcMessage::GetMuted).await? {
            IpcResponse::Muted { muted } => Ok(muted),
            other => Err(unexpected(other)),
        }
    }

    pub async fn set_zoom_ratio(&mut self, ratio: f64) -> Result<()> {
        self.expect_ok(IpcMessage::SetZoomRatio { ratio }).await
    }

    pub async fn zoom_ratio(&mut self) -> Result<f64> {
        match self.send(IpcMessage::GetZoomRatio).await? {
            IpcResponse::ZoomRatio { ratio } => Ok(ratio),
            other => Err(unexpected(other)),
        }
    }

    /// Dispose the daemon's session and engine
    pub async fn dispose(&mut self) -> Result<()> {
        self.expect_ok(IpcMessage::Dispose).await
    }

    /// Request the daemon to stop
    pub async fn shutdown(&mut self) -> Result<()> {
        match self.send(IpcMessage::Shutdown).await? {
            IpcResponse::Stopping => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    /// Turn this connection into an event subscription
    pub async fn subscribe(mut self) -> Result<EventStream> {
        self.expect_ok(IpcMessage::Subscribe).await?;
        Ok(EventStream {
            reader: self.reader,
            _writer: self.writer,
        })
    }
}

/// Session events pushed by the daemon
pub struct EventStream {
    reader: BufReader<OwnedReadHalf>,
    _writer: OwnedWriteHalf,
}

impl EventStream {
    /// Wait for the next event; `None` once the daemon closes the stream
    pub async fn next(&mut self) -> Result<Option<SessionEvent>> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.reader.read_line(&mut line).await? == 0 {
                return Ok(None);
            }
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            return match IpcResponse::from_bytes(trimmed.as_bytes())? {
                IpcResponse::Event { event } => Ok(Some(event)),
                other => Err(unexpected(other)),
            };
        }
    }
}

fn unexpected(response: IpcResponse) -> LivecastError {
    match response {
        IpcResponse::Error { kind, message } => LivecastError::Remote { kind, message },
        other => LivecastError::ipc(format!("Unexpected response: {:?}", other)),
    }
}
