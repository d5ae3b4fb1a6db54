//! IPC server for daemon mode
//!
//! Listens on a Unix socket and serves a [`LiveStreamHost`]. Each client
//! connection runs in its own task.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use super::protocol::{IpcMessage, IpcResponse, SessionStatus};
use super::socket_path;
use crate::error::{ErrorKind, LivecastError, Result};
use crate::host::LiveStreamHost;
use crate::types::SessionEvent;

/// What a connection does after a response has been written
enum Next {
    Continue,
    Subscribe(broadcast::Receiver<SessionEvent>),
    Shutdown,
}

/// IPC server that handles client connections
pub struct IpcServer {
    /// Path to the Unix socket
    socket_path: PathBuf,
    /// Listener for incoming connections
    listener: Option<UnixListener>,
    /// Host being served
    host: Arc<LiveStreamHost>,
    /// Shutdown signal sender
    shutdown_tx: broadcast::Sender<()>,
    /// Start time for uptime calculation
    start_time: Instant,
}

impl IpcServer {
    /// Create a server on the default socket path
    pub fn new(host: Arc<LiveStreamHost>) -> Self {
        Self::with_socket_path(host, socket_path())
    }

    /// Create a server on a specific socket path
    pub fn with_socket_path(host: Arc<LiveStreamHost>, path: impl Into<PathBuf>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            socket_path: path.into(),
            listener: None,
            host,
            shutdown_tx,
            start_time: Instant::now(),
        }
    }

    /// Socket path this server binds
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Start listening for connections
    pub async fn start(&mut self) -> Result<()> {
        if self.socket_path.exists() {
            std::fs::remove_file(&self.socket_path)
                .map_err(|e| LivecastError::ipc(format!("Failed to remove old socket: {}", e)))?;
        }

        if let Some(parent) = self.socket_path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    LivecastError::ipc(format!("Failed to create socket directory: {}", e))
                })?;
            }
        }

        let listener = UnixListener::bind(&self.socket_path).map_err(|e| {
            LivecastError::ipc(format!(
                "Failed to bind socket at {:?}: {}",
                self.socket_path, e
            ))
        })?;

        // Owner-only (0600)
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&self.socket_path, permissions).map_err(|e| {
            warn!("Failed to set socket permissions: {}", e);
            LivecastError::ipc(format!("Failed to set socket permissions: {}", e))
        })?;

        info!("IPC server listening on {:?}", self.socket_path);
        self.listener = Some(listener);

        Ok(())
    }

    /// Get a receiver for shutdown signals
    pub fn shutdown_receiver(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Accept connections until a client requests shutdown
    pub async fn run(&self) -> Result<()> {
        let listener = self
            .listener
            .as_ref()
            .ok_or_else(|| LivecastError::ipc("Server not started"))?;
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, _addr)) => {
                        debug!("IPC client connected");
                        let connection = Connection {
                            host: self.host.clone(),
                            shutdown_tx: self.shutdown_tx.clone(),
                            start_time: self.start_time,
                        };
                        tokio::spawn(connection.serve(stream));
                    }
                    Err(e) => error!("Failed to accept connection: {}", e),
                },
                _ = shutdown_rx.recv() => {
                    info!("IPC server shutting down");
                    return Ok(());
                }
            }
        }
    }

    /// Clean up the socket file
    pub fn cleanup(&self) {
        if self.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.socket_path) {
                warn!("Failed to remove socket file: {}", e);
            } else {
                debug!("Removed socket file {:?}", self.socket_path);
            }
        }
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// State shared by one client connection
struct Connection {
    host: Arc<LiveStreamHost>,
    shutdown_tx: broadcast::Sender<()>,
    start_time: Instant,
}

impl Connection {
    async fn serve(self, stream: UnixStream) {
        let (reader, mut writer) = stream.into_split();
        let mut reader = BufReader::new(reader);
        let mut line = String::new();

        loop {
            line.clear();
            match reader.read_line(&mut line).await {
                Ok(0) => {
                    debug!("IPC client disconnected");
                    return;
                }
                Ok(_) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    let (response, next) = match IpcMessage::from_bytes(trimmed.as_bytes()) {
                        Ok(msg) => self.handle_message(msg).await,
                        Err(e) => {
                            warn!("Invalid IPC message: {}", e);
                            (
                                IpcResponse::error(ErrorKind::Ipc, format!("Invalid message: {}", e)),
                                Next::Continue,
                            )
                        }
                    };

                    if let Err(e) = writer.write_all(&response.to_bytes()).await {
                        error!("Failed to send IPC response: {}", e);
                        return;
                    }

                    match next {
                        Next::Continue => {}
                        Next::Subscribe(events) => {
                            self.forward_events(events, reader, writer).await;
                            return;
                        }
                        Next::Shutdown => {
                            let _ = self.shutdown_tx.send(());
                            return;
                        }
                    }
                }
                Err(e) => {
                    error!("Error reading from IPC client: {}", e);
                    return;
                }
            }
        }
    }

    /// Push session events until the client hangs up or the server stops
    async fn forward_events(
        &self,
        mut events: broadcast::Receiver<SessionEvent>,
        mut reader: BufReader<OwnedReadHalf>,
        mut writer: OwnedWriteHalf,
    ) {
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let mut scratch = String::new();

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Ok(event) => {
                        let response = IpcResponse::Event { event };
                        if writer.write_all(&response.to_bytes()).await.is_err() {
                            debug!("Subscriber went away");
                            return;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("Subscriber lagged, skipped {} event(s)", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => return,
                },
                read = reader.read_line(&mut scratch) => match read {
                    Ok(0) | Err(_) => {
                        debug!("Subscriber disconnected");
                        return;
                    }
                    Ok(_) => scratch.clear(),
                },
                _ = shutdown_rx.recv() => return,
            }
        }
    }

    async fn handle_message(&self, msg: IpcMessage) -> (IpcResponse, Next) {
        match msg {
            IpcMessage::Ping => (IpcResponse::Pong, Next::Continue),
            // Subscribe before acknowledging so no later event is missed
            IpcMessage::Subscribe => (IpcResponse::Ok, Next::Subscribe(self.host.subscribe())),
            IpcMessage::Shutdown => {
                info!("Received shutdown command via IPC");
                self.host.dispose().await;
                (IpcResponse::Stopping, Next::Shutdown)
            }
            msg => {
                let response = self
                    .dispatch(msg)
                    .await
                    .unwrap_or_else(IpcResponse::from);
                (response, Next::Continue)
            }
        }
    }

    async fn dispatch(&self, msg: IpcMessage) -> Result<IpcResponse> {
        let host = &self.host;
        let response = match msg {
            IpcMessage::Status => IpcResponse::Status(self.status().await),
            IpcMessage::ListCameras => IpcResponse::Cameras {
                cameras: host.cameras().describe_all()?,
            },
            IpcMessage::DescribeCamera { camera_id } => IpcResponse::Camera {
                camera: host.cameras().describe(&camera_id)?,
            },
            IpcMessage::SetVideoConfig { config } => {
                host.session().await?.set_video_config(config).await?;
                IpcResponse::Ok
            }
            IpcMessage::SetAudioConfig { config } => {
                host.session().await?.set_audio_config(config).await?;
                IpcResponse::Ok
            }
            IpcMessage::SetCamera { camera_id } => {
                host.session().await?.set_capture_device(&camera_id).await?;
                IpcResponse::Ok
            }
            IpcMessage::StartPreview => {
                host.session().await?.start_preview().await?;
                IpcResponse::Ok
            }
            IpcMessage::StopPreview => {
                host.session().await?.stop_preview().await?;
                IpcResponse::Ok
            }
            IpcMessage::StartStream { url } => {
                host.session().await?.start_stream(&url).await?;
                IpcResponse::Ok
            }
            IpcMessage::StopStream => {
                host.session().await?.stop_stream().await?;
                IpcResponse::Ok
            }
            IpcMessage::SetMuted { muted } => {
                host.session().await?.set_muted(muted);
                IpcResponse::Ok
            }
            IpcMessage::GetMuted => IpcResponse::Muted {
                muted: host.session().await?.is_muted(),
            },
            IpcMessage::SetZoomRatio { ratio } => {
                host.settings().set_zoom_ratio(ratio).await?;
                IpcResponse::Ok
            }
            IpcMessage::GetZoomRatio => IpcResponse::ZoomRatio {
                ratio: host.settings().zoom_ratio().await?,
            },
            IpcMessage::Dispose => {
                host.dispose().await;
                IpcResponse::Ok
            }
            IpcMessage::Ping | IpcMessage::Subscribe | IpcMessage::Shutdown => {
                return Err(LivecastError::ipc("Message handled by the connection loop"));
            }
        };
        Ok(response)
    }

    async fn status(&self) -> SessionStatus {
        SessionStatus {
            session: self.host.status().await,
            engine_created: self.host.engine_created(),
            last_event: self.host.last_event(),
            pid: std::process::id(),
            uptime_seconds: self.start_time.elapsed().as_secs_f64(),
        }
    }
}
