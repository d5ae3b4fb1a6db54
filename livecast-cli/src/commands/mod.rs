//! CLI command implementations

mod cameras;
mod config;
mod control;
mod status;
mod watch;

pub use cameras::{cameras, CamerasArgs};
pub use config::{config, ConfigArgs};
pub use control::{
    camera, configure, dispose, mute, preview, shutdown, stop, stop_preview, stream, zoom,
    ConfigureArgs, Toggle,
};
pub use status::status;
pub use watch::watch;

use anyhow::{Context, Result};
use livecast_core::config::ConfigFile;
use livecast_core::ipc::{self, IpcClient};
use std::path::PathBuf;

/// Where to reach the host daemon
pub struct Remote {
    socket: PathBuf,
}

impl Remote {
    /// Resolve the socket: command line, then config file, then default
    pub fn new(socket: Option<PathBuf>) -> Self {
        let socket = socket
            .or_else(|| ConfigFile::load_or_default().ipc.socket_path)
            .unwrap_or_else(ipc::socket_path);
        Self { socket }
    }

    /// Connect to the daemon
    pub async fn connect(&self) -> Result<IpcClient> {
        IpcClient::connect_to(&self.socket).await.with_context(|| {
            format!(
                "No livecast daemon reachable at {}. Start the host application first.",
                self.socket.display()
            )
        })
    }
}
