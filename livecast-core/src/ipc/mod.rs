//! IPC (Inter-Process Communication) for daemon mode
//!
//! Provides Unix socket-based communication between a daemon hosting a
//! [`LiveStreamHost`](crate::host::LiveStreamHost) and CLI commands.

mod client;
mod protocol;
mod server;

pub use client::{EventStream, IpcClient};
pub use protocol::{IpcMessage, IpcResponse, SessionStatus};
pub use server::IpcServer;

use std::path::{Path, PathBuf};

/// Get the default IPC socket path
///
/// Uses XDG_RUNTIME_DIR if available, otherwise /tmp
pub fn socket_path() -> PathBuf {
    if let Ok(runtime_dir) = std::env::var("XDG_RUNTIME_DIR") {
        PathBuf::from(runtime_dir).join("livecast.sock")
    } else {
        // SAFETY: libc::getuid() is a simple syscall that returns the real user ID.
        // It has no preconditions and cannot fail (always returns a valid uid_t).
        let uid = unsafe { libc::getuid() };
        PathBuf::from(format!("/tmp/livecast-{}.sock", uid))
    }
}

/// Check if a daemon is listening and responsive at `path`
pub async fn daemon_running(path: &Path) -> bool {
    if !path.exists() {
        return false;
    }

    match IpcClient::connect_to(path).await {
        Ok(mut client) => matches!(client.ping().await, Ok(true)),
        Err(_) => false,
    }
}
