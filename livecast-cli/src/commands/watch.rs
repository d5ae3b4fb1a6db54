//! Watch command - print session events as they happen

use anyhow::Result;
use livecast_core::SessionEvent;
use tracing::debug;

use super::Remote;

/// Print session events until interrupted or the daemon exits
pub async fn watch(remote: &Remote) -> Result<()> {
    let client = remote.connect().await?;
    let mut events = client.subscribe().await?;

    println!("Watching session events (Ctrl+C to stop)...\n");

    loop {
        tokio::select! {
            event = events.next() => match event? {
                Some(event) => print_event(&event),
                None => {
                    println!("Daemon closed the connection.");
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                debug!("Interrupted");
                break;
            }
        }
    }

    Ok(())
}

fn print_event(event: &SessionEvent) {
    match event {
        SessionEvent::Connected => println!("● connected"),
        SessionEvent::Disconnected => println!("○ disconnected"),
        SessionEvent::ConnectionFailed { reason } => println!("✗ {}", reason),
        SessionEvent::Error { message } => println!("✗ error: {}", message),
        SessionEvent::VideoSizeChanged { resolution } => println!("↔ video size {}", resolution),
    }
}
