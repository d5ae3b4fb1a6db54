//! Status command - show status of the running session

use anyhow::Result;
use livecast_core::SessionPhase;

use super::Remote;

/// Show status of the running session
pub async fn status(remote: &Remote) -> Result<()> {
    println!("Livecast - Status\n");

    let mut client = remote.connect().await?;
    let status = client.status().await?;

    println!("Daemon:");
    println!("  PID:     {}", status.pid);
    println!("  Uptime:  {:.0}s", status.uptime_seconds);
    println!(
        "  Engine:  {}",
        if status.engine_created { "created" } else { "not created" }
    );

    let Some(session) = status.session else {
        println!();
        println!("No session. Run 'livecast configure' to create one.");
        return Ok(());
    };

    println!();
    println!("Session {}:", session.handle);
    println!("  State:      {}", session.phase);
    println!("  Previewing: {}", session.previewing);
    println!("  Streaming:  {}", session.streaming);
    println!("  Muted:      {}", session.muted);
    println!("  Texture:    {}", session.texture_id);
    println!(
        "  Camera:     {}",
        session.camera_id.as_deref().unwrap_or("(not a camera)")
    );

    match &session.video_config {
        Some(video) => println!("  Video:      {}", video),
        None => println!("  Video:      not configured"),
    }
    match &session.audio_config {
        Some(audio) => println!("  Audio:      {}", audio),
        None => println!("  Audio:      not configured"),
    }

    if let Some(event) = status.last_event {
        println!("  Last event: {}", event);
    }

    if session.phase == SessionPhase::Idle {
        println!();
        println!("Run 'livecast configure' to set a video configuration.");
    }

    Ok(())
}
