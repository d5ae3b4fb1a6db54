//! Cameras command - list cameras and their characteristics

use anyhow::Result;
use clap::Args;
use livecast_core::capture::{CaptureSourceRegistry, SysfsCameraPlatform};
use livecast_core::CaptureDeviceDescriptor;
use std::path::PathBuf;
use std::sync::Arc;

use super::Remote;

/// Arguments for the cameras command
#[derive(Args)]
pub struct CamerasArgs {
    /// Ask the running daemon instead of enumerating locally
    #[arg(long)]
    pub remote: bool,

    /// Alternate video4linux class directory
    #[arg(long, value_name = "DIR")]
    pub sysfs_root: Option<PathBuf>,
}

/// List cameras
pub async fn cameras(args: CamerasArgs, remote: &Remote) -> Result<()> {
    println!("Livecast - Cameras\n");

    if args.remote {
        let mut client = remote.connect().await?;
        let cameras = client.list_cameras().await?;
        print_cameras(&cameras);
        return Ok(());
    }

    let platform = match args.sysfs_root {
        Some(root) => SysfsCameraPlatform::with_root(root),
        None => SysfsCameraPlatform::new(),
    };
    let registry = CaptureSourceRegistry::new(Arc::new(platform));

    let ids = registry.list_device_ids()?;
    if ids.is_empty() {
        println!("No cameras found.");
        return Ok(());
    }

    for id in ids {
        match registry.describe(&id) {
            Ok(camera) => print_camera(&camera),
            Err(e) => println!("  {:<10} unavailable: {}", id, e),
        }
    }

    Ok(())
}

fn print_cameras(cameras: &[CaptureDeviceDescriptor]) {
    if cameras.is_empty() {
        println!("No cameras found.");
    }
    for camera in cameras {
        print_camera(camera);
    }
}

fn print_camera(camera: &CaptureDeviceDescriptor) {
    println!(
        "  {:<10} {:<6} rotation {:>3}°  zoom {:.1}x-{:.1}x",
        camera.id,
        camera.lens_direction,
        camera.sensor_rotation_degrees,
        camera.zoom_range.min,
        camera.zoom_range.max
    );
}
