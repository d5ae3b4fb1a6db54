//! Linux camera enumeration via sysfs
//!
//! Lists V4L2 capture nodes from `/sys/class/video4linux`. Linux exposes no
//! sensor orientation or zoom ratio metadata there, so only the lens
//! classification is derived (from the bus and the device name).

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use super::{CameraCharacteristics, CameraPlatform, LensFacing};
use crate::error::{LivecastError, Result};

/// Default sysfs class directory for V4L2 devices
pub const VIDEO4LINUX_CLASS: &str = "/sys/class/video4linux";

/// Camera platform backed by sysfs
pub struct SysfsCameraPlatform {
    root: PathBuf,
}

impl Default for SysfsCameraPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl SysfsCameraPlatform {
    /// Read from the system class directory
    pub fn new() -> Self {
        Self::with_root(VIDEO4LINUX_CLASS)
    }

    /// Read from another directory laid out like `/sys/class/video4linux`
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn node_dir(&self, camera_id: &str) -> Result<PathBuf> {
        let dir = self.root.join(camera_id);
        if camera_id.contains('/') || !is_capture_node(&dir) {
            return Err(LivecastError::invalid_device(format!(
                "No camera with id {}",
                camera_id
            )));
        }
        Ok(dir)
    }
}

/// Node number from a name like "video12"
fn node_number(name: &str) -> Option<u32> {
    name.strip_prefix("video")?.parse().ok()
}

fn read_attr(dir: &Path, attr: &str) -> Option<String> {
    fs::read_to_string(dir.join(attr))
        .ok()
        .map(|s| s.trim().to_string())
}

/// Capture nodes have index 0; metadata nodes of the same device have 1
fn is_capture_node(dir: &Path) -> bool {
    if !dir.is_dir() {
        return false;
    }
    match read_attr(dir, "index") {
        Some(index) => index == "0",
        None => true,
    }
}

fn is_usb_device(dir: &Path) -> bool {
    // /sys/class/video4linux/videoN/device -> .../usb3/3-6/3-6:1.0
    fs::canonicalize(dir.join("device"))
        .map(|path| {
            path.components()
                .any(|c| c.as_os_str().to_string_lossy().starts_with("usb"))
        })
        .unwrap_or(false)
}

fn classify(name: &str, usb: bool) -> Option<LensFacing> {
    let name = name.to_lowercase();
    let words: Vec<&str> = name
        .split(|c: char| !c.is_alphanumeric() && c != '-')
        .filter(|w| !w.is_empty())
        .collect();
    let has = |word: &str| words.iter().any(|w| *w == word);
    let facing = |side: &str| {
        has(&format!("{}-facing", side))
            || words.windows(2).any(|pair| pair[0] == side && pair[1] == "facing")
    };

    if has("front") || facing("user") {
        Some(LensFacing::Front)
    } else if has("back") || has("rear") || facing("world") {
        Some(LensFacing::Back)
    } else if usb {
        Some(LensFacing::External)
    } else {
        None
    }
}

impl CameraPlatform for SysfsCameraPlatform {
    fn camera_ids(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("{:?} does not exist, no cameras", self.root);
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut nodes: Vec<(u32, String)> = entries
            .flatten()
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().to_string();
                let number = node_number(&name)?;
                if is_capture_node(&entry.path()) {
                    Some((number, name))
                } else {
                    trace!("Skipping non-capture node {}", name);
                    None
                }
            })
            .collect();

        nodes.sort_by_key(|(number, _)| *number);
        Ok(nodes.into_iter().map(|(_, name)| name).collect())
    }

    fn characteristics(&self, camera_id: &str) -> Result<CameraCharacteristics> {
        let dir = self.node_dir(camera_id)?;
        let name = read_attr(&dir, "name").unwrap_or_default();
        let usb = is_usb_device(&dir);

        Ok(CameraCharacteristics {
            sensor_orientation: None,
            lens_facing: classify(&name, usb),
            zoom_ratio_range: None,
            max_digital_zoom: None,
        })
    }
}
