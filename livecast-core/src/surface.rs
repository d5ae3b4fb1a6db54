//! Preview rendering targets
//!
//! A session owns one [`PreviewTarget`] for its lifetime. The target hands
//! the engine a drawable [`PreviewSurface`] sized to the current video
//! resolution and is released explicitly on disposal.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, Ordering};
use tracing::debug;

use crate::config::Resolution;
use crate::error::{LivecastError, Result};

/// Drawable surface handed to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewSurface {
    /// Identifier of the owning texture
    pub texture_id: i64,
    /// Default buffer size
    pub resolution: Resolution,
}

/// Renderable texture owned by a session
pub trait PreviewTarget: Send + Sync {
    /// Texture identifier shown to the caller
    fn id(&self) -> i64;

    /// Size the texture's buffers and return a drawable surface
    fn surface(&mut self, resolution: Resolution) -> Result<PreviewSurface>;

    /// Release the texture; further `surface` calls fail
    fn release(&mut self);
}

/// Allocator for preview textures
pub trait SurfaceAllocator: Send + Sync {
    fn create_surface_texture(&self) -> Result<Box<dyn PreviewTarget>>;
}

/// Allocator for hosts without a renderer
///
/// Hands out sequential texture ids; surfaces only carry their size.
#[derive(Debug)]
pub struct HeadlessSurfaceAllocator {
    next_id: AtomicI64,
}

impl Default for HeadlessSurfaceAllocator {
    fn default() -> Self {
        Self {
            next_id: AtomicI64::new(1),
        }
    }
}

impl HeadlessSurfaceAllocator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SurfaceAllocator for HeadlessSurfaceAllocator {
    fn create_surface_texture(&self) -> Result<Box<dyn PreviewTarget>> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        debug!("Allocated headless texture {}", id);
        Ok(Box::new(HeadlessTarget {
            id,
            resolution: None,
            released: false,
        }))
    }
}

struct HeadlessTarget {
    id: i64,
    resolution: Option<Resolution>,
    released: bool,
}

impl PreviewTarget for HeadlessTarget {
    fn id(&self) -> i64 {
        self.id
    }

    fn surface(&mut self, resolution: Resolution) -> Result<PreviewSurface> {
        if self.released {
            return Err(LivecastError::invalid_operation(format!(
                "Texture {} has been released",
                self.id
            )));
        }
        self.resolution = Some(resolution);
        Ok(PreviewSurface {
            texture_id: self.id,
            resolution,
        })
    }

    fn release(&mut self) {
        if !self.released {
            debug!("Released headless texture {}", self.id);
            self.released = true;
        }
    }
}
