//! Source dimension probing.
//!
//! The planner never decodes pixels; it only needs a source's width and
//! height. The [`ImageProbe`] trait is the seam: [`RustProbe`] reads image
//! headers through the `image` crate, and tests substitute a recording mock.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Image not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("Cannot read image size for {}: {reason}", .path.display())]
    Unreadable { path: PathBuf, reason: String },
}

/// Pixel dimensions of a source image. Both sides must be positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    /// `None` when either side is zero.
    pub fn new(width: u32, height: u32) -> Option<Self> {
        (width > 0 && height > 0).then_some(Self { width, height })
    }
}

/// Reads the dimensions of an image on disk.
pub trait ImageProbe: Sync {
    fn identify(&self, path: &Path) -> Result<Dimensions, ProbeError>;
}

/// Header-only probe backed by `image::image_dimensions`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustProbe;

impl RustProbe {
    pub fn new() -> Self {
        Self
    }
}

impl ImageProbe for RustProbe {
    fn identify(&self, path: &Path) -> Result<Dimensions, ProbeError> {
        if !path.exists() {
            return Err(ProbeError::FileNotFound(path.to_path_buf()));
        }
        let (width, height) = image::image_dimensions(path).map_err(|e| ProbeError::Unreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Dimensions::new(width, height).ok_or_else(|| ProbeError::Unreadable {
            path: path.to_path_buf(),
            reason: format!("degenerate size {width}x{height}"),
        })
    }
}
