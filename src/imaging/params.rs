//! Parameter types for thumbnail rendering.
//!
//! These describe *what* to render; the [`backend`](super::backend) decides how.
//!
//! - [`Quality`]: JPEG quality (1–100, default 85). Clamped on construction.
//! - [`ThumbnailPolicy`]: square center-crop, or proportional fit to a width.
//! - [`ThumbnailParams`]: source file plus everything needed to render it.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Quality setting for JPEG encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u8);

impl Quality {
    pub fn new(value: u8) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(85)
    }
}

/// How a source image is turned into a thumbnail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThumbnailPolicy {
    /// Center-crop to a square, then resize to `size × size`.
    #[default]
    Crop,
    /// Keep the aspect ratio and resize to a width of `size`.
    Fit,
}

/// Full specification of one thumbnail render.
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailParams {
    pub source: PathBuf,
    /// Edge length for [`ThumbnailPolicy::Crop`], width for [`ThumbnailPolicy::Fit`].
    pub size: u32,
    pub policy: ThumbnailPolicy,
    pub quality: Quality,
}
