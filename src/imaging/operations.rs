//! High-level image operations.
//!
//! These functions resolve an untrusted id against an index snapshot, build
//! parameters, and call the backend. Nothing is cached: every call re-reads
//! and re-renders.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::{Quality, ThumbnailParams, ThumbnailPolicy};
use crate::scan::{ImageEntry, ImageIndex};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Sources with more pixels than this are refused before decoding.
pub const MAX_SOURCE_PIXELS: u64 = 250_000_000;

#[derive(Error, Debug)]
pub enum ImagingError {
    #[error("The image index is empty")]
    EmptyIndex,
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("{path} is {width}x{height}, too large to render a thumbnail")]
    TooLarge { path: String, width: u32, height: u32 },
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, ImagingError>;

/// Configuration for thumbnail generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThumbnailConfig {
    pub size: u32,
    pub policy: ThumbnailPolicy,
    pub quality: Quality,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            size: 80,
            policy: ThumbnailPolicy::Crop,
            quality: Quality::default(),
        }
    }
}

/// A rendered thumbnail and the entry it was made from.
#[derive(Debug, Clone)]
pub struct Thumbnail {
    pub entry: ImageEntry,
    pub jpeg: Vec<u8>,
}

/// Original file bytes and the entry they came from.
#[derive(Debug, Clone)]
pub struct Original {
    pub entry: ImageEntry,
    pub bytes: Vec<u8>,
}

/// Clamp `id` into the index, failing only when there is nothing to clamp to.
pub fn resolve_entry(index: &ImageIndex, id: i64) -> Result<&ImageEntry> {
    index.resolve(id).ok_or(ImagingError::EmptyIndex)
}

/// Plan a thumbnail operation without executing it.
pub fn plan_thumbnail(source: &Path, config: &ThumbnailConfig) -> ThumbnailParams {
    ThumbnailParams {
        source: source.to_path_buf(),
        size: config.size,
        policy: config.policy,
        quality: config.quality,
    }
}

/// Refuse sources whose full decode would not fit a sane memory budget.
fn check_source_size(path: &Path, dims: Dimensions) -> Result<()> {
    if dims.width as u64 * dims.height as u64 > MAX_SOURCE_PIXELS {
        return Err(ImagingError::TooLarge {
            path: path.display().to_string(),
            width: dims.width,
            height: dims.height,
        });
    }
    Ok(())
}

/// Render the thumbnail for image `id`.
///
/// Out-of-range ids resolve to the nearest entry. The source header is read
/// first so oversized images are refused without a full decode. Blocks on
/// decode and encode.
pub fn render_thumbnail(
    backend: &impl ImageBackend,
    index: &ImageIndex,
    id: i64,
    config: &ThumbnailConfig,
) -> Result<Thumbnail> {
    let entry = resolve_entry(index, id)?;
    let dims = backend.identify(&entry.path)?;
    debug!(
        id = entry.id,
        width = dims.width,
        height = dims.height,
        "Rendering thumbnail"
    );
    check_source_size(&entry.path, dims)?;
    let jpeg = backend.thumbnail(&plan_thumbnail(&entry.path, config))?;
    Ok(Thumbnail {
        entry: entry.clone(),
        jpeg,
    })
}

/// Read the original bytes of image `id`, verbatim.
pub fn read_original(index: &ImageIndex, id: i64) -> Result<Original> {
    let entry = resolve_entry(index, id)?;
    let bytes = std::fs::read(&entry.path).map_err(|source| ImagingError::Read {
        path: entry.path.display().to_string(),
        source,
    })?;
    Ok(Original {
        entry: entry.clone(),
        bytes,
    })
}

/// MIME type for an original, from its extension.
pub fn content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
}
