//! Pure Rust image processing backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, GIF, BMP) | `image::ImageReader` with content sniffing |
//! | Identify | `ImageReader::into_dimensions` (header only) |
//! | Crop | `DynamicImage::crop_imm` on a [`center_square_crop`] rect |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` into memory |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::{center_square_crop, thumbnail_dimensions};
use super::params::{Quality, ThumbnailParams, ThumbnailPolicy};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

/// Backend using the `image` crate ecosystem.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Open `path` and sniff its real format, ignoring the extension.
fn open_reader(path: &Path) -> Result<ImageReader<BufReader<File>>, BackendError> {
    Ok(ImageReader::open(path)?.with_guessed_format()?)
}

/// Load and decode an image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    open_reader(path)?.decode().map_err(|e| {
        BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
    })
}

/// Crop (or not) and resize according to `policy`.
fn shape(img: &DynamicImage, policy: ThumbnailPolicy, size: u32) -> DynamicImage {
    let source = (img.width(), img.height());
    let (w, h) = thumbnail_dimensions(policy, source, size);
    match policy {
        ThumbnailPolicy::Crop => {
            let rect = center_square_crop(source.0, source.1);
            img.crop_imm(rect.x, rect.y, rect.width, rect.height)
                .resize_exact(w, h, FilterType::Lanczos3)
        }
        ThumbnailPolicy::Fit => img.resize_exact(w, h, FilterType::Lanczos3),
    }
}

/// Encode as baseline JPEG. Alpha is dropped since JPEG cannot carry it.
fn encode_jpeg(img: &DynamicImage, quality: Quality) -> Result<Vec<u8>, BackendError> {
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut out = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut out, quality.value());
    rgb.write_with_encoder(encoder)
        .map_err(|e| BackendError::ProcessingFailed(format!("JPEG encode failed: {}", e)))?;
    Ok(out)
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = open_reader(path)?.into_dimensions().map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to read dimensions: {}", e))
        })?;
        Ok(Dimensions { width, height })
    }

    fn thumbnail(&self, params: &ThumbnailParams) -> Result<Vec<u8>, BackendError> {
        let img = load_image(&params.source)?;
        debug!(
            source = %params.source.display(),
            width = img.width(),
            height = img.height(),
            policy = ?params.policy,
            size = params.size,
            "Rendering thumbnail"
        );
        let thumb = shape(&img, params.policy, params.size);
        encode_jpeg(&thumb, params.quality)
    }
}
