//! Pure calculation functions for thumbnail geometry.
//!
//! All functions here are pure and testable without any I/O or images.

use super::params::ThumbnailPolicy;

/// A pixel rectangle inside a source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// The largest centered square inside a `width × height` image.
///
/// Landscape sources lose equal strips from the left and right; portrait
/// sources lose equal strips from the top and bottom. An odd leftover pixel
/// goes to the right/bottom strip.
///
/// ```
/// # use image_browse::imaging::{CropRect, center_square_crop};
/// assert_eq!(
///     center_square_crop(4000, 2000),
///     CropRect { x: 1000, y: 0, width: 2000, height: 2000 }
/// );
/// ```
pub fn center_square_crop(width: u32, height: u32) -> CropRect {
    if width > height {
        CropRect {
            x: (width - height) / 2,
            y: 0,
            width: height,
            height,
        }
    } else {
        CropRect {
            x: 0,
            y: (height - width) / 2,
            width,
            height: width,
        }
    }
}

/// Upper bound on either edge of a rendered thumbnail.
pub const MAX_THUMBNAIL_EDGE: u32 = 4096;

/// Dimensions for a proportional resize to `target_width`.
///
/// Height follows the source aspect ratio, rounded, and is at least 1. A tall
/// source whose height would pass [`MAX_THUMBNAIL_EDGE`] is capped there
/// instead, with the width shrunk to keep the ratio.
pub fn fit_dimensions(source: (u32, u32), target_width: u32) -> (u32, u32) {
    let (src_w, src_h) = source;
    if src_w == 0 || src_h == 0 {
        return (target_width, target_width);
    }
    let h = (target_width as f64 * src_h as f64 / src_w as f64).round();
    if h > MAX_THUMBNAIL_EDGE as f64 {
        let w = (MAX_THUMBNAIL_EDGE as f64 * src_w as f64 / src_h as f64).round() as u32;
        return (w.max(1), MAX_THUMBNAIL_EDGE);
    }
    (target_width, (h as u32).max(1))
}

/// Final thumbnail dimensions for a source of size `source`.
pub fn thumbnail_dimensions(policy: ThumbnailPolicy, source: (u32, u32), size: u32) -> (u32, u32) {
    match policy {
        ThumbnailPolicy::Crop => (size, size),
        ThumbnailPolicy::Fit => fit_dimensions(source, size),
    }
}
