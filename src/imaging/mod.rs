//! Thumbnail rendering in pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `ImageReader::into_dimensions` |
//! | **Thumbnail (crop)** | centered square crop + Lanczos3 resize → JPEG |
//! | **Thumbnail (fit)** | proportional Lanczos3 resize to a width → JPEG |
//! | **Original** | raw file bytes, no decoding |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for crop and resize geometry (unit testable)
//! - **Parameters**: Data structures describing a render
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: id resolution against an index, then backend execution

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{
    CropRect, MAX_THUMBNAIL_EDGE, center_square_crop, fit_dimensions, thumbnail_dimensions,
};
pub use operations::{
    ImagingError, Original, Thumbnail, ThumbnailConfig, content_type, read_original,
    render_thumbnail, resolve_entry,
};
pub use params::{Quality, ThumbnailParams, ThumbnailPolicy};
pub use rust_backend::RustBackend;
