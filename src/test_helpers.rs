//! Shared test utilities.
//!
//! Fixture builders for image directories and in-memory indexes. Files written
//! by [`touch`] are not decodable images; use [`write_jpeg`] or [`write_png`]
//! when a test needs real pixels.
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! touch(tmp.path(), "a.jpg", 100);
//! write_jpeg(tmp.path(), "b.jpg", 64, 32);
//! let index = crate::scan::build(tmp.path());
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use image::{ImageEncoder, RgbImage, RgbaImage};

use crate::scan::{ImageEntry, ImageIndex};

// =========================================================================
// Filesystem fixtures
// =========================================================================

/// Create `dir/name` with placeholder bytes and an mtime of `mtime_secs`
/// seconds after the epoch. Parent directories are created as needed.
pub fn touch(dir: &Path, name: &str, mtime_secs: u64) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, b"not really an image").unwrap();
    set_mtime(&path, mtime_secs);
    path
}

pub fn set_mtime(path: &Path, mtime_secs: u64) {
    let file = fs::File::options().write(true).open(path).unwrap();
    file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(mtime_secs))
        .unwrap();
}

/// Write a gradient JPEG of the given size.
pub fn write_jpeg(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let file = fs::File::create(&path).unwrap();
    image::codecs::jpeg::JpegEncoder::new(std::io::BufWriter::new(file))
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
    path
}

/// Write a semi-transparent PNG of the given size.
pub fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    RgbaImage::from_pixel(width, height, image::Rgba([200, 40, 40, 120]))
        .save(&path)
        .unwrap();
    path
}

// =========================================================================
// In-memory indexes
// =========================================================================

/// An index of `count` entries under `/gallery`, newest first, without
/// touching the filesystem. Entry `i` is named `img-{i:03}.jpg`.
pub fn synthetic_index(count: usize) -> ImageIndex {
    let base = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000);
    let entries = (0..count)
        .map(|i| ImageEntry {
            id: 0,
            name: format!("img-{i:03}.jpg"),
            path: PathBuf::from(format!("/gallery/img-{i:03}.jpg")),
            modified_at: base - Duration::from_secs(i as u64),
        })
        .collect();
    ImageIndex::from_entries(PathBuf::from("/gallery"), entries, 0)
}

/// Decode JPEG bytes and return their dimensions. Panics if not a JPEG.
pub fn jpeg_dimensions(bytes: &[u8]) -> (u32, u32) {
    assert_eq!(
        image::guess_format(bytes).unwrap(),
        image::ImageFormat::Jpeg,
        "expected JPEG output"
    );
    let img = image::load_from_memory(bytes).unwrap();
    (img.width(), img.height())
}
