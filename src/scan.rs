//! Image index building.
//!
//! Walks a directory tree, keeps every file with a supported image extension,
//! and produces an [`ImageIndex`]: an immutable snapshot ordered newest first.
//!
//! ## Ordering and ids
//!
//! Entries are sorted by last-modified time, descending. Equal timestamps are
//! broken by path so two builds of an unchanged tree always agree. Each entry's
//! `id` is its position in that order (`0..N-1`); ids are reassigned on every
//! build and are only meaningful against the snapshot that issued them.
//!
//! ## Error policy
//!
//! Scanning is best effort. An unreadable directory or an entry that vanishes
//! mid-walk is logged, counted in [`ImageIndex::skipped`], and skipped along with
//! everything beneath it. Building never fails; a partial index is still an index.
//!
//! File contents are never opened here, only metadata.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::bounds;

/// Extensions accepted by the builder, compared case-insensitively.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp"];

/// One discovered image file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEntry {
    /// Position in the snapshot that produced this entry.
    pub id: usize,
    /// File base name, e.g. `IMG_0042.jpg`.
    pub name: String,
    /// Absolute path used to reopen the file.
    pub path: PathBuf,
    pub modified_at: SystemTime,
}

/// An immutable, fully-built snapshot of the images under a root directory.
#[derive(Debug, Clone, Default)]
pub struct ImageIndex {
    root: PathBuf,
    entries: Vec<ImageEntry>,
    skipped: usize,
}

impl ImageIndex {
    /// Assemble a snapshot from unordered entries.
    ///
    /// Sorts newest first (path as tie-break) and assigns ids in that order,
    /// overwriting whatever ids the caller supplied.
    pub fn from_entries(root: PathBuf, mut entries: Vec<ImageEntry>, skipped: usize) -> Self {
        entries.sort_by(|a, b| {
            b.modified_at
                .cmp(&a.modified_at)
                .then_with(|| a.path.cmp(&b.path))
        });
        for (id, entry) in entries.iter_mut().enumerate() {
            entry.id = id;
        }
        Self {
            root,
            entries,
            skipped,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn entries(&self) -> &[ImageEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of walk errors absorbed while building this snapshot.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn get(&self, id: usize) -> Option<&ImageEntry> {
        self.entries.get(id)
    }

    /// Look up an entry by an untrusted id, clamping it into range.
    ///
    /// Negative ids resolve to the newest image and ids past the end resolve to
    /// the oldest. Returns `None` only when the index is empty.
    pub fn resolve(&self, id: i64) -> Option<&ImageEntry> {
        let last = self.entries.len().checked_sub(1)?;
        let clamped = bounds::clamp(id, 0, i64::try_from(last).unwrap_or(i64::MAX));
        self.entries.get(clamped as usize)
    }
}

/// Build an index of every supported image under `root`.
pub fn build(root: &Path) -> ImageIndex {
    debug!(root = %root.display(), "Building image index");

    let mut entries = Vec::new();
    let mut skipped = 0;

    for item in WalkDir::new(root).follow_links(false) {
        let entry = match item {
            Ok(entry) => entry,
            Err(err) => {
                // walkdir has already pruned the failing directory; keep going
                warn!(path = ?err.path(), "Skipping unreadable entry: {err}");
                skipped += 1;
                continue;
            }
        };

        if !entry.file_type().is_file() || !is_image(entry.path()) {
            continue;
        }

        let modified_at = match entry.metadata().map(|m| m.modified()) {
            Ok(Ok(time)) => time,
            Ok(Err(err)) => {
                warn!(path = %entry.path().display(), "No modification time: {err}");
                skipped += 1;
                continue;
            }
            Err(err) => {
                warn!(path = %entry.path().display(), "Failed to read metadata: {err}");
                skipped += 1;
                continue;
            }
        };

        entries.push(ImageEntry {
            id: 0,
            name: entry.file_name().to_string_lossy().into_owned(),
            path: entry.into_path(),
            modified_at,
        });
    }

    let index = ImageIndex::from_entries(root.to_path_buf(), entries, skipped);
    info!(
        root = %root.display(),
        images = index.len(),
        skipped = index.skipped(),
        "Image index built"
    );
    index
}

/// Whether `path` carries one of [`IMAGE_EXTENSIONS`].
pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}
