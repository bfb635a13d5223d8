//! CLI output formatting for the `scan` subcommand.
//!
//! Output is information-first: each image is shown by its id and file name,
//! with the path relative to the root as an indented `Source:` line and the
//! page it lands on for the configured page size.
//!
//! ```text
//! Images in /srv/photos (3)
//! 000 sunset.jpg (page 1)
//!     Source: trips/sunset.jpg
//! 001 dawn.png (page 1)
//!     Source: dawn.png
//! 002 cat.gif (page 1)
//!     Source: pets/cat.gif
//!
//! 3 images, 1 page, 0 skipped
//! ```
//!
//! [`format_index`] returns lines for testability; [`print_index`] writes them
//! to stdout.

use crate::paginate::page_count;
use crate::scan::{ImageEntry, ImageIndex};

// ============================================================================
// Helpers
// ============================================================================

/// Format an id as 3-digit zero-padded.
fn format_id(id: usize) -> String {
    format!("{:0>3}", id)
}

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// Path of an entry relative to the root, falling back to the full path.
fn relative_source(index: &ImageIndex, entry: &ImageEntry) -> String {
    entry
        .path
        .strip_prefix(index.root())
        .unwrap_or(&entry.path)
        .display()
        .to_string()
}

// ============================================================================
// Scan
// ============================================================================

/// Format a built index as display lines.
pub fn format_index(index: &ImageIndex, page_size: usize) -> Vec<String> {
    let page_size = page_size.max(1);
    let mut lines = vec![format!(
        "Images in {} ({})",
        index.root().display(),
        index.len()
    )];

    for entry in index.entries() {
        let page = entry.id / page_size + 1;
        lines.push(format!("{} {} (page {page})", format_id(entry.id), entry.name));
        lines.push(format!(
            "{}Source: {}",
            indent(1),
            relative_source(index, entry)
        ));
    }

    lines.push(String::new());
    lines.push(format!(
        "{}, {}, {} skipped",
        plural(index.len(), "image"),
        plural(page_count(index.len(), page_size), "page"),
        index.skipped()
    ));
    lines
}

pub fn print_index(index: &ImageIndex, page_size: usize) {
    for line in format_index(index, page_size) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use std::path::PathBuf;
    use std::time::{Duration, SystemTime};

    fn entry(name: &str, rel: &str, secs: u64) -> ImageEntry {
        ImageEntry {
            id: 0,
            name: name.into(),
            path: PathBuf::from("/srv/photos").join(rel),
            modified_at: SystemTime::UNIX_EPOCH + Duration::from_secs(secs),
        }
    }

    #[test]
    fn lists_entries_with_relative_sources() {
        let index = ImageIndex::from_entries(
            PathBuf::from("/srv/photos"),
            vec![
                entry("dawn.png", "dawn.png", 20),
                entry("sunset.jpg", "trips/sunset.jpg", 30),
            ],
            0,
        );

        let lines = format_index(&index, 30);
        assert_eq!(
            lines,
            vec![
                "Images in /srv/photos (2)",
                "000 sunset.jpg (page 1)",
                "    Source: trips/sunset.jpg",
                "001 dawn.png (page 1)",
                "    Source: dawn.png",
                "",
                "2 images, 1 page, 0 skipped",
            ]
        );
    }

    #[test]
    fn page_numbers_follow_page_size() {
        let index = synthetic_index(5);
        let lines = format_index(&index, 2);
        assert!(lines.contains(&"001 img-001.jpg (page 1)".to_string()));
        assert!(lines.contains(&"002 img-002.jpg (page 2)".to_string()));
        assert!(lines.contains(&"004 img-004.jpg (page 3)".to_string()));
        assert_eq!(lines.last().unwrap(), "5 images, 3 pages, 0 skipped");
    }

    #[test]
    fn empty_index_summary() {
        let index = ImageIndex::from_entries(PathBuf::from("/empty"), Vec::new(), 2);
        let lines = format_index(&index, 30);
        assert_eq!(lines[0], "Images in /empty (0)");
        assert_eq!(lines.last().unwrap(), "0 images, 0 pages, 2 skipped");
    }
}
