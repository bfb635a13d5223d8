//! # Image Browse
//!
//! A small HTTP server for looking through a directory of images. Every image
//! under the root is listed newest first on paginated gallery pages, thumbnails
//! are rendered when the browser asks for them, and any request outside the
//! gallery prefix is forwarded to a reverse-proxy upstream. That makes it easy
//! to put a gallery of generated images next to the tool generating them, on a
//! single port.
//!
//! # Request Flow
//!
//! ```text
//! GET /gallery/?page=3        →  paginate(snapshot)  →  maud page
//! GET /gallery/thumb/?id=42   →  resolve(snapshot)   →  crop + resize → JPEG
//! GET /gallery/image/?id=42   →  resolve(snapshot)   →  file bytes
//! GET /anything/else          →  reqwest             →  upstream
//! ```
//!
//! Handlers never hold a lock while working: they clone the current
//! `Arc<ImageIndex>` snapshot and use it for the whole request, while a rebuild
//! swaps a new snapshot in behind them.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Walks the root, keeps supported images, orders them newest first |
//! | [`refresh`] | Snapshot cell plus the manual and file-watching refresh strategies |
//! | [`paginate`] | Page clamping, neighbour pages, and the page-link window |
//! | [`imaging`] | Pure-Rust thumbnail rendering and original-file reads |
//! | [`server`] | axum router, gallery handlers, and the reverse proxy |
//! | [`config`] | `config.toml` loading, validation, and command-line overrides |
//! | [`output`] | CLI output for the `scan` subcommand |
//! | [`bounds`] | Generic min/max/clamp used by every range check |
//!
//! # Design Decisions
//!
//! ## Clamp, Never Reject
//!
//! Page numbers and image ids come straight from query strings. Instead of
//! validating them, every number is clamped into the valid range: page `-3` is
//! page 1, id `99999` is the last image. A gallery link can go stale after a
//! rebuild but it never fails. The only request that cannot be satisfied is a
//! thumbnail or image from an empty index, which answers 404.
//!
//! ## No Thumbnail Cache
//!
//! Thumbnails are decoded and re-encoded on every request. The server is meant
//! for a local image directory that changes often, and an on-disk cache would
//! need its own invalidation story.
//!
//! ## Pure-Rust Imaging
//!
//! The [`imaging`] module uses the `image` crate for decoding, Lanczos3
//! resampling, and JPEG encoding. No system libraries are needed.

pub mod bounds;
pub mod config;
pub mod imaging;
pub mod output;
pub mod paginate;
pub mod refresh;
pub mod scan;
pub mod server;

#[cfg(test)]
pub(crate) mod test_helpers;
