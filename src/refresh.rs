//! Keeping the active [`ImageIndex`] current.
//!
//! The active snapshot lives in a [`SnapshotCell`]: readers clone an
//! `Arc<ImageIndex>` and keep using it for as long as they like, while a rebuild
//! swaps in a brand-new `Arc` under a short write lock. A reader therefore sees
//! either the old snapshot or the new one, never a mix.
//!
//! Two strategies feed the cell, and a deployment runs exactly one:
//!
//! | Strategy | Trigger | Type |
//! |---|---|---|
//! | Manual | `GET {prefix}/refresh/` | [`ManualIndex`] |
//! | Watched | any filesystem event under the root | [`WatchedIndex`] |
//!
//! The HTTP layer reads through the [`IndexSource`] trait and does not care
//! which one is behind it.
//!
//! ## Concurrent rebuilds
//!
//! Rebuilds are not serialized. Each watch event starts its own full rebuild,
//! a manual refresh can run alongside them, and whichever finishes last wins the
//! swap. The index is display-only state, so a briefly stale gallery is
//! acceptable.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::RwLock;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::scan::{self, ImageIndex};

#[derive(Error, Debug)]
pub enum RefreshError {
    #[error("Failed to watch {path}: {source}")]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
}

/// Atomically replaceable holder of the current snapshot.
#[derive(Debug)]
pub struct SnapshotCell {
    current: RwLock<Arc<ImageIndex>>,
    generation: AtomicU64,
}

impl SnapshotCell {
    pub fn new(initial: ImageIndex) -> Self {
        Self {
            current: RwLock::new(Arc::new(initial)),
            generation: AtomicU64::new(0),
        }
    }

    /// The current snapshot.
    pub fn load(&self) -> Arc<ImageIndex> {
        self.current.read().clone()
    }

    /// Replace the snapshot wholesale and return the new generation number.
    pub fn replace(&self, index: ImageIndex) -> u64 {
        let next = Arc::new(index);
        let mut slot = self.current.write();
        *slot = next;
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// How many times the snapshot has been replaced.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}

/// Read access to the active index.
pub trait IndexSource: Send + Sync {
    fn current_snapshot(&self) -> Arc<ImageIndex>;
}

/// Rebuild `root` and publish the result into `cell`.
fn rebuild_into(cell: &SnapshotCell, root: &Path) -> u64 {
    let index = scan::build(root);
    let images = index.len();
    let generation = cell.replace(index);
    info!(generation, images, "Image index replaced");
    generation
}

// ============================================================================
// Manual
// ============================================================================

/// Index rebuilt only when asked.
#[derive(Debug)]
pub struct ManualIndex {
    root: PathBuf,
    cell: SnapshotCell,
}

impl ManualIndex {
    /// Build the initial snapshot of `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let cell = SnapshotCell::new(scan::build(&root));
        Self { root, cell }
    }

    /// Re-scan the root and swap the snapshot in.
    ///
    /// Always succeeds: a walk that only partly completed still replaces the
    /// previous snapshot. Blocks on directory I/O.
    pub fn refresh(&self) -> Arc<ImageIndex> {
        rebuild_into(&self.cell, &self.root);
        self.cell.load()
    }

    pub fn generation(&self) -> u64 {
        self.cell.generation()
    }
}

impl IndexSource for ManualIndex {
    fn current_snapshot(&self) -> Arc<ImageIndex> {
        self.cell.load()
    }
}

// ============================================================================
// Watched
// ============================================================================

/// Index rebuilt on every filesystem change under the root.
///
/// Owns the OS watcher and a background task; dropping the value (or calling
/// [`shutdown`](Self::shutdown)) stops both. Must be created inside a tokio
/// runtime.
pub struct WatchedIndex {
    cell: Arc<SnapshotCell>,
    // Kept alive for as long as events should flow
    watcher: Option<RecommendedWatcher>,
    task: JoinHandle<()>,
}

impl WatchedIndex {
    /// Build the initial snapshot, then start watching `root` recursively.
    pub fn spawn(root: impl Into<PathBuf>) -> Result<Self, RefreshError> {
        let root = root.into();
        let cell = Arc::new(SnapshotCell::new(scan::build(&root)));

        let (tx, rx) = mpsc::unbounded_channel();
        let handler = move |res: notify::Result<notify::Event>| {
            // Receiver gone means we are shutting down
            let _ = tx.send(res);
        };
        let mut watcher =
            notify::recommended_watcher(handler).map_err(|source| RefreshError::Watch {
                path: root.clone(),
                source,
            })?;
        watcher
            .watch(&root, RecursiveMode::Recursive)
            .map_err(|source| RefreshError::Watch {
                path: root.clone(),
                source,
            })?;
        info!(root = %root.display(), "Watching for changes");

        let task = tokio::spawn(watch_loop(rx, Arc::clone(&cell), root));

        Ok(Self {
            cell,
            watcher: Some(watcher),
            task,
        })
    }

    pub fn generation(&self) -> u64 {
        self.cell.generation()
    }

    /// Stop watching. Rebuilds already running finish but are harmless.
    pub fn shutdown(&mut self) {
        self.watcher.take();
        self.task.abort();
    }
}

impl Drop for WatchedIndex {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl IndexSource for WatchedIndex {
    fn current_snapshot(&self) -> Arc<ImageIndex> {
        self.cell.load()
    }
}

async fn watch_loop(
    mut events: mpsc::UnboundedReceiver<notify::Result<notify::Event>>,
    cell: Arc<SnapshotCell>,
    root: PathBuf,
) {
    while let Some(res) = events.recv().await {
        match res {
            Ok(event) => {
                info!(kind = ?event.kind, paths = ?event.paths, "File change");
                let cell = Arc::clone(&cell);
                let root = root.clone();
                // Fire and forget: overlapping rebuilds race, last swap wins
                tokio::task::spawn_blocking(move || rebuild_into(&cell, &root));
            }
            Err(err) => warn!("Watch error: {err}"),
        }
    }
    debug!("Watch channel closed");
}
