// src/watch/watcher.rs

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, info, warn};

use crate::graph::slashes::join_logical;
use crate::project::Project;
use crate::watch::event_handler::process_file_change;

/// Handle for the filesystem watcher.
///
/// This exists mainly so the underlying `RecommendedWatcher` is kept alive for
/// as long as needed. Dropping this handle will stop file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
    roots: Vec<PathBuf>,
}

impl WatcherHandle {
    /// Directories being watched recursively.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle")
            .field("roots", &self.roots)
            .finish_non_exhaustive()
    }
}

/// Start watching the project root (plus any Waxfile symlink directories
/// that live outside it) and feed every changed path through
/// [`process_file_change`].
///
/// The notify callback only forwards events over an unbounded channel; all
/// resolution happens on a Tokio task, so the callback thread never blocks
/// on the scheduler.
pub fn spawn_watcher(project: Arc<Project>) -> Result<WatcherHandle> {
    let settings = project.settings();
    let root = settings.root().to_path_buf();
    let root = root.canonicalize().unwrap_or(root);

    let (event_tx, mut event_rx) = tokio::sync::mpsc::unbounded_channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Err(err) = event_tx.send(event) {
                    // The pipeline task is gone; tracing may already be torn down.
                    eprintln!("waxwatch: failed to forward notify event: {err}");
                }
            }
            Err(err) => {
                eprintln!("waxwatch: file watch error: {err}");
            }
        },
        Config::default(),
    )?;

    watcher
        .watch(&root, RecursiveMode::Recursive)
        .with_context(|| format!("watching {}", root.display()))?;
    let mut roots = vec![root.clone()];

    for link in settings.symlinks() {
        let dir = join_logical(settings.root(), link);
        let dir = dir.canonicalize().unwrap_or(dir);
        if !dir.is_dir() || dir.starts_with(&root) {
            continue;
        }
        match watcher.watch(&dir, RecursiveMode::Recursive) {
            Ok(()) => roots.push(dir),
            Err(err) => warn!(path = %dir.display(), error = %err, "cannot watch symlink target"),
        }
    }

    info!(roots = ?roots, "file watcher started");

    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            if matches!(event.kind, EventKind::Access(_)) {
                continue;
            }
            debug!(?event, "received notify event");

            for path in &event.paths {
                process_file_change(&project, path);
            }
        }
        debug!("watcher event loop finished");
    });

    Ok(WatcherHandle {
        _inner: watcher,
        roots,
    })
}
