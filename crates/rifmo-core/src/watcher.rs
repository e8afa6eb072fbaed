//! Watches the poems directory and re-reads it when files change.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify_debouncer_mini::notify;
use notify_debouncer_mini::{new_debouncer, DebounceEventResult, Debouncer};

use crate::poems::{scan_poems, Poem, ScanError};

const DEBOUNCE: Duration = Duration::from_millis(400);

/// Keeps the watch alive; dropping it stops watching.
pub struct PoemWatcher {
    root: PathBuf,
    _debouncer: Debouncer<notify::RecommendedWatcher>,
}

impl PoemWatcher {
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Watches `root` and calls `on_change` with a fresh scan whenever files change (debounced).
pub fn watch_poems(
    root: &Path,
    on_change: impl Fn(Result<Vec<Poem>, ScanError>) + Send + 'static,
) -> Result<PoemWatcher, WatchError> {
    if !root.is_dir() {
        return Err(WatchError::NotADirectory(root.to_path_buf()));
    }
    let root = root.canonicalize().map_err(WatchError::Canonicalize)?;
    let root_for_callback = root.clone();

    let mut debouncer = new_debouncer(DEBOUNCE, move |res: DebounceEventResult| match res {
        Ok(events) => {
            tracing::debug!(events = events.len(), "poems changed");
            on_change(scan_poems(&root_for_callback));
        }
        Err(e) => tracing::warn!(error = %e, "poem watcher error"),
    })
    .map_err(|e| WatchError::Notify(e.to_string()))?;

    debouncer
        .watcher()
        .watch(&root, notify::RecursiveMode::Recursive)
        .map_err(|e| WatchError::Watch(e.to_string()))?;

    tracing::info!(root = %root.display(), "watching poems");
    Ok(PoemWatcher {
        root,
        _debouncer: debouncer,
    })
}

#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("failed to resolve path: {0}")]
    Canonicalize(std::io::Error),
    #[error("watcher init: {0}")]
    Notify(String),
    #[error("watch failed: {0}")]
    Watch(String),
}
