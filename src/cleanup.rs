//! Scratch file removal.
//!
//! Cleanup is best-effort: a file that cannot be removed is logged and
//! skipped, never surfaced to the caller of the request it belonged to.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
#[error("failed to delete {path}: {source}")]
pub struct CleanupError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

impl CleanupError {
    /// The file was already gone.
    pub fn is_not_found(&self) -> bool {
        self.source.kind() == io::ErrorKind::NotFound
    }
}

pub async fn delete_file(path: &Path) -> Result<(), CleanupError> {
    tokio::fs::remove_file(path).await.map_err(|source| CleanupError {
        path: path.to_path_buf(),
        source,
    })
}

/// Deletes every path independently. A failure on one does not stop the rest.
pub async fn delete_files<P: AsRef<Path>>(paths: &[P]) {
    for path in paths {
        report(delete_file(path.as_ref()).await);
    }
}

fn report(result: Result<(), CleanupError>) {
    match result {
        Ok(()) => {}
        Err(e) if e.is_not_found() => debug!(path = %e.path.display(), "scratch file already removed"),
        Err(e) => warn!(path = %e.path.display(), error = %e.source, "failed to delete scratch file"),
    }
}

/// A transient file in the scratch directory, removed exactly once.
///
/// The normal path is [`ScratchFile::remove`], awaited after the response
/// body has been read. If the guard is dropped without that (the request
/// future was cancelled, or writing the file failed half-way), the file is
/// removed synchronously on drop instead.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
    removed: bool,
}

impl ScratchFile {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path, removed: false }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn remove(mut self) {
        self.removed = true;
        delete_files(&[&self.path]).await;
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        self.removed = true;
        report(std::fs::remove_file(&self.path).map_err(|source| CleanupError {
            path: self.path.clone(),
            source,
        }));
    }
}
