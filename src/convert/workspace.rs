//! Temporary directory lifecycle for a conversion run.

use crate::error::Result;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Owns every temporary directory a run creates.
///
/// Directories are registered as they are created and removed, in creation
/// order, by [`Workspace::release`]. Whatever is still registered when the
/// workspace is dropped is removed then, so an early return or a panic
/// cannot leak a directory.
#[derive(Debug, Default)]
pub struct Workspace {
    dirs: Vec<TempDir>,
}

impl Workspace {
    /// Create an empty workspace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and register a uniquely named directory under `parent`.
    pub fn create_dir(&mut self, parent: &Path, prefix: &str) -> Result<PathBuf> {
        let dir = tempfile::Builder::new()
            .prefix(prefix)
            .tempdir_in(parent)?;
        let path = dir.path().to_path_buf();
        log::debug!("Created temporary directory {}", path.display());
        self.dirs.push(dir);
        Ok(path)
    }

    /// Registered directories in creation order.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.dirs.iter().map(|d| d.path().to_path_buf()).collect()
    }

    /// Number of directories still registered.
    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    /// Check if no directory is registered.
    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    /// Remove every registered directory.
    ///
    /// Each directory is removed once; a failure is logged and the rest are
    /// still attempted. The first failure is returned.
    pub fn release(&mut self) -> Result<()> {
        let mut first_error = None;
        for dir in self.dirs.drain(..) {
            let path = dir.path().to_path_buf();
            match dir.close() {
                Ok(()) => log::debug!("Removed temporary directory {}", path.display()),
                Err(e) => {
                    log::warn!("Failed to remove {}: {}", path.display(), e);
                    first_error.get_or_insert(e);
                }
            }
        }
        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if !self.dirs.is_empty() {
            let _ = self.release();
        }
    }
}
